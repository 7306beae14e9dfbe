use async_trait::async_trait;
use tutor_core::model::{Email, UserId, UserProfile};

use super::SqliteRepository;
use super::mapping::{conn, map_user_row};
use crate::repository::{StorageError, UserRepository};

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn insert_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(user.id().to_string())
        .bind(user.email().as_str())
        .bind(user.display_name())
        .bind(user.password_hash())
        .bind(user.created_at())
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StorageError::Conflict)
            }
            Err(err) => Err(conn(err)),
        }
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, email, display_name, password_hash, created_at
            FROM users WHERE email = ?1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, email, display_name, password_hash, created_at
            FROM users WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_user_row).transpose()
    }
}
