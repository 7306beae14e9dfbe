use std::sync::Arc;

use argon2::{
    Argon2, PasswordVerifier,
    password_hash::{PasswordHash, PasswordHasher, SaltString, rand_core::OsRng},
};
use storage::repository::{StorageError, UserRepository};
use tutor_core::model::{Email, UserId, UserProfile, validate_password};
use tutor_core::session::UserSession;

use crate::Clock;
use crate::error::AccountError;

/// Account creation and sign-in against the user repository.
#[derive(Clone)]
pub struct AccountService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self { clock, users }
    }

    /// Create an account and start a session for it.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::User` for an invalid email, display name or
    /// password, `AccountError::EmailTaken` when the email is registered, and
    /// `AccountError::Storage` if persistence fails.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserSession, AccountError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        if self.users.get_user_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let hash = hash_password(password)?;
        let now = self.clock.now();
        let profile = UserProfile::new(UserId::generate(), email, display_name, hash, now)?;

        match self.users.insert_user(&profile).await {
            Ok(()) => {}
            Err(StorageError::Conflict) => return Err(AccountError::EmailTaken),
            Err(err) => return Err(err.into()),
        }

        tracing::info!(user = %profile.id(), "account created");
        Ok(UserSession::start(&profile, now))
    }

    /// Verify credentials and start a session.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` for an unknown email or a
    /// wrong password, and `AccountError::Storage` if repository access fails.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserSession, AccountError> {
        let email = Email::parse(email).map_err(|_| AccountError::InvalidCredentials)?;
        let Some(profile) = self.users.get_user_by_email(&email).await? else {
            tracing::debug!("sign-in for unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        if !verify_password(password, profile.password_hash()) {
            tracing::warn!(user = %profile.id(), "sign-in rejected");
            return Err(AccountError::InvalidCredentials);
        }

        tracing::info!(user = %profile.id(), "signed in");
        Ok(UserSession::start(&profile, self.clock.now()))
    }

    /// End a session. The session is consumed so it cannot be reused.
    pub fn sign_out(&self, session: UserSession) {
        tracing::info!(user = %session.user_id(), "signed out");
    }

    /// Load the stored profile of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` with `StorageError::NotFound` if the
    /// account no longer exists.
    pub async fn profile(&self, session: &UserSession) -> Result<UserProfile, AccountError> {
        let profile = self
            .users
            .get_user(session.user_id())
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(profile)
    }
}

fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccountError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
