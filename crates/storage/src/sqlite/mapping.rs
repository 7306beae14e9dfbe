use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tutor_core::model::{
    Course, CourseTitle, Email, EnrollmentDraft, EnrollmentRecord, Quiz, QuizId, UserId,
    UserProfile,
};

use crate::documents::{decode_chapters, decode_progress, decode_questions};
use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn quiz_id_to_i64(id: QuizId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("quiz_id overflow".into()))
}

pub(crate) fn user_id_from_str(v: &str) -> Result<UserId, StorageError> {
    v.parse::<UserId>().map_err(ser)
}

pub(crate) fn map_course_row(row: &SqliteRow) -> Result<Course, StorageError> {
    let title = CourseTitle::new(row.try_get::<String, _>("title").map_err(ser)?).map_err(ser)?;
    let chapters = decode_chapters(&row.try_get::<String, _>("chapters").map_err(ser)?)?;
    let chapter_count = u32_from_i64(
        "chapter_count",
        row.try_get::<i64, _>("chapter_count").map_err(ser)?,
    )?;

    Course::new(
        title,
        row.try_get::<String, _>("description").map_err(ser)?,
        row.try_get::<String, _>("category").map_err(ser)?,
        chapter_count,
        chapters,
    )
    .map_err(ser)
}

pub(crate) fn map_enrollment_row(row: &SqliteRow) -> Result<EnrollmentRecord, StorageError> {
    let user_id = user_id_from_str(&row.try_get::<String, _>("user_id").map_err(ser)?)?;
    let chapters = decode_progress(&row.try_get::<String, _>("chapters").map_err(ser)?)?;

    EnrollmentRecord::from_persisted(EnrollmentDraft {
        user_id,
        course_title: row.try_get("course_title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        category: row.try_get("category").map_err(ser)?,
        chapter_count: u32_from_i64(
            "chapter_count",
            row.try_get::<i64, _>("chapter_count").map_err(ser)?,
        )?,
        chapters,
        enrolled_at: row.try_get("enrolled_at").map_err(ser)?,
    })
    .map_err(ser)
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<UserProfile, StorageError> {
    let email = Email::parse(&row.try_get::<String, _>("email").map_err(ser)?).map_err(ser)?;
    UserProfile::new(
        user_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?,
        email,
        &row.try_get::<String, _>("display_name").map_err(ser)?,
        row.try_get::<String, _>("password_hash").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_quiz_row(row: &SqliteRow) -> Result<Quiz, StorageError> {
    let id = u64::try_from(row.try_get::<i64, _>("id").map_err(ser)?)
        .map_err(|_| StorageError::Serialization("quiz_id sign overflow".into()))?;
    let questions = decode_questions(&row.try_get::<String, _>("questions").map_err(ser)?)?;
    Ok(Quiz::new(
        QuizId::new(id),
        row.try_get::<String, _>("title").map_err(ser)?,
        questions,
    ))
}
