use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::UserId;

pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("display name is required")]
    EmptyDisplayName,

    #[error("display name cannot contain digits")]
    InvalidDisplayName,

    #[error("invalid email format")]
    InvalidEmail,

    #[error("password too short")]
    PasswordTooShort,

    #[error("password too long")]
    PasswordTooLong,

    #[error("password hash is missing")]
    MissingPasswordHash,
}

/// Lower-cased, trimmed email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// # Errors
    ///
    /// Returns `UserError::InvalidEmail` unless the value has a non-empty local
    /// part and domain around a single `@`.
    pub fn parse(value: &str) -> Result<Self, UserError> {
        let normalized = value.trim().to_lowercase();
        match normalized.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(normalized))
            }
            _ => Err(UserError::InvalidEmail),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check a display name: required, no digits.
///
/// # Errors
///
/// Returns `UserError::EmptyDisplayName` or `UserError::InvalidDisplayName`.
pub fn validate_display_name(name: &str) -> Result<String, UserError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(UserError::EmptyDisplayName);
    }
    if name.chars().any(|c| c.is_ascii_digit()) {
        return Err(UserError::InvalidDisplayName);
    }
    Ok(name.to_owned())
}

/// Check a plaintext password length before hashing.
///
/// # Errors
///
/// Returns `UserError::PasswordTooShort` or `UserError::PasswordTooLong`.
pub fn validate_password(password: &str) -> Result<(), UserError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(UserError::PasswordTooShort);
    }
    if len > PASSWORD_MAX_LEN {
        return Err(UserError::PasswordTooLong);
    }
    Ok(())
}

/// Registered account. Only ever holds a password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    id: UserId,
    email: Email,
    display_name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserProfile {
    /// # Errors
    ///
    /// Returns `UserError` if the display name or hash is invalid.
    pub fn new(
        id: UserId,
        email: Email,
        display_name: &str,
        password_hash: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let display_name = validate_display_name(display_name)?;
        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(UserError::MissingPasswordHash);
        }
        Ok(Self {
            id,
            email,
            display_name,
            password_hash,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
