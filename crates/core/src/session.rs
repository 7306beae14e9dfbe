//! Signed-in user identity.
//!
//! A `UserSession` is created at sign-in and handed by reference to whatever
//! needs to know who is acting. `SessionSlot` holds the current session for a
//! front end and is emptied at sign-out.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Email, UserId, UserProfile};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no user is signed in")]
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    user_id: UserId,
    email: Email,
    display_name: String,
    signed_in_at: DateTime<Utc>,
}

impl UserSession {
    #[must_use]
    pub fn start(profile: &UserProfile, signed_in_at: DateTime<Utc>) -> Self {
        Self {
            user_id: profile.id(),
            email: profile.email().clone(),
            display_name: profile.display_name().to_owned(),
            signed_in_at,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
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
    pub fn signed_in_at(&self) -> DateTime<Utc> {
        self.signed_in_at
    }
}

#[derive(Debug, Default)]
pub struct SessionSlot {
    current: Option<UserSession>,
}

impl SessionSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `session`, replacing any previous one.
    pub fn sign_in(&mut self, session: UserSession) {
        self.current = Some(session);
    }

    /// Clears the slot and hands back the ended session.
    pub fn sign_out(&mut self) -> Option<UserSession> {
        self.current.take()
    }

    #[must_use]
    pub fn current(&self) -> Option<&UserSession> {
        self.current.as_ref()
    }

    /// # Errors
    ///
    /// Returns `SessionError::SignedOut` when nobody is signed in.
    pub fn require(&self) -> Result<&UserSession, SessionError> {
        self.current.as_ref().ok_or(SessionError::SignedOut)
    }
}
