use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Shared-secret gate in front of the review operations.
///
/// A correct password opens a session identified by an opaque bearer token. There is no
/// per-reviewer identity: every session carries the same rights.
#[derive(Debug)]
pub struct ReviewerGate {
    secret: String,
    session_ttl: Duration,
    sessions: Mutex<HashMap<String, DateTime<Utc>>>,
}

/// Token handed back after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("Invalid password")]
    InvalidSecret,
    #[error("reviewer session required")]
    MissingToken,
    #[error("unknown reviewer session")]
    UnknownSession,
    #[error("reviewer session expired")]
    Expired,
}

impl ReviewerGate {
    pub fn new(secret: impl Into<String>, session_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            session_ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn open_session(&self, password: &str) -> Result<ReviewerSession, AccessError> {
        self.open_session_at(password, Utc::now())
    }

    pub fn open_session_at(
        &self,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewerSession, AccessError> {
        if self.secret.is_empty() || !secrets_match(password, &self.secret) {
            return Err(AccessError::InvalidSecret);
        }

        let token = Uuid::new_v4().simple().to_string();
        let expires_at = now + self.session_ttl;

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, expiry| *expiry > now);
        sessions.insert(token.clone(), expires_at);

        Ok(ReviewerSession { token, expires_at })
    }

    pub fn verify(&self, token: Option<&str>) -> Result<(), AccessError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<(), AccessError> {
        let token = token
            .filter(|value| !value.is_empty())
            .ok_or(AccessError::MissingToken)?;

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.get(token).copied() {
            Some(expiry) if expiry > now => Ok(()),
            Some(_) => {
                sessions.remove(token);
                Err(AccessError::Expired)
            }
            None => Err(AccessError::UnknownSession),
        }
    }

    /// Returns whether a live session was removed.
    pub fn close_session(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }
}

/// Both sides are padded to the longer length with different fill bytes, so neither the
/// comparison nor the length check returns early.
fn secrets_match(candidate: &str, secret: &str) -> bool {
    let width = candidate.len().max(secret.len());
    let mut left = vec![0x00u8; width];
    let mut right = vec![0xFFu8; width];
    left[..candidate.len()].copy_from_slice(candidate.as_bytes());
    right[..secret.len()].copy_from_slice(secret.as_bytes());

    let lengths_equal = candidate.len().ct_eq(&secret.len());
    let contents_equal = left.ct_eq(&right);
    (lengths_equal & contents_equal).into()
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}
