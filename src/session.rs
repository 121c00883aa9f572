//! Operator session
//!
//! The operator's display name, stamped onto new entries as `recorded_by`.
//! A session is a plain value with an expiry, persisted as JSON and checked
//! against the clock every time it is read.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default session lifetime
pub const DEFAULT_TTL_HOURS: i64 = 10;

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Operator name must not be empty")]
    EmptyName,

    #[error("Failed to access session file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// A named operator with an expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSession {
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

impl OperatorSession {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The name, if still valid at `now`
    pub fn name_at(&self, now: DateTime<Utc>) -> Option<&str> {
        if self.is_expired(now) {
            None
        } else {
            Some(&self.name)
        }
    }
}

/// Session persisted in a single JSON file
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    ttl: Duration,
}

/// `<data_local_dir>/numberx/session.json`
pub fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("numberx"))
        .unwrap_or_else(|| PathBuf::from(".numberx"))
        .join("session.json")
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Read the session valid at `now`.
    ///
    /// Expired or unreadable session files are removed.
    pub fn load(&self, now: DateTime<Utc>) -> SessionResult<Option<OperatorSession>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let session: OperatorSession = match serde_json::from_str(&content) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Discarding corrupt session file");
                self.clear()?;
                return Ok(None);
            }
        };

        if session.is_expired(now) {
            tracing::debug!(name = %session.name, "Session expired");
            self.clear()?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Start a session for `name`, replacing any existing one
    pub fn save(&self, name: &str, now: DateTime<Utc>) -> SessionResult<OperatorSession> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        let session = OperatorSession::new(name, now, self.ttl);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let json = serde_json::to_string_pretty(&session)?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;

        tracing::info!(name = %session.name, expires_at = %session.expires_at, "Session started");
        Ok(session)
    }

    /// Remove the session file; a missing file is not an error
    pub fn clear(&self) -> SessionResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, e: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(default_session_path(), Duration::hours(DEFAULT_TTL_HOURS))
    }
}
