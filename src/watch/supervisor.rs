//! Guarantees at most one live poll session per repository.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::github::error::WatchError;

use super::session::{SessionHandle, SessionStatus};

/// Tracks the poll session for each watched repository.
///
/// However many handlers are registered for a repository, `ensure_started`
/// spawns its session at most once. Handles are retained so session health
/// stays queryable and sessions can be stopped.
#[derive(Debug, Default)]
pub struct PollSupervisor {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl PollSupervisor {
    /// Creates a supervisor with no sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `repo_key` unless one was already started.
    ///
    /// Returns `true` when `start` was invoked, `false` when the repository
    /// already had a session (started sessions are never replaced, even after
    /// they stop). A failed `start` leaves no session recorded, so a later
    /// call may retry.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `start`.
    pub fn ensure_started<F>(&self, repo_key: &str, start: F) -> Result<bool, WatchError>
    where
        F: FnOnce() -> Result<SessionHandle, WatchError>,
    {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(repo_key) {
            return Ok(false);
        }

        let handle = start()?;
        sessions.insert(repo_key.to_owned(), handle);
        Ok(true)
    }

    /// Status of the repository's session, if one was ever started.
    #[must_use]
    pub fn status(&self, repo_key: &str) -> Option<SessionStatus> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.get(repo_key).map(SessionHandle::status)
    }

    /// Requests the repository's session to stop.
    ///
    /// Returns `false` when no session was ever started for the repository.
    #[must_use = "reports whether a session existed to stop"]
    pub fn stop(&self, repo_key: &str) -> bool {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.get(repo_key).is_some_and(|handle| {
            handle.stop();
            true
        })
    }
}
