//! Octowatch: a client library for watching GitHub repository activity.
//!
//! The crate polls a repository's events feed with conditional GETs,
//! respects the server-dictated minimum poll interval, and dispatches newly
//! observed events - newest first - to handlers registered per (repository,
//! event kind) pair. Around that core it offers the usual single-shot reads
//! (branches, commits, the authenticated user, repositories), issue
//! lookup/create/close helpers keyed by title, and an OAuth
//! authorization-code flow with per-domain app credentials.

pub mod github;
pub mod watch;

pub use github::{PersonalAccessToken, RepositoryLocator, WatchError};
pub use github::models::{EventKind, EventRecord};
pub use watch::{EventHandler, EventWatcher, SessionStatus, StopCause};
