//! Event watching: handler registration, poll sessions, and supervision.
//!
//! [`EventWatcher`] is the entry point: registering a handler for a
//! (repository, event kind) pair lazily starts that repository's poll
//! session. Sessions poll the events feed with conditional GETs, honour the
//! server's `X-Poll-Interval`, and dispatch newly observed events
//! newest-first to the registered handlers.
//!
//! All state is instance-owned and in-memory. Two watchers never share
//! registrations or sessions, and a restarted process starts from a fresh
//! baseline rather than replaying history.

mod registry;
mod session;
mod supervisor;


pub use registry::{EventHandler, HandlerRegistry};
pub use session::{PollSession, SessionHandle, SessionStatus, StopCause};
pub use supervisor::PollSupervisor;

use std::sync::Arc;

use crate::github::error::WatchError;
use crate::github::gateway::{EventsGateway, OctocrabEventsGateway};
use crate::github::locator::{PersonalAccessToken, RepositoryLocator};
use crate::github::models::EventKind;

/// Watches repository activity feeds and dispatches events to handlers.
///
/// Must be used from within a Tokio runtime: `watch` spawns the poll session
/// for a repository the first time a handler is registered for it.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use octowatch::github::locator::{PersonalAccessToken, RepositoryLocator};
/// use octowatch::github::models::{EventKind, EventRecord};
/// use octowatch::watch::EventWatcher;
///
/// # async fn example() -> Result<(), octowatch::github::error::WatchError> {
/// let watcher = EventWatcher::new();
/// let token = PersonalAccessToken::new("ghp_example")?;
/// let locator = RepositoryLocator::from_owner_repo("acme", "widgets")?;
///
/// watcher.watch(
///     &token,
///     &locator,
///     EventKind::Push,
///     Arc::new(|event: &EventRecord, kind: EventKind| {
///         tracing::info!("push observed: {} ({kind})", event.id);
///     }),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct EventWatcher {
    registry: Arc<HandlerRegistry>,
    supervisor: PollSupervisor,
}

impl EventWatcher {
    /// Creates a watcher with no registrations and no sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and lazily starts the repository's poll session.
    ///
    /// The token is captured when the session starts; registrations after the
    /// first reuse the existing session and its credentials. Handlers cannot
    /// be removed, and duplicates are invoked once per registration.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::InvalidUrl` or `WatchError::Api` when the events
    /// gateway cannot be constructed. The handler stays registered, so a
    /// later call may start the session.
    pub fn watch(
        &self,
        token: &PersonalAccessToken,
        locator: &RepositoryLocator,
        kind: EventKind,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), WatchError> {
        self.registry.register(&locator.full_name(), kind, handler);
        self.supervisor.ensure_started(&locator.full_name(), || {
            let gateway = OctocrabEventsGateway::for_token(token, locator)?;
            Ok(PollSession::new(Arc::new(gateway), Arc::clone(&self.registry), locator.clone())
                .spawn())
        })?;
        Ok(())
    }

    /// Registers a handler against a caller-supplied events gateway.
    ///
    /// Useful for alternative request executors and for tests; behaves like
    /// [`Self::watch`] otherwise.
    ///
    /// # Errors
    ///
    /// Currently infallible in practice; kept fallible to match
    /// [`Self::watch`].
    pub fn watch_with_gateway(
        &self,
        gateway: &Arc<dyn EventsGateway>,
        locator: &RepositoryLocator,
        kind: EventKind,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), WatchError> {
        self.registry.register(&locator.full_name(), kind, handler);
        self.supervisor.ensure_started(&locator.full_name(), || {
            Ok(
                PollSession::new(Arc::clone(gateway), Arc::clone(&self.registry), locator.clone())
                    .spawn(),
            )
        })?;
        Ok(())
    }

    /// Status of the repository's poll session, if one was started.
    #[must_use]
    pub fn session_status(&self, locator: &RepositoryLocator) -> Option<SessionStatus> {
        self.supervisor.status(&locator.full_name())
    }

    /// Requests the repository's poll session to stop.
    ///
    /// Returns `false` when no session was ever started for the repository.
    #[must_use = "reports whether a session existed to stop"]
    pub fn stop(&self, locator: &RepositoryLocator) -> bool {
        self.supervisor.stop(&locator.full_name())
    }
}
