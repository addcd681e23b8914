//! The per-repository polling session.
//!
//! A session owns the repository's cache-validation token and baseline event
//! id, and is the only writer of either. Each iteration fetches the events
//! feed, dispatches whatever is new, then sleeps for exactly the interval the
//! server dictated. Iterations never overlap: the next fetch is scheduled
//! only after the current one completes.
//!
//! A failed fetch ends the session permanently - no retry, no backoff - so a
//! broken endpoint is never hammered. Unlike the silent stop this replaces,
//! the cause is recorded in an observable [`SessionStatus`], and a session
//! can also be stopped deterministically through its [`SessionHandle`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::github::error::WatchError;
use crate::github::gateway::{EventsGateway, EventsPayload};
use crate::github::locator::RepositoryLocator;
use crate::github::models::EventRecord;

use super::registry::HandlerRegistry;

/// Health of a poll session, queryable through its handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// The session is polling (or waiting for its next poll).
    Running,
    /// The session has ended and will never fetch again.
    Stopped {
        /// Why the session ended.
        cause: StopCause,
    },
}

/// Why a poll session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopCause {
    /// The session was stopped through its handle.
    Requested,
    /// A fetch failed; per the delivery contract this is terminal.
    FetchFailed(WatchError),
}

/// Handle to a spawned poll session.
///
/// Dropping every handle (and its supervisor) stops the session at its next
/// suspension point, tying session lifetime to the owning watcher instance.
#[derive(Debug)]
pub struct SessionHandle {
    stop: watch::Sender<bool>,
    status: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    /// Current session status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Whether the session is still polling.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.status(), SessionStatus::Running)
    }

    /// Requests the session to stop at its next suspension point.
    pub fn stop(&self) {
        let _ignored = self.stop.send(true);
    }
}

/// Outcome of one poll iteration.
pub(super) enum Iteration {
    /// Reschedule after the server-dictated delay.
    Continue(Duration),
    /// Fetch failed; the session must end with this cause.
    Stop(WatchError),
}

/// One repository's polling state machine.
pub struct PollSession {
    gateway: Arc<dyn EventsGateway>,
    registry: Arc<HandlerRegistry>,
    locator: RepositoryLocator,
    repo_key: String,
    cache_token: Option<String>,
    last_seen_event_id: Option<String>,
}

impl PollSession {
    /// Creates a session that is not yet running.
    ///
    /// The gateway credentials are captured here, at session-creation time;
    /// later registrations for the same repository reuse this session and
    /// cannot change them.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn EventsGateway>,
        registry: Arc<HandlerRegistry>,
        locator: RepositoryLocator,
    ) -> Self {
        let repo_key = locator.full_name();
        Self {
            gateway,
            registry,
            locator,
            repo_key,
            cache_token: None,
            last_seen_event_id: None,
        }
    }

    /// Spawns the session onto the current Tokio runtime.
    #[must_use]
    pub fn spawn(self) -> SessionHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(SessionStatus::Running);

        tokio::spawn(self.run(stop_rx, status_tx));

        SessionHandle {
            stop: stop_tx,
            status: status_rx,
        }
    }

    async fn run(
        mut self,
        mut stop_rx: watch::Receiver<bool>,
        status_tx: watch::Sender<SessionStatus>,
    ) {
        loop {
            if *stop_rx.borrow() {
                Self::publish(&status_tx, StopCause::Requested);
                return;
            }

            match self.poll_once().await {
                Iteration::Continue(delay) => {
                    tokio::select! {
                        // A closed channel means every handle is gone; treat
                        // it like an explicit stop.
                        _ = stop_rx.changed() => {
                            Self::publish(&status_tx, StopCause::Requested);
                            return;
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                Iteration::Stop(error) => {
                    tracing::warn!(
                        repo = %self.repo_key,
                        "poll session ended after failed fetch: {error}"
                    );
                    Self::publish(&status_tx, StopCause::FetchFailed(error));
                    return;
                }
            }
        }
    }

    fn publish(status_tx: &watch::Sender<SessionStatus>, cause: StopCause) {
        let _ignored = status_tx.send(SessionStatus::Stopped { cause });
    }

    /// Runs one fetch/dispatch/reschedule step.
    pub(super) async fn poll_once(&mut self) -> Iteration {
        let page = match self
            .gateway
            .repository_events(&self.locator, self.cache_token.as_deref())
            .await
        {
            Ok(page) => page,
            Err(error) => return Iteration::Stop(error),
        };

        match page.payload {
            EventsPayload::Fresh(events) => self.dispatch_fresh(&events),
            EventsPayload::NotModified => {}
            EventsPayload::Malformed { detail } => {
                tracing::warn!(
                    repo = %self.repo_key,
                    "skipping dispatch for undecodable events payload: {detail}"
                );
            }
        }

        // Without a token from this response the next fetch is unconditional.
        self.cache_token = page.cache_token;

        Iteration::Continue(page.poll_interval)
    }

    /// Walks a fresh, newest-first event list and dispatches what is new.
    ///
    /// The first successful fetch only records the newest id as the baseline;
    /// replaying a repository's pre-existing history is never wanted. Later
    /// walks deliver newest-first, stopping at the baseline entry, then move
    /// the baseline to the newest id whether or not any handler fired.
    fn dispatch_fresh(&mut self, events: &[EventRecord]) {
        let Some(newest) = events.first() else {
            return;
        };
        let newest_id = newest.id.clone();

        if let Some(baseline) = self.last_seen_event_id.as_deref() {
            for event in events {
                if event.id == baseline {
                    break;
                }
                self.dispatch_one(event);
            }
        }

        self.last_seen_event_id = Some(newest_id);
    }

    fn dispatch_one(&self, event: &EventRecord) {
        let handlers = self.registry.handlers_for(&self.repo_key, event.kind);
        for handler in handlers {
            let invocation =
                std::panic::catch_unwind(AssertUnwindSafe(|| handler.handle(event, event.kind)));
            if invocation.is_err() {
                tracing::warn!(
                    repo = %self.repo_key,
                    event_id = %event.id,
                    kind = %event.kind,
                    "event handler panicked; continuing delivery"
                );
            }
        }
    }
}
