//! GitHub API access: locators, models, gateways, and the OAuth flow.
//!
//! This module wraps Octocrab behind trait-based gateways so the watch layer
//! and tests never depend on real HTTP. Errors are mapped into precise
//! [`error::WatchError`] variants rather than exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod oauth;
pub mod rate_limit;

pub use error::WatchError;
pub use gateway::{
    EventsGateway, EventsPage, EventsPayload, IssueGateway, OctocrabEventsGateway,
    OctocrabIssueGateway, OctocrabRepositoryGateway, RepositoryGateway,
};
pub use locator::{PersonalAccessToken, RepositoryLocator, RepositoryName, RepositoryOwner};
pub use models::{EventKind, EventRecord};
pub use oauth::{AppCredentials, OAuthFlow};
