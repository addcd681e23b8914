//! Gateways for talking to the GitHub API through Octocrab.
//!
//! This module provides trait-based gateways for communicating with the
//! GitHub API. The trait-based design enables mocking in tests while the
//! Octocrab implementations handle real HTTP requests. The events gateway is
//! the request executor behind every poll session; the repository and issue
//! gateways cover the single-shot convenience reads and writes.

mod client;
mod error_mapping;
mod events;
mod http_utils;
mod issues;
mod repository;

#[cfg(test)]
mod tests;

pub use events::{EventsPage, EventsPayload, OctocrabEventsGateway};
pub use issues::OctocrabIssueGateway;
pub use repository::OctocrabRepositoryGateway;

use async_trait::async_trait;

use crate::github::error::WatchError;
use crate::github::locator::RepositoryLocator;
use crate::github::models::{
    Account, Branch, CommitDetails, Issue, RepositoryAffiliation, RepositorySummary,
};

/// Gateway that fetches a repository's activity feed.
///
/// One call corresponds to one (possibly conditional) GET against the events
/// endpoint. The returned page carries the payload classification alongside
/// the cache-validation token and server-dictated poll interval, so the poll
/// session never inspects raw HTTP metadata itself.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventsGateway: Send + Sync {
    /// Fetches recent repository events, conditionally when a cache token is
    /// held from a previous fetch.
    async fn repository_events<'a>(
        &self,
        locator: &RepositoryLocator,
        cache_token: Option<&'a str>,
    ) -> Result<EventsPage, WatchError>;
}

/// Gateway for single-shot repository and account reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    /// Lists the repository's branches.
    async fn branches(&self, locator: &RepositoryLocator) -> Result<Vec<Branch>, WatchError>;

    /// Fetches a single branch by name.
    async fn branch(&self, locator: &RepositoryLocator, name: &str)
    -> Result<Branch, WatchError>;

    /// Fetches a single commit by SHA.
    async fn commit(
        &self,
        locator: &RepositoryLocator,
        sha: &str,
    ) -> Result<CommitDetails, WatchError>;

    /// Fetches the authenticated user's account details.
    async fn authenticated_user(&self) -> Result<Account, WatchError>;

    /// Lists the authenticated user's repositories, newest first.
    async fn repositories(
        &self,
        affiliation: RepositoryAffiliation,
    ) -> Result<Vec<RepositorySummary>, WatchError>;
}

/// Gateway for issue lookup and lifecycle helpers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueGateway: Send + Sync {
    /// Finds an open issue with the exact title, if one exists.
    async fn find_issue(
        &self,
        locator: &RepositoryLocator,
        title: &str,
    ) -> Result<Option<Issue>, WatchError>;

    /// Creates an issue unless one with the same title already exists.
    ///
    /// Returns the created issue, or `None` when an existing issue made the
    /// create a no-op.
    async fn create_issue_if_absent(
        &self,
        locator: &RepositoryLocator,
        title: &str,
        body: &str,
    ) -> Result<Option<Issue>, WatchError>;

    /// Closes the issue with the exact title, if one exists.
    ///
    /// Returns the closed issue, or `None` when no issue matched.
    async fn close_issue(
        &self,
        locator: &RepositoryLocator,
        title: &str,
    ) -> Result<Option<Issue>, WatchError>;
}
