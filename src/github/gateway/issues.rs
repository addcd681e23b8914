//! Octocrab implementation of the issue lookup and lifecycle helpers.
//!
//! The helpers key issues by exact title: `find_issue` scans the open issue
//! list, `create_issue_if_absent` only files an issue when no open issue
//! carries the title, and `close_issue` patches the matching issue closed.

use async_trait::async_trait;
use octocrab::Octocrab;

use crate::github::error::WatchError;
use crate::github::locator::{PersonalAccessToken, RepositoryLocator};
use crate::github::models::{ApiIssue, Issue};

use super::IssueGateway;
use super::client::build_octocrab_client;
use super::error_mapping::map_octocrab_error;

/// Octocrab-backed issue gateway.
pub struct OctocrabIssueGateway {
    client: Octocrab,
}

impl OctocrabIssueGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an Octocrab client for the given token and repository locator.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::InvalidUrl` when the base URI cannot be parsed or
    /// `WatchError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: &PersonalAccessToken,
        locator: &RepositoryLocator,
    ) -> Result<Self, WatchError> {
        let octocrab = build_octocrab_client(token, locator.api_base().as_str())?;
        Ok(Self::new(octocrab))
    }

    async fn list_issues(&self, locator: &RepositoryLocator) -> Result<Vec<Issue>, WatchError> {
        self.client
            .get::<Vec<ApiIssue>, _, _>(locator.issues_path(), None::<&()>)
            .await
            .map(|issues| issues.into_iter().map(ApiIssue::into).collect())
            .map_err(|error| map_octocrab_error("list issues", &error))
    }
}

#[async_trait]
impl IssueGateway for OctocrabIssueGateway {
    async fn find_issue(
        &self,
        locator: &RepositoryLocator,
        title: &str,
    ) -> Result<Option<Issue>, WatchError> {
        let issues = self.list_issues(locator).await?;
        Ok(issues.into_iter().find(|issue| issue.title == title))
    }

    async fn create_issue_if_absent(
        &self,
        locator: &RepositoryLocator,
        title: &str,
        body: &str,
    ) -> Result<Option<Issue>, WatchError> {
        if self.find_issue(locator, title).await?.is_some() {
            return Ok(None);
        }

        let request = serde_json::json!({ "title": title, "body": body });
        let created: ApiIssue = self
            .client
            .post(locator.issues_path(), Some(&request))
            .await
            .map_err(|error| map_octocrab_error("create issue", &error))?;
        Ok(Some(created.into()))
    }

    async fn close_issue(
        &self,
        locator: &RepositoryLocator,
        title: &str,
    ) -> Result<Option<Issue>, WatchError> {
        let Some(found) = self.find_issue(locator, title).await? else {
            return Ok(None);
        };

        let request = serde_json::json!({ "state": "closed" });
        let closed: ApiIssue = self
            .client
            .patch(locator.issue_path(found.number), Some(&request))
            .await
            .map_err(|error| map_octocrab_error("close issue", &error))?;
        Ok(Some(closed.into()))
    }
}
