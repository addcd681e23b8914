//! Octocrab implementation of the single-shot repository and account reads.

use async_trait::async_trait;
use octocrab::Octocrab;

use crate::github::error::WatchError;
use crate::github::locator::{PersonalAccessToken, RepositoryLocator};
use crate::github::models::{
    Account, ApiAuthenticatedUser, ApiBranch, ApiCommit, ApiRepository, Branch, CommitDetails,
    RepositoryAffiliation, RepositorySummary,
};

use super::RepositoryGateway;
use super::client::build_octocrab_client;
use super::error_mapping::map_octocrab_error;

/// Octocrab-backed repository gateway.
pub struct OctocrabRepositoryGateway {
    client: Octocrab,
}

impl OctocrabRepositoryGateway {
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
}

#[async_trait]
impl RepositoryGateway for OctocrabRepositoryGateway {
    async fn branches(&self, locator: &RepositoryLocator) -> Result<Vec<Branch>, WatchError> {
        self.client
            .get::<Vec<ApiBranch>, _, _>(locator.branches_path(), None::<&()>)
            .await
            .map(|branches| branches.into_iter().map(ApiBranch::into).collect())
            .map_err(|error| map_octocrab_error("list branches", &error))
    }

    async fn branch(
        &self,
        locator: &RepositoryLocator,
        name: &str,
    ) -> Result<Branch, WatchError> {
        self.client
            .get::<ApiBranch, _, _>(locator.branch_path(name), None::<&()>)
            .await
            .map(ApiBranch::into)
            .map_err(|error| map_octocrab_error("get branch", &error))
    }

    async fn commit(
        &self,
        locator: &RepositoryLocator,
        sha: &str,
    ) -> Result<CommitDetails, WatchError> {
        self.client
            .get::<ApiCommit, _, _>(locator.commit_path(sha), None::<&()>)
            .await
            .map(ApiCommit::into)
            .map_err(|error| map_octocrab_error("get commit", &error))
    }

    async fn authenticated_user(&self) -> Result<Account, WatchError> {
        self.client
            .get::<ApiAuthenticatedUser, _, _>("/user", None::<&()>)
            .await
            .map(ApiAuthenticatedUser::into)
            .map_err(|error| map_octocrab_error("get user", &error))
    }

    async fn repositories(
        &self,
        affiliation: RepositoryAffiliation,
    ) -> Result<Vec<RepositorySummary>, WatchError> {
        let query_params = [("sort", "created"), ("type", affiliation.as_str())];

        self.client
            .get::<Vec<ApiRepository>, _, _>("/user/repos", Some(&query_params))
            .await
            .map(|repos| repos.into_iter().map(ApiRepository::into).collect())
            .map_err(|error| map_octocrab_error("list repositories", &error))
    }
}
