//! URL parsing and identity wrappers for repository watching.

use url::Url;

use super::error::WatchError;

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, WatchError> {
        if value.is_empty() {
            return Err(WatchError::MissingPathSegments);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, WatchError> {
        if value.is_empty() {
            return Err(WatchError::MissingPathSegments);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, WatchError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(WatchError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Derives the GitHub API base URL from a host string.
fn derive_api_base_from_host(
    scheme: &str,
    host: &str,
    port: Option<u16>,
) -> Result<Url, WatchError> {
    if host.eq_ignore_ascii_case("github.com") {
        Url::parse("https://api.github.com")
            .map_err(|error| WatchError::InvalidUrl(error.to_string()))
    } else {
        let authority = if host.contains(':') {
            format!("[{host}]")
        } else {
            host.to_owned()
        };
        let mut api_url = Url::parse(&format!("{scheme}://{authority}"))
            .map_err(|error| WatchError::InvalidUrl(error.to_string()))?;

        api_url
            .set_port(port)
            .map_err(|()| WatchError::InvalidUrl("invalid port".to_owned()))?;
        api_url.set_path("api/v3");
        Ok(api_url)
    }
}

/// Parsed repository identity with derived API base.
///
/// Identifies the repository whose activity feed a poll session watches and
/// carries the API base derived from its host, so GitHub Enterprise
/// installations resolve to `https://<host>/api/v3`.
///
/// # Example
///
/// ```
/// use octowatch::github::locator::RepositoryLocator;
///
/// let locator = RepositoryLocator::parse("https://github.com/acme/widgets")
///     .expect("should parse repository URL");
/// assert_eq!(locator.owner().as_str(), "acme");
/// assert_eq!(locator.repository().as_str(), "widgets");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Creates a repository locator from owner and repository name strings.
    ///
    /// Uses `github.com` as the default host.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::MissingPathSegments` when owner or repo is empty.
    pub fn from_owner_repo(owner: &str, repo: &str) -> Result<Self, WatchError> {
        let validated_owner = RepositoryOwner::new(owner)?;
        let repository = RepositoryName::new(repo)?;
        let api_base = Url::parse("https://api.github.com")
            .map_err(|error| WatchError::InvalidUrl(error.to_string()))?;

        Ok(Self {
            api_base,
            owner: validated_owner,
            repository,
        })
    }

    /// Parses a GitHub repository URL in the form
    /// `https://github.com/<owner>/<repo>`.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::InvalidUrl` when parsing fails or
    /// `MissingPathSegments` when the URL path is not `/owner/repo`.
    pub fn parse(input: &str) -> Result<Self, WatchError> {
        let parsed =
            Url::parse(input).map_err(|error| WatchError::InvalidUrl(error.to_string()))?;

        let mut segments = parsed
            .path_segments()
            .ok_or(WatchError::MissingPathSegments)?;

        let owner_segment = segments.next().ok_or(WatchError::MissingPathSegments)?;
        let repository_segment = segments.next().ok_or(WatchError::MissingPathSegments)?;

        let owner = RepositoryOwner::new(owner_segment)?;
        let repository = RepositoryName::new(repository_segment)?;

        let host = parsed
            .host_str()
            .ok_or_else(|| WatchError::InvalidUrl("URL must include a host".to_owned()))?;
        let api_base = derive_api_base_from_host(parsed.scheme(), host, parsed.port())?;

        Ok(Self {
            api_base,
            owner,
            repository,
        })
    }

    /// API base URL derived from the repository host.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Canonical `owner/repo` form, used to key registry and session maps.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    /// Returns the API path for the repository activity feed.
    pub(crate) fn events_path(&self) -> String {
        format!(
            "/repos/{}/{}/events",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    /// Returns the API path for listing branches.
    pub(crate) fn branches_path(&self) -> String {
        format!(
            "/repos/{}/{}/branches",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    /// Returns the API path for a single branch.
    pub(crate) fn branch_path(&self, branch: &str) -> String {
        format!("{}/{branch}", self.branches_path())
    }

    /// Returns the API path for a single commit.
    pub(crate) fn commit_path(&self, sha: &str) -> String {
        format!(
            "/repos/{}/{}/commits/{sha}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    /// Returns the API path for the repository issue collection.
    pub(crate) fn issues_path(&self) -> String {
        format!(
            "/repos/{}/{}/issues",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    /// Returns the API path for a single issue.
    pub(crate) fn issue_path(&self, number: u64) -> String {
        format!("{}/{number}", self.issues_path())
    }
}
