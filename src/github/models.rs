//! Data models for repository activity events and single-shot API reads.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into public domain types. Event records are immutable once
//! decoded; the watch layer never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Activity kinds published on a repository events feed.
///
/// The wire values follow GitHub's event type names (`PushEvent`,
/// `IssuesEvent`, ...). Unrecognised values decode to [`EventKind::Unknown`]
/// rather than failing the whole feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Comment on a commit (`CommitCommentEvent`).
    CommitComment,
    /// Branch or tag created (`CreateEvent`).
    Create,
    /// Branch or tag deleted (`DeleteEvent`).
    Delete,
    /// Deployment created (`DeploymentEvent`).
    Deployment,
    /// Deployment status changed (`DeploymentStatusEvent`).
    DeploymentStatus,
    /// Download created (`DownloadEvent`).
    Download,
    /// User followed (`FollowEvent`).
    Follow,
    /// Repository forked (`ForkEvent`).
    Fork,
    /// Patch applied from a fork (`ForkApplyEvent`).
    ForkApply,
    /// Gist created or updated (`GistEvent`).
    Gist,
    /// Wiki page edited (`GollumEvent`).
    Gollum,
    /// Comment on an issue or pull request (`IssueCommentEvent`).
    IssueComment,
    /// Issue opened, closed, or edited (`IssuesEvent`).
    Issues,
    /// Collaborator added (`MemberEvent`).
    Member,
    /// Pages site built (`PageBuildEvent`).
    PageBuild,
    /// Repository made public (`PublicEvent`).
    Public,
    /// Pull request opened, closed, or synchronised (`PullRequestEvent`).
    PullRequest,
    /// Review comment on a pull request diff (`PullRequestReviewCommentEvent`).
    PullRequestReviewComment,
    /// Commits pushed (`PushEvent`).
    Push,
    /// Release published (`ReleaseEvent`).
    Release,
    /// Commit status changed (`StatusEvent`).
    Status,
    /// Team added to a repository (`TeamAddEvent`).
    TeamAdd,
    /// Repository starred (`WatchEvent`).
    Watch,
    /// Any event type this crate does not recognise.
    Unknown,
}

impl EventKind {
    const WIRE_NAMES: [(&'static str, Self); 23] = [
        ("CommitCommentEvent", Self::CommitComment),
        ("CreateEvent", Self::Create),
        ("DeleteEvent", Self::Delete),
        ("DeploymentEvent", Self::Deployment),
        ("DeploymentStatusEvent", Self::DeploymentStatus),
        ("DownloadEvent", Self::Download),
        ("FollowEvent", Self::Follow),
        ("ForkEvent", Self::Fork),
        ("ForkApplyEvent", Self::ForkApply),
        ("GistEvent", Self::Gist),
        ("GollumEvent", Self::Gollum),
        ("IssueCommentEvent", Self::IssueComment),
        ("IssuesEvent", Self::Issues),
        ("MemberEvent", Self::Member),
        ("PageBuildEvent", Self::PageBuild),
        ("PublicEvent", Self::Public),
        ("PullRequestEvent", Self::PullRequest),
        ("PullRequestReviewCommentEvent", Self::PullRequestReviewComment),
        ("PushEvent", Self::Push),
        ("ReleaseEvent", Self::Release),
        ("StatusEvent", Self::Status),
        ("TeamAddEvent", Self::TeamAdd),
        ("WatchEvent", Self::Watch),
    ];

    /// Maps a wire event type name to a kind, defaulting to `Unknown`.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        Self::WIRE_NAMES
            .iter()
            .find(|(name, _)| *name == value)
            .map_or(Self::Unknown, |(_, kind)| *kind)
    }

    /// Returns the wire event type name for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        Self::WIRE_NAMES
            .iter()
            .find(|(_, kind)| kind == self)
            .map_or("UnknownEvent", |(name, _)| name)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

/// One entry from a repository activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Opaque event identifier assigned by GitHub.
    pub id: String,
    /// Activity kind.
    pub kind: EventKind,
    /// Login of the actor that triggered the event, if present.
    pub actor: Option<String>,
    /// Kind-specific payload, kept opaque for handlers to interpret.
    pub payload: serde_json::Value,
    /// Event creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiEvent {
    pub(super) id: String,
    #[serde(rename = "type")]
    pub(super) kind: EventKind,
    pub(super) actor: Option<ApiAccount>,
    #[serde(default)]
    pub(super) payload: serde_json::Value,
    pub(super) created_at: Option<DateTime<Utc>>,
}

impl From<ApiEvent> for EventRecord {
    fn from(api: ApiEvent) -> Self {
        Self {
            id: api.id,
            kind: api.kind,
            actor: api.actor.and_then(|actor| actor.login),
            payload: api.payload,
            created_at: api.created_at,
        }
    }
}

/// Repository branch summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Branch name.
    pub name: String,
    /// SHA of the branch head commit, if reported.
    pub head_sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiBranch {
    pub(super) name: String,
    pub(super) commit: Option<ApiCommitRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCommitRef {
    pub(super) sha: Option<String>,
}

impl From<ApiBranch> for Branch {
    fn from(api: ApiBranch) -> Self {
        Self {
            name: api.name,
            head_sha: api.commit.and_then(|commit| commit.sha),
        }
    }
}

/// Details of a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetails {
    /// Commit SHA.
    pub sha: String,
    /// Commit message, if present.
    pub message: Option<String>,
    /// Author login, if present.
    pub author: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCommit {
    pub(super) sha: String,
    pub(super) commit: Option<ApiCommitBody>,
    pub(super) author: Option<ApiAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCommitBody {
    pub(super) message: Option<String>,
}

impl From<ApiCommit> for CommitDetails {
    fn from(api: ApiCommit) -> Self {
        Self {
            sha: api.sha,
            message: api.commit.and_then(|body| body.message),
            author: api.author.and_then(|account| account.login),
        }
    }
}

/// The authenticated user's account details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account login.
    pub login: String,
    /// Display name, if set.
    pub name: Option<String>,
    /// Public email, if set.
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiAuthenticatedUser {
    pub(super) login: String,
    pub(super) name: Option<String>,
    pub(super) email: Option<String>,
}

impl From<ApiAuthenticatedUser> for Account {
    fn from(api: ApiAuthenticatedUser) -> Self {
        Self {
            login: api.login,
            name: api.name,
            email: api.email,
        }
    }
}

/// Lightweight repository summary for listing views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    /// Repository name.
    pub name: String,
    /// `owner/repo` form.
    pub full_name: Option<String>,
    /// Whether the repository is private.
    pub private: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRepository {
    pub(super) name: String,
    pub(super) full_name: Option<String>,
    #[serde(default)]
    pub(super) private: bool,
}

impl From<ApiRepository> for RepositorySummary {
    fn from(api: ApiRepository) -> Self {
        Self {
            name: api.name,
            full_name: api.full_name,
            private: api.private,
        }
    }
}

/// Affiliation filter for listing the authenticated user's repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepositoryAffiliation {
    /// Every repository the user can access.
    #[default]
    All,
    /// Repositories the user owns.
    Owner,
    /// Public repositories.
    Public,
    /// Private repositories.
    Private,
    /// Repositories the user is a collaborator on.
    Member,
}

impl RepositoryAffiliation {
    /// Query-parameter value for the listing endpoint.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Owner => "owner",
            Self::Public => "public",
            Self::Private => "private",
            Self::Member => "member",
        }
    }
}

/// Issue summary used by the lookup and lifecycle helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Issue number within the repository.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// State (e.g. open, closed).
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiIssue {
    pub(super) number: u64,
    pub(super) title: String,
    pub(super) state: Option<String>,
}

impl From<ApiIssue> for Issue {
    fn from(api: ApiIssue) -> Self {
        Self {
            number: api.number,
            title: api.title,
            state: api.state,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiAccount {
    pub(super) login: Option<String>,
}
