//! Tests for the Octocrab gateway implementations.
#![expect(clippy::expect_used, reason = "Test assertions panic on failure")]

use std::time::Duration;

use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::events::{EventsPayload, OctocrabEventsGateway};
use super::issues::OctocrabIssueGateway;
use super::repository::OctocrabRepositoryGateway;
use super::{EventsGateway, IssueGateway, RepositoryGateway};
use crate::github::error::WatchError;
use crate::github::locator::{PersonalAccessToken, RepositoryLocator};
use crate::github::models::{EventKind, RepositoryAffiliation};

struct GatewayFixture {
    runtime: Runtime,
    server: MockServer,
    locator: RepositoryLocator,
}

impl GatewayFixture {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn events_gateway(&self, token: &PersonalAccessToken) -> OctocrabEventsGateway {
        let _guard = self.runtime.enter();
        OctocrabEventsGateway::for_token(token, &self.locator).expect("should create gateway")
    }

    fn issue_gateway(&self, token: &PersonalAccessToken) -> OctocrabIssueGateway {
        let _guard = self.runtime.enter();
        OctocrabIssueGateway::for_token(token, &self.locator).expect("should create gateway")
    }

    fn repository_gateway(&self, token: &PersonalAccessToken) -> OctocrabRepositoryGateway {
        let _guard = self.runtime.enter();
        OctocrabRepositoryGateway::for_token(token, &self.locator).expect("should create gateway")
    }
}

#[fixture]
fn token() -> PersonalAccessToken {
    PersonalAccessToken::new("valid-token").expect("token should be valid")
}

#[fixture]
fn fixture() -> GatewayFixture {
    let runtime = Runtime::new().expect("runtime should start");
    let server = runtime.block_on(MockServer::start());
    let locator = RepositoryLocator::parse(&format!("{}/owner/repo", server.uri()))
        .expect("should create repository locator");
    GatewayFixture {
        runtime,
        server,
        locator,
    }
}

const EVENTS_PATH: &str = "/api/v3/repos/owner/repo/events";

#[rstest]
fn events_feed_parses_records_and_metadata(fixture: GatewayFixture, token: PersonalAccessToken) {
    let gateway = fixture.events_gateway(&token);

    let response = ResponseTemplate::new(200)
        .set_body_json(serde_json::json!([
            {
                "id": "7",
                "type": "PushEvent",
                "actor": { "login": "octocat" },
                "payload": { "size": 1 },
                "created_at": "2025-01-02T00:00:00Z"
            },
            {
                "id": "6",
                "type": "SponsorshipEvent",
                "payload": {}
            }
        ]))
        .insert_header("ETag", "\"etag-1\"")
        .insert_header("X-Poll-Interval", "42");

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let page = fixture
        .block_on(gateway.repository_events(&fixture.locator, None))
        .expect("fetch should succeed");

    assert_eq!(page.cache_token.as_deref(), Some("\"etag-1\""));
    assert_eq!(page.poll_interval, Duration::from_secs(42));

    let EventsPayload::Fresh(events) = page.payload else {
        panic!("expected fresh payload, got {:?}", page.payload);
    };
    assert_eq!(events.len(), 2);
    let newest = events.first().expect("should have newest event");
    assert_eq!(newest.id, "7");
    assert_eq!(newest.kind, EventKind::Push);
    assert_eq!(newest.actor.as_deref(), Some("octocat"));
    let unknown = events.get(1).expect("should have second event");
    assert_eq!(unknown.kind, EventKind::Unknown);
}

#[rstest]
fn conditional_fetch_presents_cache_token(fixture: GatewayFixture, token: PersonalAccessToken) {
    let gateway = fixture.events_gateway(&token);

    // The mock only matches when If-None-Match is sent, so a 304 result
    // proves the conditional header went out.
    let response = ResponseTemplate::new(304)
        .insert_header("ETag", "\"etag-1\"")
        .insert_header("X-Poll-Interval", "60");

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .and(header("If-None-Match", "\"etag-1\""))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let page = fixture
        .block_on(gateway.repository_events(&fixture.locator, Some("\"etag-1\"")))
        .expect("fetch should succeed");

    assert_eq!(page.payload, EventsPayload::NotModified);
    assert_eq!(page.cache_token.as_deref(), Some("\"etag-1\""));
    assert_eq!(page.poll_interval, Duration::from_secs(60));
}

#[rstest]
fn undecodable_feed_is_malformed_with_default_interval(
    fixture: GatewayFixture,
    token: PersonalAccessToken,
) {
    let gateway = fixture.events_gateway(&token);

    let response =
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "not": "a feed" }));

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let page = fixture
        .block_on(gateway.repository_events(&fixture.locator, None))
        .expect("fetch should succeed");

    assert!(
        matches!(page.payload, EventsPayload::Malformed { .. }),
        "expected malformed payload, got {:?}",
        page.payload
    );
    assert_eq!(
        page.poll_interval,
        Duration::from_secs(60),
        "missing X-Poll-Interval falls back to the documented default"
    );
}

#[rstest]
fn events_auth_failure_maps_to_authentication(
    fixture: GatewayFixture,
    token: PersonalAccessToken,
) {
    let gateway = fixture.events_gateway(&token);

    let response = ResponseTemplate::new(401)
        .set_body_json(serde_json::json!({ "message": "Bad credentials" }));

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let error = fixture
        .block_on(gateway.repository_events(&fixture.locator, None))
        .expect_err("fetch should fail");

    match error {
        WatchError::Authentication { message } => {
            assert!(
                message.contains("Bad credentials"),
                "unexpected message: {message}"
            );
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[rstest]
fn exhausted_rate_limit_carries_header_info(
    fixture: GatewayFixture,
    token: PersonalAccessToken,
) {
    const EXPECTED_RESET_AT: u64 = 1_700_000_000;

    let gateway = fixture.events_gateway(&token);

    let response = ResponseTemplate::new(403)
        .set_body_json(serde_json::json!({
            "message": "API rate limit exceeded for user",
            "documentation_url": "https://docs.github.com/rest/rate-limit"
        }))
        .insert_header("X-RateLimit-Limit", "5000")
        .insert_header("X-RateLimit-Remaining", "0")
        .insert_header("X-RateLimit-Reset", EXPECTED_RESET_AT.to_string().as_str());

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let error = fixture
        .block_on(gateway.repository_events(&fixture.locator, None))
        .expect_err("fetch should fail");

    match error {
        WatchError::RateLimitExceeded {
            rate_limit,
            message,
        } => {
            let info = rate_limit.expect("expected rate limit info to be populated");
            assert_eq!(info.reset_at(), EXPECTED_RESET_AT);
            assert!(info.is_exhausted());
            assert!(
                message.contains("API rate limit exceeded"),
                "unexpected message: {message}"
            );
        }
        other => panic!("expected RateLimitExceeded, got {other:?}"),
    }
}

const ISSUES_PATH: &str = "/api/v3/repos/owner/repo/issues";

#[rstest]
fn find_issue_matches_exact_title(fixture: GatewayFixture, token: PersonalAccessToken) {
    let gateway = fixture.issue_gateway(&token);

    let response = ResponseTemplate::new(200).set_body_json(serde_json::json!([
        { "number": 1, "title": "build is broken", "state": "open" },
        { "number": 2, "title": "flaky test", "state": "open" }
    ]));

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let found = fixture
        .block_on(gateway.find_issue(&fixture.locator, "flaky test"))
        .expect("lookup should succeed")
        .expect("issue should be found");
    assert_eq!(found.number, 2);

    let missing = fixture
        .block_on(gateway.find_issue(&fixture.locator, "no such issue"))
        .expect("lookup should succeed");
    assert!(missing.is_none());
}

#[rstest]
fn create_issue_if_absent_posts_when_missing(
    fixture: GatewayFixture,
    token: PersonalAccessToken,
) {
    let gateway = fixture.issue_gateway(&token);

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&fixture.server),
    );
    fixture.block_on(
        Mock::given(method("POST"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "number": 3,
                "title": "build is broken",
                "state": "open"
            })))
            .mount(&fixture.server),
    );

    let created = fixture
        .block_on(gateway.create_issue_if_absent(
            &fixture.locator,
            "build is broken",
            "main stopped compiling",
        ))
        .expect("create should succeed")
        .expect("issue should be created");
    assert_eq!(created.number, 3);
}

#[rstest]
fn create_issue_if_absent_is_a_noop_when_present(
    fixture: GatewayFixture,
    token: PersonalAccessToken,
) {
    let gateway = fixture.issue_gateway(&token);

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "number": 1, "title": "build is broken", "state": "open" }
            ])))
            .mount(&fixture.server),
    );
    fixture.block_on(
        Mock::given(method("POST"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&fixture.server),
    );

    let created = fixture
        .block_on(gateway.create_issue_if_absent(
            &fixture.locator,
            "build is broken",
            "main stopped compiling",
        ))
        .expect("create should succeed");
    assert!(created.is_none(), "existing issue must suppress the create");
}

#[rstest]
fn close_issue_patches_matching_issue(fixture: GatewayFixture, token: PersonalAccessToken) {
    let gateway = fixture.issue_gateway(&token);

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "number": 4, "title": "build is broken", "state": "open" }
            ])))
            .mount(&fixture.server),
    );
    fixture.block_on(
        Mock::given(method("PATCH"))
            .and(path(format!("{ISSUES_PATH}/4")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "number": 4,
                "title": "build is broken",
                "state": "closed"
            })))
            .mount(&fixture.server),
    );

    let closed = fixture
        .block_on(gateway.close_issue(&fixture.locator, "build is broken"))
        .expect("close should succeed")
        .expect("issue should be closed");
    assert_eq!(closed.state.as_deref(), Some("closed"));
}

#[rstest]
fn close_issue_without_match_is_a_noop(fixture: GatewayFixture, token: PersonalAccessToken) {
    let gateway = fixture.issue_gateway(&token);

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&fixture.server),
    );

    let closed = fixture
        .block_on(gateway.close_issue(&fixture.locator, "build is broken"))
        .expect("close should succeed");
    assert!(closed.is_none());
}

#[rstest]
fn branches_list_names_and_heads(fixture: GatewayFixture, token: PersonalAccessToken) {
    let gateway = fixture.repository_gateway(&token);

    let response = ResponseTemplate::new(200).set_body_json(serde_json::json!([
        { "name": "main", "commit": { "sha": "abc123" } },
        { "name": "develop" }
    ]));

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/owner/repo/branches"))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let branches = fixture
        .block_on(gateway.branches(&fixture.locator))
        .expect("list should succeed");

    assert_eq!(branches.len(), 2);
    let main = branches.first().expect("should have first branch");
    assert_eq!(main.name, "main");
    assert_eq!(main.head_sha.as_deref(), Some("abc123"));
}

#[rstest]
fn commit_maps_message_and_author(fixture: GatewayFixture, token: PersonalAccessToken) {
    let gateway = fixture.repository_gateway(&token);

    let response = ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "sha": "abc123",
        "commit": { "message": "fix the build" },
        "author": { "login": "octocat" }
    }));

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/owner/repo/commits/abc123"))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let commit = fixture
        .block_on(gateway.commit(&fixture.locator, "abc123"))
        .expect("fetch should succeed");

    assert_eq!(commit.sha, "abc123");
    assert_eq!(commit.message.as_deref(), Some("fix the build"));
    assert_eq!(commit.author.as_deref(), Some("octocat"));
}

#[rstest]
fn authenticated_user_maps_account(fixture: GatewayFixture, token: PersonalAccessToken) {
    let gateway = fixture.repository_gateway(&token);

    let response = ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "login": "octocat",
        "name": "The Octocat",
        "email": null
    }));

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path("/api/v3/user"))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let account = fixture
        .block_on(gateway.authenticated_user())
        .expect("fetch should succeed");

    assert_eq!(account.login, "octocat");
    assert_eq!(account.name.as_deref(), Some("The Octocat"));
    assert!(account.email.is_none());
}

#[rstest]
fn repositories_pass_affiliation_query(fixture: GatewayFixture, token: PersonalAccessToken) {
    let gateway = fixture.repository_gateway(&token);

    let response = ResponseTemplate::new(200).set_body_json(serde_json::json!([
        { "name": "widgets", "full_name": "acme/widgets", "private": true }
    ]));

    fixture.block_on(
        Mock::given(method("GET"))
            .and(path("/api/v3/user/repos"))
            .and(query_param("sort", "created"))
            .and(query_param("type", "member"))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let repos = fixture
        .block_on(gateway.repositories(RepositoryAffiliation::Member))
        .expect("list should succeed");

    assert_eq!(repos.len(), 1);
    let repo = repos.first().expect("should have first repository");
    assert_eq!(repo.full_name.as_deref(), Some("acme/widgets"));
    assert!(repo.private);
}
