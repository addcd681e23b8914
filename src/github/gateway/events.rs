//! Octocrab gateway for the repository activity feed.
//!
//! The feed is fetched with a conditional GET: when the previous response
//! carried an `ETag`, it is presented as `If-None-Match` so the server can
//! short-circuit unchanged feeds with a bodyless 304. Either way the response
//! headers carry the next cache token and the `X-Poll-Interval` the session
//! must respect before fetching again.

use std::time::Duration;

use async_trait::async_trait;
use http::header::ETAG;
use http::{StatusCode, Uri};
use octocrab::Octocrab;

use crate::github::error::WatchError;
use crate::github::locator::{PersonalAccessToken, RepositoryLocator};
use crate::github::models::{ApiEvent, EventRecord};

use super::EventsGateway;
use super::client::build_octocrab_client;
use super::error_mapping::{map_http_error, map_octocrab_error};
use super::http_utils::{
    build_conditional_headers, extract_github_message, header_to_string,
    poll_interval_from_headers, rate_limit_from_headers,
};

/// Payload classification for one events fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventsPayload {
    /// The server returned a fresh feed, ordered newest first.
    Fresh(Vec<EventRecord>),
    /// The feed is unchanged since the presented cache token (304).
    NotModified,
    /// The response body could not be decoded as an event list.
    ///
    /// The fetch itself succeeded, so the page still carries usable
    /// scheduling metadata; only dispatch is skipped for the iteration.
    Malformed {
        /// Decoder error detail, for logging.
        detail: String,
    },
}

/// Outcome of one fetch against the events endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsPage {
    /// Decoded payload, or the reason there is none.
    pub payload: EventsPayload,
    /// Cache-validation token to present on the next fetch, when sent.
    pub cache_token: Option<String>,
    /// Server-dictated minimum delay before the next fetch.
    pub poll_interval: Duration,
}

/// Octocrab-backed events gateway.
pub struct OctocrabEventsGateway {
    client: Octocrab,
}

impl OctocrabEventsGateway {
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
impl EventsGateway for OctocrabEventsGateway {
    async fn repository_events<'a>(
        &self,
        locator: &RepositoryLocator,
        cache_token: Option<&'a str>,
    ) -> Result<EventsPage, WatchError> {
        let headers = build_conditional_headers(cache_token);
        let uri: Uri = locator
            .events_path()
            .parse::<Uri>()
            .map_err(|error| WatchError::InvalidUrl(error.to_string()))?;

        let response = self
            .client
            ._get_with_headers(uri, headers)
            .await
            .map_err(|error| map_octocrab_error("repository events", &error))?;

        let status = response.status();
        let new_cache_token = header_to_string(response.headers().get(ETAG));
        let poll_interval = poll_interval_from_headers(response.headers());
        let rate_limit = rate_limit_from_headers(response.headers());

        match status {
            StatusCode::NOT_MODIFIED => Ok(EventsPage {
                payload: EventsPayload::NotModified,
                cache_token: new_cache_token,
                poll_interval,
            }),
            StatusCode::OK => {
                let body = self
                    .client
                    .body_to_string(response)
                    .await
                    .map_err(|error| WatchError::Api {
                        message: format!("events response decode failed: {error}"),
                    })?;

                let payload = match serde_json::from_str::<Vec<ApiEvent>>(&body) {
                    Ok(events) => {
                        EventsPayload::Fresh(events.into_iter().map(EventRecord::from).collect())
                    }
                    Err(error) => EventsPayload::Malformed {
                        detail: format!("events response deserialisation failed: {error}"),
                    },
                };

                Ok(EventsPage {
                    payload,
                    cache_token: new_cache_token,
                    poll_interval,
                })
            }
            _ => {
                let body = self
                    .client
                    .body_to_string(response)
                    .await
                    .unwrap_or_else(|_| String::new());
                let message = extract_github_message(&body);

                if status == StatusCode::FORBIDDEN
                    && rate_limit.is_some_and(|info| info.is_exhausted())
                {
                    return Err(WatchError::RateLimitExceeded {
                        rate_limit,
                        message: message
                            .unwrap_or_else(|| "API rate limit exceeded".to_owned()),
                    });
                }

                Err(map_http_error("repository events", status, message))
            }
        }
    }
}
