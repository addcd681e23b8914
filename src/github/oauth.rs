//! OAuth authorization-code flow and per-domain app credentials.
//!
//! A deployment may serve several domains, each registered as its own GitHub
//! OAuth application. Credentials are keyed by the domain they were
//! registered for; the domain rides along in the `state` parameter so the
//! callback can select the matching credential set for the code exchange.
//!
//! Storing the credentials securely is the caller's concern, as is wiring
//! the authorize redirect and callback into whatever HTTP server hosts the
//! flow.

use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

use super::error::WatchError;
use super::locator::PersonalAccessToken;

/// OAuth application credentials for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCredentials {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl AppCredentials {
    /// Validates and wraps a credential set.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::Configuration` when any field is blank.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> Result<Self, WatchError> {
        for (name, value) in [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
        ] {
            if value.trim().is_empty() {
                return Err(WatchError::Configuration {
                    message: format!("{name} must not be blank"),
                });
            }
        }

        Ok(Self {
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            redirect_uri: redirect_uri.to_owned(),
        })
    }

    /// OAuth client identifier.
    #[must_use]
    pub const fn client_id(&self) -> &str {
        self.client_id.as_str()
    }

    /// Registered redirect URI prefix.
    #[must_use]
    pub const fn redirect_uri(&self) -> &str {
        self.redirect_uri.as_str()
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    access_token: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Authorization-code flow against GitHub's OAuth endpoints.
///
/// Owns the per-domain credential registry. One instance per application;
/// no process-global state.
#[derive(Debug)]
pub struct OAuthFlow {
    oauth_base: Url,
    credentials: HashMap<String, AppCredentials>,
    http: reqwest::Client,
}

impl OAuthFlow {
    /// Creates a flow against `https://github.com`.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::InvalidUrl` if the fixed base URL fails to parse,
    /// which would indicate a broken `url` dependency.
    pub fn new() -> Result<Self, WatchError> {
        let oauth_base = Url::parse("https://github.com")
            .map_err(|error| WatchError::InvalidUrl(error.to_string()))?;
        Ok(Self::with_base(oauth_base))
    }

    /// Creates a flow against an alternative OAuth base URL.
    ///
    /// Intended for GitHub Enterprise installations and for tests pointing
    /// at a local mock server.
    #[must_use]
    pub fn with_base(oauth_base: Url) -> Self {
        Self {
            oauth_base,
            credentials: HashMap::new(),
            http: reqwest::Client::new(),
        }
    }

    /// Registers OAuth app credentials for a domain.
    ///
    /// Re-registering a domain replaces its credentials.
    pub fn register_app(&mut self, domain: &str, credentials: AppCredentials) {
        self.credentials.insert(domain.to_owned(), credentials);
    }

    fn credentials_for(&self, domain: &str) -> Result<&AppCredentials, WatchError> {
        self.credentials
            .get(domain)
            .ok_or_else(|| WatchError::Configuration {
                message: format!(
                    "no OAuth app registered for domain '{domain}'; call register_app first"
                ),
            })
    }

    /// Builds the authorize URL a caller should redirect the browser to.
    ///
    /// `callback_path` is appended to the registered redirect URI so the
    /// callback lands back on the page that initiated the flow. The domain is
    /// carried in `state` and must be passed back to [`Self::exchange_code`].
    ///
    /// # Errors
    ///
    /// Returns `WatchError::Configuration` when the domain has no registered
    /// app, or `WatchError::InvalidUrl` when the URL cannot be built.
    pub fn authorize_url(
        &self,
        domain: &str,
        scope: &str,
        callback_path: &str,
    ) -> Result<Url, WatchError> {
        let credentials = self.credentials_for(domain)?;

        let mut authorize = self
            .oauth_base
            .join("/login/oauth/authorize")
            .map_err(|error| WatchError::InvalidUrl(error.to_string()))?;
        authorize
            .query_pairs_mut()
            .append_pair(
                "redirect_uri",
                &format!("{}{callback_path}", credentials.redirect_uri),
            )
            .append_pair("scope", scope)
            .append_pair("client_id", &credentials.client_id)
            .append_pair("state", domain);
        Ok(authorize)
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// `state` is the value issued by [`Self::authorize_url`] and selects the
    /// credential set.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::Configuration` for an unregistered domain,
    /// `WatchError::Network` when the exchange request fails, and
    /// `WatchError::OAuthExchange` when GitHub answers without a token.
    pub async fn exchange_code(
        &self,
        state: &str,
        code: &str,
    ) -> Result<PersonalAccessToken, WatchError> {
        let credentials = self.credentials_for(state)?;

        let token_url = self
            .oauth_base
            .join("/login/oauth/access_token")
            .map_err(|error| WatchError::InvalidUrl(error.to_string()))?;

        let form = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", code),
            ("state", state),
        ];

        let response = self
            .http
            .post(token_url)
            .header(http::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|error| WatchError::Network {
                message: format!("token exchange failed: {error}"),
            })?;

        let exchange: ExchangeResponse =
            response.json().await.map_err(|error| WatchError::OAuthExchange {
                message: format!("token response decode failed: {error}"),
            })?;

        exchange.access_token.map_or_else(
            || {
                Err(WatchError::OAuthExchange {
                    message: exchange
                        .error_description
                        .or(exchange.error)
                        .unwrap_or_else(|| "response carried no access token".to_owned()),
                })
            },
            PersonalAccessToken::new,
        )
    }
}
