//! Request executor
//!
//! Sends descriptors over a timeout-bounded transport and folds every
//! outcome into a `Response`. Also runs the token exchange that fills
//! credential holders with bearer tokens.

use super::endpoints::TokenEndpoints;
use crate::auth::{AppAuth, Auth, CachedToken, UserAuth};
use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::request::RequestDescriptor;
use crate::response::Response;
use crate::types::{JsonValue, Method, APPLICATION_JSON};
use crate::USER_AGENT;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Subtracted from the server-reported lifetime so tokens are renewed
/// before the server rejects them
pub const TOKEN_EXPIRY_MARGIN_MS: i64 = 5_000;

/// Executes request descriptors and authenticates credential holders
pub struct RequestExecutor {
    client: Client,
    config: HttpConfig,
    endpoints: Arc<dyn TokenEndpoints>,
    user_agent: String,
}

impl RequestExecutor {
    /// Create an executor with default timeouts
    pub fn new(endpoints: Arc<dyn TokenEndpoints>) -> Result<Self> {
        Self::with_config(endpoints, HttpConfig::default())
    }

    /// Create an executor with custom timeouts
    pub fn with_config(endpoints: Arc<dyn TokenEndpoints>, config: HttpConfig) -> Result<Self> {
        Ok(Self {
            client: config.build_client()?,
            config,
            endpoints,
            user_agent: USER_AGENT.to_string(),
        })
    }

    /// Replace the `User-Agent` sent with every request
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Send a descriptor and normalize the outcome
    ///
    /// Never fails: URL errors, transport errors and timeouts all come
    /// back as a `Response` whose `ok()` is false.
    pub async fn perform_request(&self, descriptor: &RequestDescriptor) -> Response {
        match self.execute(descriptor).await {
            Ok(raw) => Response::from_transport(descriptor.clone(), raw).await,
            Err(e) => {
                warn!(
                    method = %descriptor.method(),
                    base_url = descriptor.base_url(),
                    error = %e,
                    "Request failed"
                );
                Response::from_error(&e)
            }
        }
    }

    async fn execute(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Response> {
        let request = descriptor.build_request(&self.client, &self.user_agent)?;
        debug!("Sending request: {} {}", request.method(), request.url());

        self.client.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                let timeout_ms = if e.is_connect() {
                    self.config.connect_timeout_ms
                } else {
                    self.config.socket_timeout_ms
                };
                Error::Timeout { timeout_ms }
            } else {
                Error::Http(e)
            }
        })
    }

    /// Exchange credentials for a token and cache it on the holder
    ///
    /// The holder is updated only when the response carries both a token
    /// and a lifetime that yields a representable expiry; otherwise it is
    /// left as it was and the response is returned untouched. Exchanges on
    /// the same holder are serialized.
    async fn authenticate(&self, auth: &Auth) -> Response {
        let _exchange = auth.exchange_lock().lock().await;

        let credentials: JsonValue = auth
            .credentials_map()
            .into_iter()
            .map(|(k, v)| (k, JsonValue::String(v)))
            .collect::<serde_json::Map<_, _>>()
            .into();

        let url = if auth.is_admin_user() {
            self.endpoints.management_url()
        } else {
            self.endpoints.client_app_url()
        };

        let request = RequestDescriptor::builder(Method::POST, url)
            .content_type(APPLICATION_JSON)
            .path("token")
            .data(credentials)
            .maybe_auth(self.endpoints.auth_for_requests())
            .build();

        let response = self.perform_request(&request).await;

        let cached = response
            .access_token()
            .zip(response.expires())
            .and_then(|(token, expires)| {
                let lifetime = expires.checked_sub(TOKEN_EXPIRY_MARGIN_MS)?;
                CachedToken::expires_in_millis(token.to_string(), lifetime)
            });

        match cached {
            Some(cached) => {
                info!(
                    kind = auth.kind(),
                    expires_at = %cached.expires_at,
                    "Access token cached"
                );
                auth.store_token(cached);
            }
            None => {
                warn!(
                    kind = auth.kind(),
                    status = response.status(),
                    expires_in = ?response.expires(),
                    "Token exchange incomplete, credentials left unauthenticated"
                );
            }
        }

        response
    }

    /// Authenticate application credentials
    pub async fn authenticate_app(&self, app_auth: &Arc<AppAuth>) -> Response {
        self.authenticate(&Auth::App(Arc::clone(app_auth))).await
    }

    /// Authenticate user credentials
    ///
    /// On success the returned user entity carries `user_auth`, so it can
    /// make authenticated calls of its own.
    pub async fn authenticate_user(&self, user_auth: &Arc<UserAuth>) -> Response {
        let mut response = self.authenticate(&Auth::User(Arc::clone(user_auth))).await;
        if response.ok() {
            if let Some(user) = response.user_mut() {
                user.set_user_auth(Arc::clone(user_auth));
            }
        }
        response
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}
