//! Client configuration
//!
//! `ClientConfig` describes which Usergrid application the client talks to
//! and how; `HttpConfig` holds the two transport timeouts. Both load from
//! YAML and can be overridden from the environment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default Usergrid API host
pub const DEFAULT_BASE_URL: &str = "https://api.usergrid.com";

/// Default connect and socket timeout, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// HTTP Config
// ============================================================================

/// Transport timeouts applied to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Time allowed to establish a connection, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Time allowed between reads on an open socket, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub socket_timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            socket_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl HttpConfig {
    /// Create a config with explicit timeouts in milliseconds
    pub fn new(connect_timeout_ms: u64, socket_timeout_ms: u64) -> Self {
        Self {
            connect_timeout_ms,
            socket_timeout_ms,
        }
    }

    /// Set the connect timeout
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the socket timeout
    #[must_use]
    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn socket_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }

    /// Build the transport client primed with both timeouts
    pub fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout_duration())
            .read_timeout(self.socket_timeout_duration())
            .build()
            .map_err(Error::Http)
    }
}

// ============================================================================
// Client Config
// ============================================================================

/// Which stored credential is attached to requests by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Never attach a token
    None,
    /// Attach the current user's token
    #[default]
    User,
    /// Attach the application token
    App,
}

/// Application client id and secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Top-level client configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API host, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Organization id or name
    pub org_id: String,

    /// Application id or name
    pub app_id: String,

    /// Default auth attached to requests
    #[serde(default)]
    pub auth_mode: AuthMode,

    /// Application credentials for `authenticate_app`
    #[serde(default)]
    pub app_auth: Option<AppCredentials>,

    /// Transport timeouts
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    /// Create a config for an org/app on the default host
    pub fn new(org_id: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            org_id: org_id.into(),
            app_id: app_id.into(),
            auth_mode: AuthMode::default(),
            app_auth: None,
            http: HttpConfig::default(),
        }
    }

    /// Set the API host
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the auth mode
    #[must_use]
    pub fn auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = mode;
        self
    }

    /// Set the application credentials
    #[must_use]
    pub fn app_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.app_auth = Some(AppCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        });
        self
    }

    /// Set the transport timeouts
    #[must_use]
    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load a config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config: ClientConfig = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    /// Apply `USERGRID_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("USERGRID_BASE_URL") {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(org) = lookup("USERGRID_ORG_ID") {
            self.org_id = org;
        }
        if let Some(app) = lookup("USERGRID_APP_ID") {
            self.app_id = app;
        }
        if let (Some(client_id), Some(client_secret)) = (
            lookup("USERGRID_CLIENT_ID"),
            lookup("USERGRID_CLIENT_SECRET"),
        ) {
            self.app_auth = Some(AppCredentials {
                client_id,
                client_secret,
            });
        }
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::config("base_url cannot be empty"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("Invalid base_url '{}': {e}", self.base_url)))?;
        if self.org_id.is_empty() {
            return Err(Error::config("org_id cannot be empty"));
        }
        if self.app_id.is_empty() {
            return Err(Error::config("app_id cannot be empty"));
        }
        Ok(())
    }
}
