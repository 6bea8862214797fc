//! Client context
//!
//! Owns the state a client shares with its executor: endpoint URLs, the
//! application credentials, the current user and a one-shot auth override.

use crate::auth::{AppAuth, Auth};
use crate::config::{AuthMode, ClientConfig};
use crate::http::TokenEndpoints;
use crate::response::User;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared client state
#[derive(Debug)]
pub struct ClientContext {
    config: ClientConfig,
    app_auth: RwLock<Option<Arc<AppAuth>>>,
    current_user: RwLock<Option<User>>,
    /// Used by the next request only
    temp_auth: RwLock<Option<Auth>>,
}

impl ClientContext {
    pub fn new(config: ClientConfig) -> Self {
        let app_auth = config
            .app_auth
            .as_ref()
            .map(|c| Arc::new(AppAuth::new(&c.client_id, &c.client_secret)));

        Self {
            config,
            app_auth: RwLock::new(app_auth),
            current_user: RwLock::new(None),
            temp_auth: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn app_auth(&self) -> Option<Arc<AppAuth>> {
        self.app_auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the application credentials
    pub fn set_app_auth(&self, app_auth: Option<Arc<AppAuth>>) {
        *self.app_auth.write().unwrap_or_else(PoisonError::into_inner) = app_auth;
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_current_user(&self, user: Option<User>) {
        *self
            .current_user
            .write()
            .unwrap_or_else(PoisonError::into_inner) = user;
    }

    /// Attach `auth` to the next request instead of the configured default
    pub fn set_temp_auth(&self, auth: Option<Auth>) {
        *self.temp_auth.write().unwrap_or_else(PoisonError::into_inner) = auth;
    }

    fn take_temp_auth(&self) -> Option<Auth> {
        self.temp_auth
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl TokenEndpoints for ClientContext {
    fn client_app_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url, self.config.org_id, self.config.app_id
        )
    }

    fn management_url(&self) -> String {
        format!("{}/management", self.config.base_url)
    }

    fn auth_for_requests(&self) -> Option<Auth> {
        if let Some(temp) = self.take_temp_auth() {
            if temp.is_valid_token() {
                return Some(temp);
            }
        }

        match self.config.auth_mode {
            AuthMode::None => None,
            AuthMode::User => self
                .current_user()
                .and_then(|user| user.user_auth().cloned())
                .map(Auth::User)
                .filter(Auth::is_valid_token),
            AuthMode::App => self
                .app_auth()
                .map(Auth::App)
                .filter(Auth::is_valid_token),
        }
    }
}
