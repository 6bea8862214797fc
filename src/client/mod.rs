//! Usergrid client
//!
//! `Client` ties a `ClientContext` to a `RequestExecutor`. Requests built
//! through it are rooted at the application URL and carry whichever auth
//! the context selects.
//!
//! # Example
//!
//! ```no_run
//! use usergrid_client::{Client, ClientConfig, UserAuth, UsergridQuery};
//!
//! # async fn run() -> usergrid_client::Result<()> {
//! let client = Client::new(ClientConfig::new("acme", "sandbox"))?;
//! client.authenticate_user(UserAuth::new("alice", "secret"), true).await;
//!
//! let response = client
//!     .get("dogs", Some(UsergridQuery::new().eq("breed", "beagle").limit(10)))
//!     .await;
//! for dog in response.entities() {
//!     println!("{:?}", dog.name);
//! }
//! # Ok(())
//! # }
//! ```

mod context;

pub use context::ClientContext;

use crate::auth::{Auth, UserAuth};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{RequestExecutor, TokenEndpoints};
use crate::query::UsergridQuery;
use crate::request::{RequestDescriptor, RequestDescriptorBuilder};
use crate::response::{Response, User};
use crate::types::{JsonValue, Method};
use std::sync::Arc;
use tracing::info;

/// Client for one Usergrid application
#[derive(Debug)]
pub struct Client {
    context: Arc<ClientContext>,
    executor: RequestExecutor,
}

impl Client {
    /// Create a client from a validated config
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = config.http;
        let context = Arc::new(ClientContext::new(config));
        let endpoints: Arc<dyn TokenEndpoints> = context.clone();
        let executor = RequestExecutor::with_config(endpoints, http)?;
        Ok(Self { context, executor })
    }

    /// Replace the `User-Agent` sent with every request
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.executor = self.executor.with_user_agent(user_agent);
        self
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    pub fn config(&self) -> &ClientConfig {
        self.context.config()
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn client_app_url(&self) -> String {
        self.context.client_app_url()
    }

    pub fn management_url(&self) -> String {
        self.context.management_url()
    }

    pub fn current_user(&self) -> Option<User> {
        self.context.current_user()
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Authenticate the configured application credentials
    pub async fn authenticate_app(&self) -> Response {
        match self.context.app_auth() {
            Some(app_auth) => self.executor.authenticate_app(&app_auth).await,
            None => Response::from_error(&Error::auth("no application credentials configured")),
        }
    }

    /// Authenticate a user, optionally making them the current user
    pub async fn authenticate_user(&self, user_auth: UserAuth, set_as_current: bool) -> Response {
        let user_auth = Arc::new(user_auth);
        let response = self.executor.authenticate_user(&user_auth).await;

        if set_as_current && response.ok() {
            let user = response.user().cloned().unwrap_or_else(|| {
                let mut user = User::default();
                user.username = Some(user_auth.username().to_string());
                user.set_user_auth(Arc::clone(&user_auth));
                user
            });
            info!(username = user_auth.username(), "Current user set");
            self.context.set_current_user(Some(user));
        }

        response
    }

    /// Revoke the current user's token and forget the user
    ///
    /// The local token is dropped even when the server call fails.
    pub async fn logout_current_user(&self) -> Response {
        let Some(user) = self.context.current_user() else {
            return Response::from_error(&Error::auth("no current user"));
        };
        let Some(user_auth) = user.user_auth().cloned() else {
            self.context.set_current_user(None);
            return Response::from_error(&Error::auth("current user has no credentials"));
        };
        let (Some(id), Some(token)) = (user.uuid_or_username(), user_auth.access_token()) else {
            self.context.set_current_user(None);
            return Response::from_error(&Error::auth("current user is not authenticated"));
        };

        let request = RequestDescriptor::builder(Method::PUT, self.client_app_url())
            .paths(["users", id, "revoketoken"])
            .parameter("token", token)
            .auth(Arc::clone(&user_auth))
            .build();
        let response = self.executor.perform_request(&request).await;

        Auth::User(user_auth).clear_token();
        self.context.set_current_user(None);
        response
    }

    /// Use `auth` for the next request only
    pub fn using_auth(&self, auth: impl Into<Auth>) -> &Self {
        self.context.set_temp_auth(Some(auth.into()));
        self
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Start a descriptor rooted at the application URL with the ambient auth
    pub fn request(&self, method: Method) -> RequestDescriptorBuilder {
        RequestDescriptor::builder(method, self.client_app_url())
            .maybe_auth(self.context.auth_for_requests())
    }

    /// Send a descriptor as-is
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Response {
        self.executor.perform_request(descriptor).await
    }

    /// Fetch the next page of a previous response
    pub async fn next_page(&self, previous: &Response) -> Option<Response> {
        let request = previous.next_page_request()?;
        Some(self.send(&request).await)
    }

    /// Query a collection
    pub async fn get(&self, collection: &str, query: Option<UsergridQuery>) -> Response {
        let mut builder = self.request(Method::GET).path(collection);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        self.send(&builder.build()).await
    }

    /// Fetch one entity by uuid or name
    pub async fn get_entity(&self, collection: &str, uuid_or_name: &str) -> Response {
        let request = self
            .request(Method::GET)
            .paths([collection, uuid_or_name])
            .build();
        self.send(&request).await
    }

    /// Create an entity in a collection
    pub async fn post(&self, collection: &str, data: JsonValue) -> Response {
        let request = self.request(Method::POST).path(collection).data(data).build();
        self.send(&request).await
    }

    /// Update an entity by uuid or name
    pub async fn put(&self, collection: &str, uuid_or_name: &str, data: JsonValue) -> Response {
        let request = self
            .request(Method::PUT)
            .paths([collection, uuid_or_name])
            .data(data)
            .build();
        self.send(&request).await
    }

    /// Delete an entity by uuid or name
    pub async fn delete(&self, collection: &str, uuid_or_name: &str) -> Response {
        let request = self
            .request(Method::DELETE)
            .paths([collection, uuid_or_name])
            .build();
        self.send(&request).await
    }
}

#[cfg(test)]
mod tests;
