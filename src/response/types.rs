//! Entities parsed out of API responses

use crate::auth::UserAuth;
use crate::types::JsonObject;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error detail carried by a failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    /// Short error name (`error` field of the API body, or the client-side kind)
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server-side exception class, when the API reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

impl ResponseError {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            exception: None,
        }
    }
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {}", self.name, description),
            None => f.write_str(&self.name),
        }
    }
}

/// A generic Usergrid entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Every other property
    #[serde(flatten)]
    pub properties: JsonObject,
}

impl Entity {
    /// Look up a property that is not one of the named fields
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

/// A user entity
///
/// After a successful `authenticate_user` the user carries the credential
/// holder it was authenticated with, so it can make calls on its own
/// behalf.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub activated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(flatten)]
    pub properties: JsonObject,
    #[serde(skip)]
    auth: Option<Arc<UserAuth>>,
}

impl User {
    pub fn user_auth(&self) -> Option<&Arc<UserAuth>> {
        self.auth.as_ref()
    }

    pub fn set_user_auth(&mut self, auth: Arc<UserAuth>) {
        self.auth = Some(auth);
    }

    /// Identifier usable in a URL path: uuid, else username, else email
    pub fn uuid_or_username(&self) -> Option<&str> {
        self.uuid
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
    }
}
