//! Normalized API responses
//!
//! Every call made through the executor produces a `Response`, whether the
//! server answered or the request never left the client. Callers check
//! `ok()` instead of matching on errors.

mod types;

pub use types::{Entity, ResponseError, User};

use crate::error::Error;
use crate::request::RequestDescriptor;
use crate::types::{JsonValue, StringMap};
use serde_json::json;
use tracing::debug;

/// Outcome of one API call
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: u16,
    headers: StringMap,
    raw: Option<JsonValue>,
    entities: Vec<Entity>,
    cursor: Option<String>,
    access_token: Option<String>,
    expires: Option<i64>,
    user: Option<User>,
    error: Option<ResponseError>,
    request: Option<RequestDescriptor>,
}

impl Response {
    /// Build from a transport response, reading its body
    pub async fn from_transport(request: RequestDescriptor, raw: reqwest::Response) -> Self {
        let status = raw.status().as_u16();
        let headers = raw
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        match raw.text().await {
            Ok(body) => {
                debug!(status, bytes = body.len(), "Response received");
                Self::from_body(status, headers, &body, Some(request))
            }
            Err(e) => Self::from_error(&Error::Http(e)),
        }
    }

    /// Build from a status line, headers and body text
    pub fn from_body(
        status: u16,
        headers: StringMap,
        body: &str,
        request: Option<RequestDescriptor>,
    ) -> Self {
        let mut response = Self {
            status,
            headers,
            request,
            ..Self::default()
        };

        let raw: Option<JsonValue> = serde_json::from_str(body).ok();
        if let Some(JsonValue::Object(obj)) = &raw {
            response.entities = obj
                .get("entities")
                .and_then(JsonValue::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| serde_json::from_value(item.clone()).ok())
                        .collect()
                })
                .unwrap_or_default();

            response.cursor = string_field(obj.get("cursor"));
            response.access_token = string_field(obj.get("access_token"));
            response.expires = obj.get("expires_in").and_then(integer_field);

            response.user = obj
                .get("user")
                .and_then(|u| serde_json::from_value(u.clone()).ok())
                .or_else(|| {
                    obj.get("entities")
                        .and_then(|e| e.get(0))
                        .filter(|e| e.get("type").and_then(JsonValue::as_str) == Some("user"))
                        .and_then(|e| serde_json::from_value(e.clone()).ok())
                });

            if let Some(name) = string_field(obj.get("error")) {
                response.error = Some(ResponseError {
                    name,
                    description: string_field(obj.get("error_description")),
                    exception: string_field(obj.get("exception")),
                });
            }
        }
        response.raw = raw;

        if response.error.is_none() && status >= 400 {
            let reason = reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string);
            response.error = Some(ResponseError::new("http_error", reason));
        }

        response
    }

    /// Build a failure response for a request that never produced a
    /// transport response
    pub fn from_error(error: &Error) -> Self {
        Self {
            error: Some(ResponseError::new(error.name(), Some(error.to_string()))),
            ..Self::default()
        }
    }

    /// Success predicate: an HTTP status below 400 and no error body
    pub fn ok(&self) -> bool {
        (1..400).contains(&self.status) && self.error.is_none()
    }

    /// HTTP status, or 0 when no response was received
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Token lifetime in milliseconds from now
    pub fn expires(&self) -> Option<i64> {
        self.expires
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_mut(&mut self) -> Option<&mut User> {
        self.user.as_mut()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn first(&self) -> Option<&Entity> {
        self.entities.first()
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn has_next_page(&self) -> bool {
        self.cursor.is_some()
    }

    /// The request for the page after this one, when the server returned a cursor
    pub fn next_page_request(&self) -> Option<RequestDescriptor> {
        let cursor = self.cursor.as_ref()?;
        self.request
            .as_ref()
            .map(|req| req.with_cursor(cursor))
    }

    pub fn error(&self) -> Option<&ResponseError> {
        self.error.as_ref()
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parsed JSON body, if the body was JSON
    pub fn raw(&self) -> Option<&JsonValue> {
        self.raw.as_ref()
    }

    /// The descriptor that produced this response
    pub fn request(&self) -> Option<&RequestDescriptor> {
        self.request.as_ref()
    }

    /// Printable summary: status, outcome, error and body
    pub fn to_json(&self) -> JsonValue {
        json!({
            "status": self.status,
            "ok": self.ok(),
            "error": self.error,
            "cursor": self.cursor,
            "body": self.raw,
        })
    }
}

fn string_field(value: Option<&JsonValue>) -> Option<String> {
    value
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepts integers and integer strings
fn integer_field(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
