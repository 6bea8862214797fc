//! Request descriptor
//!
//! A `RequestDescriptor` is the immutable description of one API call. It
//! renders itself into a transport request without performing any I/O:
//! URL assembly, body serialization and header injection all happen here,
//! and the executor only sends the result.

use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::query::Query;
use crate::types::{JsonValue, Method, StringMap, APPLICATION_JSON};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use url::Url;

/// Description of one HTTP call before it is executed
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    content_type: String,
    base_url: String,
    path_segments: Vec<String>,
    query: Option<Arc<dyn Query>>,
    parameters: Option<StringMap>,
    headers: Option<StringMap>,
    data: Option<JsonValue>,
    auth: Option<Auth>,
}

impl RequestDescriptor {
    /// Start a descriptor for `method` against `base_url`
    pub fn builder(method: Method, base_url: impl Into<String>) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::new(method, base_url)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    pub fn query(&self) -> Option<&dyn Query> {
        self.query.as_deref()
    }

    pub fn parameters(&self) -> Option<&StringMap> {
        self.parameters.as_ref()
    }

    pub fn headers(&self) -> Option<&StringMap> {
        self.headers.as_ref()
    }

    pub fn data(&self) -> Option<&JsonValue> {
        self.data.as_ref()
    }

    pub fn auth(&self) -> Option<&Auth> {
        self.auth.as_ref()
    }

    /// Copy of this descriptor with one parameter added or replaced
    #[must_use]
    pub fn with_parameter(&self, key: impl Into<String>, value: impl ToString) -> Self {
        let mut parameters = self.parameters.clone().unwrap_or_default();
        parameters.insert(key.into(), value.to_string());
        Self {
            parameters: Some(parameters),
            ..self.clone()
        }
    }

    /// Copy of this descriptor positioned at `cursor`
    ///
    /// A query that carries its own cursor gets the new one in place of the
    /// old; otherwise the cursor goes in as a URL parameter. Either way the
    /// URL ends up with a single `cursor` pair.
    #[must_use]
    pub fn with_cursor(&self, cursor: &str) -> Self {
        match self.query.as_ref().and_then(|q| q.with_cursor(cursor)) {
            Some(query) => {
                let parameters = self.parameters.clone().map(|mut p| {
                    p.remove("cursor");
                    p
                });
                Self {
                    query: Some(query),
                    parameters,
                    ..self.clone()
                }
            }
            None => self.with_parameter("cursor", cursor),
        }
    }

    /// Compose the target URL
    ///
    /// Path segments are appended to the base URL with `/`, then the query
    /// fragment, then the result is parsed and the parameters are added as
    /// encoded query pairs. A composed string that does not parse fails
    /// with `Error::InvalidUrl` naming that string.
    pub fn construct_url(&self) -> Result<Url> {
        let mut composed = self.base_url.clone();

        for segment in &self.path_segments {
            composed.push('/');
            composed.push_str(segment);
        }

        if let Some(query) = &self.query {
            composed.push_str(&query.render(true));
        }

        let mut url = Url::parse(&composed).map_err(|e| Error::invalid_url(&composed, e))?;

        if let Some(parameters) = self.parameters.as_ref().filter(|p| !p.is_empty()) {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in parameters {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Serialize the payload for methods that carry a body
    ///
    /// POST and PUT always get a body, the empty string when there is no
    /// data. GET and DELETE never do, even if data was supplied.
    pub fn construct_request_body(&self) -> Option<String> {
        if !self.method.has_body() {
            return None;
        }
        Some(
            self.data
                .as_ref()
                .map(JsonValue::to_string)
                .unwrap_or_default(),
        )
    }

    /// Apply the built-in and caller-supplied headers
    ///
    /// The bearer token is sent whenever the credential holder has one,
    /// expired or not. Caller headers are appended after the built-in
    /// ones, so a colliding key ends up on the wire twice.
    pub fn add_headers(&self, req: RequestBuilder, user_agent: &str) -> RequestBuilder {
        let mut req = req.header(USER_AGENT, user_agent);

        if let Some(token) = self
            .auth
            .as_ref()
            .and_then(Auth::access_token)
            .filter(|t| !t.is_empty())
        {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        if let Some(headers) = &self.headers {
            for (key, value) in headers {
                req = req.header(key.as_str(), value.as_str());
            }
        }

        req
    }

    /// Render into a transport request for `client`
    ///
    /// The client carries the connect and socket timeouts; this never
    /// performs I/O. No `Expect: 100-continue` header is sent: reqwest has
    /// no continue handshake, so bodies go out with the request head.
    pub fn build_request(&self, client: &Client, user_agent: &str) -> Result<reqwest::Request> {
        let url = self.construct_url()?;
        let mut req = client.request(self.method.into(), url);

        if let Some(body) = self.construct_request_body() {
            req = req.header(CONTENT_TYPE, self.content_type.as_str()).body(body);
        }

        self.add_headers(req, user_agent)
            .build()
            .map_err(Error::Http)
    }
}

/// Builder for `RequestDescriptor`
#[derive(Debug, Clone)]
pub struct RequestDescriptorBuilder {
    descriptor: RequestDescriptor,
}

impl RequestDescriptorBuilder {
    fn new(method: Method, base_url: impl Into<String>) -> Self {
        Self {
            descriptor: RequestDescriptor {
                method,
                content_type: APPLICATION_JSON.to_string(),
                base_url: base_url.into(),
                path_segments: Vec::new(),
                query: None,
                parameters: None,
                headers: None,
                data: None,
                auth: None,
            },
        }
    }

    /// Set the content type (defaults to JSON, UTF-8)
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.descriptor.content_type = content_type.into();
        self
    }

    /// Append one path segment
    #[must_use]
    pub fn path(mut self, segment: impl Into<String>) -> Self {
        self.descriptor.path_segments.push(segment.into());
        self
    }

    /// Append several path segments in order
    #[must_use]
    pub fn paths<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor
            .path_segments
            .extend(segments.into_iter().map(Into::into));
        self
    }

    /// Set the query filter
    #[must_use]
    pub fn query(mut self, query: impl Query + 'static) -> Self {
        self.descriptor.query = Some(Arc::new(query));
        self
    }

    /// Set an already shared query filter
    #[must_use]
    pub fn shared_query(mut self, query: Arc<dyn Query>) -> Self {
        self.descriptor.query = Some(query);
        self
    }

    /// Add a URL parameter; the value is stored as its text form
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.descriptor
            .parameters
            .get_or_insert_with(StringMap::new)
            .insert(key.into(), value.to_string());
        self
    }

    /// Replace all URL parameters
    #[must_use]
    pub fn parameters(mut self, parameters: StringMap) -> Self {
        self.descriptor.parameters = Some(parameters);
        self
    }

    /// Add a header applied after the built-in ones
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.descriptor
            .headers
            .get_or_insert_with(StringMap::new)
            .insert(key.into(), value.to_string());
        self
    }

    /// Replace all caller headers
    #[must_use]
    pub fn headers(mut self, headers: StringMap) -> Self {
        self.descriptor.headers = Some(headers);
        self
    }

    /// Set the payload sent by POST and PUT
    #[must_use]
    pub fn data(mut self, data: JsonValue) -> Self {
        self.descriptor.data = Some(data);
        self
    }

    /// Attach a credential holder whose token authorizes the call
    #[must_use]
    pub fn auth(mut self, auth: impl Into<Auth>) -> Self {
        self.descriptor.auth = Some(auth.into());
        self
    }

    /// Attach a credential holder if there is one
    #[must_use]
    pub fn maybe_auth(mut self, auth: Option<Auth>) -> Self {
        self.descriptor.auth = auth;
        self
    }

    pub fn build(self) -> RequestDescriptor {
        self.descriptor
    }
}
