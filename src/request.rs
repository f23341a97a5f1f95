use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{QueryMeError, Result};

pub const USER_AGENT: &str = "QueryMeApp/1.0";

/// Method, headers and body of one logical request.
///
/// Headers set here are merged over [`default_headers`]; a header present in
/// both wins from this map.
#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    /// POST with an already serialized body.
    pub fn post(body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            headers: HeaderMap::new(),
            body: Some(body.into()),
        }
    }

    /// POST with `payload` serialized as JSON.
    pub fn post_json<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        let body = serde_json::to_string(payload)
            .map_err(|err| QueryMeError::InvalidRequest(format!("unserializable body: {err}")))?;
        Ok(Self::post(body))
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds a header from plain strings, rejecting invalid names or values.
    pub fn try_header(self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| QueryMeError::InvalidRequest(format!("invalid header name '{name}'")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| QueryMeError::InvalidRequest(format!("invalid value for header '{name}'")))?;
        Ok(self.with_header(name, value))
    }

    pub(crate) fn merged_headers(&self) -> HeaderMap {
        // `extend` replaces a default entry wholesale but keeps every value
        // the caller appended under the same name.
        let mut headers = default_headers();
        headers.extend(self.headers.clone());
        headers
    }
}

/// Headers sent with every request unless the caller overrides them.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers
}

/// A fully read HTTP response. Decoding the body is left to the caller.
#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    body: String,
}

impl Response {
    pub(crate) fn new(status: StatusCode, body: String) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Canonical reason phrase, e.g. `"OK"`.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn into_text(self) -> String {
        self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            QueryMeError::Decode(format!("invalid response JSON: {err}; body: {}", self.body))
        })
    }
}
