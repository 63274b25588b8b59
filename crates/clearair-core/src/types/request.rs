//! Request descriptors and the wire-level request handed to a transport.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;

use super::Method;
use crate::Result;

/// HTTP headers keyed by lowercase name.
pub type Headers = BTreeMap<String, String>;

/// A request as issued by a domain service.
///
/// Descriptors carry no credential. The dispatcher attaches the session's
/// access token and drops any `Authorization` header set here.
///
/// # Example
///
/// ```
/// use clearair_core::{Method, RequestDescriptor};
///
/// let request = RequestDescriptor::get("/communities")
///     .query("page", "2")
///     .header("Accept-Language", "en");
/// assert_eq!(request.method(), Method::Get);
/// assert_eq!(request.headers().get("accept-language").map(String::as_str), Some("en"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Headers,
    body: Option<Bytes>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a header. Names are stored lowercase.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Set a raw body with its content type.
    pub fn body(mut self, body: impl Into<Bytes>, content_type: &str) -> Self {
        self.body = Some(body.into());
        self.header("content-type", content_type)
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self.body(body, "application/json"))
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

/// A fully resolved request ready for a [`Transport`](crate::traits::Transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Headers,
    pub body: Option<Bytes>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Set a JSON body from a serializable value.
    pub fn with_json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(value)?));
        self.headers
            .insert("content-type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers.get("authorization").map(String::as_str)
    }
}
