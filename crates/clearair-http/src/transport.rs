//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use clearair_core::error::{Error, InvalidInputError, TransportError};
use clearair_core::{ApiResponse, Headers, Method, OutboundRequest, Result, Transport};

/// Production [`Transport`] using a pooled `reqwest::Client`.
///
/// Clone is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("clearair/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self::with_client(client))
    }

    /// Wrap an existing client, e.g. one with custom TLS settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: OutboundRequest) -> Result<ApiResponse> {
        debug!("Sending request");

        let mut builder = self
            .client
            .request(Self::method(request.method), &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        for (name, value) in &request.headers {
            let value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
                Error::InvalidInput(InvalidInputError::Header {
                    name: name.clone(),
                    reason: e.to_string(),
                })
            })?;
            builder = builder.header(name.as_str(), value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        trace!(status, "Response received");

        let headers = Self::convert_headers(response.headers());
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(ApiResponse::with_headers(status, headers, body))
    }
}

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let err = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else {
        TransportError::Http { message }
    };
    Error::Transport(err)
}
