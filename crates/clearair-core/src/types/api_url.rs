//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated API base URL.
///
/// Must use HTTPS (HTTP is allowed only for localhost). A base path such as
/// `/api/v1` is kept; a trailing slash is dropped.
///
/// Request paths are always resolved against this base, never used as
/// absolute URLs, so the bearer token only travels to the configured origin.
///
/// # Example
///
/// ```
/// use clearair_core::ApiUrl;
///
/// let api = ApiUrl::new("https://api.clearair.app/v1/").unwrap();
/// assert_eq!(api.endpoint("/auth/refresh").unwrap(),
///            "https://api.clearair.app/v1/auth/refresh");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        let mut normalized = url;
        let trimmed = normalized.path().trim_end_matches('/').to_string();
        normalized.set_path(&trimmed);
        normalized.set_query(None);
        normalized.set_fragment(None);

        Ok(Self(normalized))
    }

    /// Resolve a request path against the base URL.
    ///
    /// Absolute and scheme-relative URLs are rejected.
    pub fn endpoint(&self, path: &str) -> Result<String, Error> {
        let target = path.split(['?', '#']).next().unwrap_or(path);
        if target.contains("://") || target.starts_with("//") {
            return Err(InvalidInputError::Path {
                value: path.to_string(),
                reason: "must be relative to the API base URL".to_string(),
            }
            .into());
        }

        let base = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(format!("{}/{}", base, path))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}
