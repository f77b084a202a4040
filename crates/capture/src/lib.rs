//! Inbound request events and the lookups that pull a bearer credential out
//! of them.

mod bearer;
mod path;

use serde::{Deserialize, Serialize};

pub use bearer::{extract_bearer, find_auth_header};
pub use path::abbreviated_path;

/// An outbound HTTP request as seen by the interception layer, before it is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEvent {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
}

/// One header in the order the host reported it. Names keep their original casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl RequestEvent {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderEntry::new(name, value));
        self
    }

    /// The bearer credential carried by this request, if any.
    pub fn credential(&self) -> Option<&str> {
        find_auth_header(&self.headers).and_then(extract_bearer)
    }

    pub fn path_summary(&self) -> String {
        abbreviated_path(&self.url)
    }

    fn from_http(method: &http::Method, uri: &http::Uri, headers: &http::HeaderMap) -> Self {
        let headers = headers
            .iter()
            .map(|(name, value)| HeaderEntry {
                name: name.as_str().to_owned(),
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            })
            .collect();

        Self {
            url: uri.to_string(),
            method: method.as_str().to_owned(),
            headers,
        }
    }
}

impl<B> From<&http::Request<B>> for RequestEvent {
    fn from(request: &http::Request<B>) -> Self {
        Self::from_http(request.method(), request.uri(), request.headers())
    }
}

impl From<&http::request::Parts> for RequestEvent {
    fn from(parts: &http::request::Parts) -> Self {
        Self::from_http(&parts.method, &parts.uri, &parts.headers)
    }
}
