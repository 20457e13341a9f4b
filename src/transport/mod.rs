//! Transport abstraction layer
//!
//! The transport owns everything about getting bytes on and off the wire.
//! Codecs only see the status, headers and body it hands back.

pub mod http;
#[cfg(test)]
pub mod mock;

use std::{
    collections::HashMap,
    task::{Context, Poll},
};

pub use http::HttpTransport;
pub use reqwest::Method;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::JsoncError;

/// Protocol-agnostic transport request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Absolute target URL
    pub url: Url,

    /// HTTP method
    pub method: Method,

    /// Request headers
    pub headers: HashMap<String, String>,

    /// Request body as bytes
    pub body: Bytes,
}

impl TransportRequest {
    /// Create a new transport request
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            url,
            method,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Add a header to the request, replacing any existing header of the same name
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    /// Set a header in place, replacing any existing header of the same name
    ///
    /// Names compare ASCII case-insensitively, so `accept` replaces `Accept`.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        insert_header(&mut self.headers, key.into(), value.into());
    }

    /// Set the request body
    pub fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// Look up a header by name, ignoring ASCII case
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Protocol-agnostic transport response
#[derive(Debug)]
pub struct TransportResponse {
    /// Status code
    pub status: u16,

    /// Response headers
    pub headers: HashMap<String, String>,

    /// Response body as bytes
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a new transport response
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Add a header to the response, replacing any existing header of the same name
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, key.into(), value.into());
        self
    }

    /// Set the response body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a header by name, ignoring ASCII case
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Get the declared `Content-Type`, if any
    pub fn content_type(&self) -> Option<&str> {
        self.header_value("content-type")
    }
}

/// Insert a header, dropping any existing entry whose name differs only in case
pub(crate) fn insert_header(headers: &mut HashMap<String, String>, key: String, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&key));
    headers.insert(key, value);
}

fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Core transport trait for executing requests
///
/// Implementations must release any response resources (connections, body
/// streams) when the future returned by `execute` is dropped.
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Check if the transport is ready to accept requests
    ///
    /// This is used by Tower's Service trait to implement backpressure
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), JsoncError>>;

    /// Execute a request and read the whole response body
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, JsoncError>;
}

#[async_trait]
impl<T: Transport> Transport for Box<T> {
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), JsoncError>> {
        (**self).poll_ready(cx)
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, JsoncError> {
        (**self).execute(request).await
    }
}
