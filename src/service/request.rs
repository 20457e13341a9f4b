//! Codec service request types

use std::{collections::HashMap, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::transport::{insert_header, TransportRequest};

/// A request to the codec service
///
/// This wraps an encoded transport request with the context it runs under
#[derive(Debug, Clone)]
pub struct CodecRequest {
    /// The request handed to the transport
    pub transport: TransportRequest,

    /// Request context (cancellation, timeout, extra headers)
    pub context: RequestContext,
}

impl CodecRequest {
    /// Create a new codec request
    pub fn new(transport: TransportRequest, context: RequestContext) -> Self {
        Self { transport, context }
    }
}

/// Cancellation scope and per-call settings for one request
///
/// Cancelling the token aborts the in-flight exchange with
/// [`JsoncError::Cancelled`](crate::error::JsoncError::Cancelled).
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Token that aborts the request when cancelled
    pub cancel: CancellationToken,

    /// Timeout overriding the configured default
    pub timeout: Option<Duration>,

    /// Additional headers, applied after configured defaults
    pub headers: HashMap<String, String>,
}

impl RequestContext {
    /// Create a context with a fresh cancellation token
    pub fn new() -> Self {
        Self::default()
    }

    /// Run under an existing cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a request header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, key.into(), value.into());
        self
    }

    /// Get the cancellation token
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel every request running under this context
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check whether this context has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_creation() {
        let context = RequestContext::new()
            .with_timeout(Duration::from_secs(60))
            .with_header("X-Trace", "abc");

        assert_eq!(context.timeout, Some(Duration::from_secs(60)));
        assert_eq!(context.headers.get("X-Trace"), Some(&"abc".to_string()));
        assert!(!context.is_cancelled());
    }

    #[test]
    fn test_context_header_replaces_any_case() {
        let context = RequestContext::new()
            .with_header("Content-Type", "text/xml")
            .with_header("content-type", "text/csv");

        assert_eq!(context.headers.len(), 1);
        assert_eq!(context.headers.get("content-type"), Some(&"text/csv".to_string()));
    }

    #[test]
    fn test_shared_cancellation() {
        let parent = CancellationToken::new();
        let context = RequestContext::new().with_cancellation(parent.child_token());
        let clone = context.clone();

        parent.cancel();

        assert!(context.is_cancelled());
        assert!(clone.is_cancelled());
    }
}
