use std::{
    sync::Arc,
    task::{Context, Poll},
};

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};

use crate::{
    error::JsoncError,
    transport::{Transport, TransportRequest, TransportResponse},
};

type Handler =
    Arc<dyn Fn(TransportRequest) -> BoxFuture<'static, Result<TransportResponse, JsoncError>> + Send + Sync>;

/// Mock transport for internal testing
///
/// This transport is used for unit tests to mock server responses without
/// requiring a real network connection.
#[derive(Clone)]
pub(crate) struct MockTransport {
    handler: Handler,
}

impl MockTransport {
    /// Create a new mock transport with a synchronous request handler
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(TransportRequest) -> TransportResponse + Send + Sync + 'static,
    {
        Self::from_async(move |request| future::ready(Ok(handler(request))).boxed())
    }

    /// Create a mock transport whose handler returns a future
    pub fn from_async<F>(handler: F) -> Self
    where
        F: Fn(TransportRequest) -> BoxFuture<'static, Result<TransportResponse, JsoncError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Create a mock transport that always returns 200 OK with a body
    pub fn respond(content_type: &'static str, body: &'static str) -> Self {
        Self::new(move |_| {
            TransportResponse::new(200)
                .header("Content-Type", content_type)
                .body(body)
        })
    }

    /// Create a mock transport whose requests fail with `err`
    pub fn failing(err: fn() -> JsoncError) -> Self {
        Self::from_async(move |_| future::ready(Err(err())).boxed())
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), JsoncError>> {
        Poll::Ready(Ok(()))
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, JsoncError> {
        (self.handler)(request).await
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport").finish()
    }
}
