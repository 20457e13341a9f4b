//! Core codec service implementation

use std::{
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tower_service::Service;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    codec::CodecRegistry,
    error::{JsoncError, JsoncResult},
    service::{CodecRequest, DecodeOutcome, RequestContext},
    transport::{Transport, TransportRequest, TransportResponse},
};

/// Codec service that wraps a transport
///
/// This service implements the Tower `Service` trait: it runs the encoded
/// request through the transport under the request's cancellation scope and
/// decodes the response with the first decoder matching its content type.
pub struct CodecService<Tr, T> {
    transport: Tr,
    registry: Arc<CodecRegistry<T>>,
    timeout: Option<Duration>,
}

impl<Tr, T> CodecService<Tr, T>
where
    Tr: Transport,
    T: Send + 'static,
{
    /// Create a new codec service
    ///
    /// # Arguments
    ///
    /// * `transport` - The underlying transport implementation
    /// * `registry` - The decoders to select from
    pub fn new(transport: Tr, registry: Arc<CodecRegistry<T>>) -> Self {
        Self {
            transport,
            registry,
            timeout: None,
        }
    }

    /// Set the default timeout for requests whose context sets none
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the decoder registry
    pub fn registry(&self) -> &CodecRegistry<T> {
        &self.registry
    }

    /// Run the transport exchange, aborting on cancellation or timeout
    ///
    /// Losing the race drops the transport future together with any response
    /// it was reading.
    async fn execute_scoped(
        transport: &Tr,
        request: TransportRequest,
        cancel: &CancellationToken,
        timeout: Option<Duration>,
    ) -> JsoncResult<TransportResponse> {
        if cancel.is_cancelled() {
            return Err(JsoncError::Cancelled);
        }

        let exchange = async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, transport.execute(request))
                    .await
                    .map_err(|_| JsoncError::Timeout)?,
                None => transport.execute(request).await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("request cancelled before response");
                Err(JsoncError::Cancelled)
            }
            result = exchange => result,
        }
    }
}

impl<Tr, T> Service<CodecRequest> for CodecService<Tr, T>
where
    Tr: Transport,
    T: Send + 'static,
{
    type Response = DecodeOutcome<T>;
    type Error = JsoncError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.transport.poll_ready(cx)
    }

    fn call(&mut self, req: CodecRequest) -> Self::Future {
        let transport = self.transport.clone();
        let registry = self.registry.clone();
        let default_timeout = self.timeout;

        let span = tracing::debug_span!(
            "jsonc_request",
            request_id = %Uuid::now_v7(),
            method = %req.transport.method,
            url = %req.transport.url,
        );

        Box::pin(
            async move {
                let CodecRequest {
                    transport: mut transport_req,
                    context:
                        RequestContext {
                            cancel,
                            timeout,
                            headers,
                        },
                } = req;

                for (key, value) in headers {
                    transport_req.set_header(key, value);
                }

                tracing::debug!(body_len = transport_req.body.len(), "dispatching request");
                let transport_resp = Self::execute_scoped(
                    &transport,
                    transport_req,
                    &cancel,
                    timeout.or(default_timeout),
                )
                .await?;
                tracing::debug!(status = transport_resp.status, "received response");

                registry.decode(
                    transport_resp.status,
                    transport_resp.content_type(),
                    &transport_resp.body,
                )
            }
            .instrument(span),
        )
    }
}

impl<Tr, T> Clone for CodecService<Tr, T>
where
    Tr: Clone,
{
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            registry: self.registry.clone(),
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use futures::{future, FutureExt};
    use serde_json::Value;
    use tokio_test::{assert_err, assert_ok};
    use url::Url;

    use crate::{
        codec::JsonCodec,
        transport::{mock::MockTransport, Method},
    };

    use super::*;

    fn json_registry() -> Arc<CodecRegistry<Value>> {
        let mut registry = CodecRegistry::new();
        registry.register(JsonCodec::decoder());
        Arc::new(registry)
    }

    fn get(url: &str) -> TransportRequest {
        TransportRequest::new(Method::GET, Url::parse(url).unwrap())
    }

    struct ReleaseGuard(Arc<AtomicBool>);

    impl Drop for ReleaseGuard {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    fn hanging_transport(released: Arc<AtomicBool>) -> MockTransport {
        MockTransport::from_async(move |_| {
            let guard = ReleaseGuard(released.clone());
            async move {
                let _guard = guard;
                future::pending::<()>().await;
                Ok(TransportResponse::new(200))
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn test_service_decodes_json() {
        let transport = MockTransport::respond("application/json", r#"{"id": 7}"#);
        let mut service = CodecService::new(transport, json_registry());

        let outcome = service
            .call(CodecRequest::new(
                get("https://example.com/get"),
                RequestContext::new(),
            ))
            .await;

        let value = assert_ok!(outcome).into_value().unwrap();
        assert_eq!(value["id"], 7);
    }

    #[tokio::test]
    async fn test_service_applies_context_headers() {
        let transport = MockTransport::new(|req| {
            let trace = req.header_value("x-trace").unwrap_or_default().to_string();
            TransportResponse::new(200)
                .header("Content-Type", "application/json")
                .body(serde_json::to_vec(&serde_json::json!({ "trace": trace })).unwrap())
        });
        let mut service = CodecService::new(transport, json_registry());

        let context = RequestContext::new().with_header("X-Trace", "abc");
        let outcome = service
            .call(CodecRequest::new(get("https://example.com/"), context))
            .await
            .unwrap();

        assert_eq!(outcome.into_value().unwrap()["trace"], "abc");
    }

    #[tokio::test]
    async fn test_service_passes_transport_errors_through() {
        let transport = MockTransport::failing(|| JsoncError::Transport("connection reset".into()));
        let mut service = CodecService::new(transport, json_registry());

        let result = service
            .call(CodecRequest::new(get("https://example.com/"), RequestContext::new()))
            .await;

        assert!(matches!(assert_err!(result), JsoncError::Transport(msg) if msg == "connection reset"));
    }

    #[tokio::test]
    async fn test_service_cancellation_releases_exchange() {
        let released = Arc::new(AtomicBool::new(false));
        let mut service = CodecService::new(hanging_transport(released.clone()), json_registry());

        let context = RequestContext::new();
        let cancel = context.cancellation_token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let result = service
            .call(CodecRequest::new(get("https://example.com/"), context))
            .await;

        assert!(matches!(result, Err(JsoncError::Cancelled)));
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_service_already_cancelled_skips_transport() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let transport = MockTransport::new(move |_| {
            flag.store(true, Ordering::SeqCst);
            TransportResponse::new(200)
        });
        let mut service = CodecService::new(transport, json_registry());

        let context = RequestContext::new();
        context.cancel();

        let result = service
            .call(CodecRequest::new(get("https://example.com/"), context))
            .await;

        assert!(matches!(result, Err(JsoncError::Cancelled)));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_service_timeout() {
        let released = Arc::new(AtomicBool::new(false));
        let mut service = CodecService::new(hanging_transport(released.clone()), json_registry())
            .with_timeout(Some(Duration::from_millis(20)));

        let result = service
            .call(CodecRequest::new(get("https://example.com/"), RequestContext::new()))
            .await;

        assert!(matches!(result, Err(JsoncError::Timeout)));
        assert!(released.load(Ordering::SeqCst));
    }
}
