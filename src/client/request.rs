//! Typed request facade

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use tower::ServiceExt;
use tower_layer::Layer;
use url::Url;

use crate::{
    client::RequestConfig,
    codec::{CodecRegistry, Decoder, Encode, FnEncoder, JsonCodec, MediaType, StatusPolicy},
    error::{BoxError, JsoncError, JsoncResult},
    layer::CodecLayer,
    service::{CodecRequest, DecodeOutcome, RequestContext},
    transport::{HttpTransport, Method, Transport, TransportRequest},
};

/// An encoded request body and its media type
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBody {
    /// Media type sent as the request's `Content-Type`
    pub media_type: String,

    /// Serialized body
    pub bytes: Bytes,
}

impl EncodedBody {
    /// Create an encoded body
    pub fn new(media_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// A single typed HTTP request producing a `T`
///
/// `Request::<T>::new()` registers the JSON decoder for `application/json`
/// and the JSON encoder for outbound bodies. Verbs consume the request, so
/// each instance drives exactly one exchange.
///
/// Responses whose content type matches no decoder, or whose status is
/// rejected by the [`StatusPolicy`], produce `T::default()` with no error.
///
/// # Example
///
/// ```rust,no_run
/// use serde::{Deserialize, Serialize};
/// use tower_jsonc::prelude::*;
///
/// #[derive(Serialize)]
/// struct Params {
///     name: String,
///     age: u32,
/// }
///
/// #[derive(Debug, Default, Deserialize)]
/// struct Echo {
///     json: Option<serde_json::Value>,
/// }
///
/// # async fn example() -> Result<(), JsoncError> {
/// let params = Params { name: "Jane".into(), age: 25 };
/// let echo = Request::<Echo>::new()
///     .post_json(&RequestContext::new(), "https://httpbin.org/post", &params)
///     .await?;
/// println!("{:?}", echo.json);
/// # Ok(())
/// # }
/// ```
pub struct Request<T, E = JsonCodec, Tr = HttpTransport> {
    transport: Tr,
    registry: CodecRegistry<T>,
    encoder: E,
    config: RequestConfig,
}

impl<T> Request<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Create a JSON request over the default HTTP transport
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new())
    }
}

impl<T> Default for Request<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Tr> Request<T, JsonCodec, Tr>
where
    T: DeserializeOwned + Send + 'static,
    Tr: Transport,
{
    /// Create a JSON request over a custom transport
    pub fn with_transport(transport: Tr) -> Self {
        let mut registry = CodecRegistry::new();
        registry.register(JsonCodec::decoder());

        Self {
            transport,
            registry,
            encoder: JsonCodec,
            config: RequestConfig::default(),
        }
    }
}

impl<T, E, Tr> Request<T, E, Tr>
where
    T: Send + 'static,
    Tr: Transport,
{
    /// Create a request with no decoders registered
    pub fn bare(transport: Tr, encoder: E) -> Self {
        Self {
            transport,
            registry: CodecRegistry::new(),
            encoder,
            config: RequestConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.registry.set_status_policy(config.status_policy);
        self.config = config;
        self
    }

    /// Set which response statuses are decoded
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.registry.set_status_policy(policy);
        self.config.status_policy = policy;
        self
    }

    /// Register a decoder for `media_type`
    ///
    /// Registering a media type again replaces the earlier decoder.
    pub fn register_decoder<F>(mut self, media_type: &str, decode: F) -> JsoncResult<Self>
    where
        F: Fn(&[u8]) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.registry.register_decoder(media_type, decode)?;
        Ok(self)
    }

    /// Register a prebuilt decoder
    pub fn with_decoder(mut self, decoder: Decoder<T>) -> Self {
        self.registry.register(decoder);
        self
    }

    /// Replace the encoder with a closure producing `media_type` bodies
    pub fn register_encoder<P, F>(
        self,
        media_type: &str,
        encode: F,
    ) -> JsoncResult<Request<T, FnEncoder<F>, Tr>>
    where
        P: ?Sized,
        F: Fn(&P) -> Result<Bytes, BoxError> + Send + Sync,
    {
        let media_type = MediaType::new(media_type)?;
        Ok(self.with_encoder(FnEncoder::new(media_type, encode)))
    }

    /// Replace the encoder
    pub fn with_encoder<E2>(self, encoder: E2) -> Request<T, E2, Tr> {
        Request {
            transport: self.transport,
            registry: self.registry,
            encoder,
            config: self.config,
        }
    }

    /// Get the decoder registry
    pub fn registry(&self) -> &CodecRegistry<T> {
        &self.registry
    }

    /// Get the configuration
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Issue a GET request
    pub async fn get(self, ctx: &RequestContext, url: &str) -> JsoncResult<T>
    where
        T: Default,
    {
        let outcome = self.fetch(ctx, Method::GET, url, None).await?;
        Ok(outcome.unwrap_or_default())
    }

    /// Issue a POST request with a body produced by the registered encoder
    pub async fn post<P>(self, ctx: &RequestContext, url: &str, payload: &P) -> JsoncResult<T>
    where
        P: ?Sized,
        E: Encode<P>,
        T: Default,
    {
        let body = encode_body(&self.encoder, payload)?;
        let outcome = self.fetch(ctx, Method::POST, url, Some(body)).await?;
        Ok(outcome.unwrap_or_default())
    }

    /// Issue a POST request with a JSON body, whatever encoder is registered
    pub async fn post_json<P>(self, ctx: &RequestContext, url: &str, payload: &P) -> JsoncResult<T>
    where
        P: Serialize + ?Sized,
        T: Default,
    {
        let body = encode_body(&JsonCodec, payload)?;
        let outcome = self.fetch(ctx, Method::POST, url, Some(body)).await?;
        Ok(outcome.unwrap_or_default())
    }

    /// Issue a request whose body is produced by `encode`
    ///
    /// `encode` runs before any network I/O; its failure aborts the request
    /// with [`JsoncError::Encode`].
    pub async fn send_with<F>(
        self,
        ctx: &RequestContext,
        method: Method,
        url: &str,
        media_type: &str,
        encode: F,
    ) -> JsoncResult<T>
    where
        F: FnOnce() -> Result<Bytes, BoxError>,
        T: Default,
    {
        let media_type = MediaType::new(media_type)?;
        let bytes = encode().map_err(|e| JsoncError::encode(media_type.as_str(), e))?;
        let body = EncodedBody::new(media_type.as_str(), bytes);

        let outcome = self.fetch(ctx, method, url, Some(body)).await?;
        Ok(outcome.unwrap_or_default())
    }

    /// Issue a request and return the raw decode outcome
    ///
    /// Unlike the verb helpers this keeps `Unmatched`, `Empty` and `Skipped`
    /// distinct from a decoded value.
    pub async fn fetch(
        self,
        ctx: &RequestContext,
        method: Method,
        url: &str,
        body: Option<EncodedBody>,
    ) -> JsoncResult<DecodeOutcome<T>> {
        let url = Url::parse(url)?;
        let transport_req = self.build_transport_request(method, url, body);

        let layer = CodecLayer::new(self.registry).with_timeout(self.config.timeout);
        let service = layer.layer(self.transport);

        service
            .oneshot(CodecRequest::new(transport_req, ctx.clone()))
            .await
    }

    fn build_transport_request(
        &self,
        method: Method,
        url: Url,
        body: Option<EncodedBody>,
    ) -> TransportRequest {
        let mut transport_req = TransportRequest::new(method, url);

        if self.config.send_accept && !self.registry.is_empty() {
            let accept = self
                .registry
                .media_types()
                .map(MediaType::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            transport_req = transport_req.header("Accept", accept);
        }

        for (key, value) in &self.config.headers {
            transport_req = transport_req.header(key.clone(), value.clone());
        }

        if let Some(body) = body {
            transport_req = transport_req
                .header("Content-Type", body.media_type)
                .body(body.bytes);
        }

        transport_req
    }
}

fn encode_body<P, E>(encoder: &E, payload: &P) -> JsoncResult<EncodedBody>
where
    P: ?Sized,
    E: Encode<P>,
{
    let media_type = encoder.media_type();
    let bytes = encoder.encode(payload).map_err(|e| {
        tracing::debug!(media_type, error = %e, "failed to encode request body");
        JsoncError::encode(media_type, e)
    })?;

    Ok(EncodedBody::new(media_type, bytes))
}
