//! Content-type codecs and the decoder registry
//!
//! Decoders are keyed by media type and selected by substring match against a
//! response's declared `Content-Type`, so `application/json; charset=utf-8`
//! still reaches the `application/json` decoder. Encoders tag outbound bodies
//! with their media type.

pub mod json;

pub use json::JsonCodec;

use std::{fmt, sync::Arc};

use bytes::Bytes;

use crate::{
    error::{BoxError, JsoncError, JsoncResult},
    service::response::DecodeOutcome,
};

/// Media type handled by [`JsonCodec`]
pub const APPLICATION_JSON: &str = "application/json";

/// A non-empty media type identifier such as `application/json`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType(String);

impl MediaType {
    /// Create a media type, rejecting empty or blank values
    pub fn new(value: impl Into<String>) -> JsoncResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(JsoncError::InvalidMediaType(value));
        }
        Ok(Self(value))
    }

    /// The `application/json` media type
    pub fn application_json() -> Self {
        Self(APPLICATION_JSON.to_string())
    }

    /// Get the media type as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether a declared `Content-Type` header value contains this media type
    ///
    /// Comparison is ASCII case-insensitive and tolerates parameters such as
    /// `; charset=utf-8`.
    pub fn matches(&self, content_type: &str) -> bool {
        content_type
            .to_ascii_lowercase()
            .contains(&self.0.to_ascii_lowercase())
    }

    fn same_as(&self, other: &MediaType) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MediaType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encoder trait turning an outbound payload into wire bytes
///
/// Implementations report the media type that ends up in the request's
/// `Content-Type` header.
pub trait Encode<P: ?Sized>: Send + Sync {
    /// Serialize the payload into a request body
    fn encode(&self, payload: &P) -> Result<Bytes, BoxError>;

    /// Get the media type of the produced body
    fn media_type(&self) -> &str;
}

/// Encoder backed by a closure
#[derive(Clone)]
pub struct FnEncoder<F> {
    media_type: MediaType,
    encode: F,
}

impl<F> FnEncoder<F> {
    /// Create an encoder producing bodies of `media_type`
    pub fn new(media_type: MediaType, encode: F) -> Self {
        Self { media_type, encode }
    }
}

impl<P, F> Encode<P> for FnEncoder<F>
where
    P: ?Sized,
    F: Fn(&P) -> Result<Bytes, BoxError> + Send + Sync,
{
    fn encode(&self, payload: &P) -> Result<Bytes, BoxError> {
        (self.encode)(payload)
    }

    fn media_type(&self) -> &str {
        self.media_type.as_str()
    }
}

impl<F> fmt::Debug for FnEncoder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEncoder")
            .field("media_type", &self.media_type)
            .finish_non_exhaustive()
    }
}

/// Shared decode function producing a `T` from raw body bytes
pub type DecodeFn<T> = Arc<dyn Fn(&[u8]) -> Result<T, BoxError> + Send + Sync>;

/// A decode function associated with the media type it applies to
pub struct Decoder<T> {
    media_type: MediaType,
    decode: DecodeFn<T>,
}

impl<T> Decoder<T> {
    /// Create a decoder for `media_type`
    pub fn new<F>(media_type: MediaType, decode: F) -> Self
    where
        F: Fn(&[u8]) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            media_type,
            decode: Arc::new(decode),
        }
    }

    /// Get the media type this decoder applies to
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// Check whether this decoder applies to a declared content type
    pub fn matches(&self, content_type: &str) -> bool {
        self.media_type.matches(content_type)
    }

    /// Decode a response body, tagging failures with this decoder's media type
    pub fn decode(&self, body: &[u8]) -> JsoncResult<T> {
        (self.decode)(body).map_err(|source| JsoncError::decode(self.media_type.as_str(), source))
    }
}

impl<T> Clone for Decoder<T> {
    fn clone(&self) -> Self {
        Self {
            media_type: self.media_type.clone(),
            decode: self.decode.clone(),
        }
    }
}

impl<T> fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("media_type", &self.media_type)
            .finish_non_exhaustive()
    }
}

/// Which response statuses are eligible for decoding
///
/// Responses rejected by the policy are reported as
/// [`DecodeOutcome::Skipped`] rather than as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Decode any 2xx response
    #[default]
    Success,

    /// Decode only `200 OK`
    OkOnly,

    /// Decode regardless of status, as long as the content type matches
    Any,
}

impl StatusPolicy {
    /// Check whether a response with `status` should be decoded
    pub fn allows(&self, status: u16) -> bool {
        match self {
            StatusPolicy::Success => (200..300).contains(&status),
            StatusPolicy::OkOnly => status == 200,
            StatusPolicy::Any => true,
        }
    }
}

/// Ordered set of decoders for one result type
///
/// Selection is first-match-wins over registration order.
pub struct CodecRegistry<T> {
    decoders: Vec<Decoder<T>>,
    status_policy: StatusPolicy,
}

impl<T> CodecRegistry<T> {
    /// Create an empty registry with the default status policy
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
            status_policy: StatusPolicy::default(),
        }
    }

    /// Set the status policy
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Replace the status policy in place
    pub fn set_status_policy(&mut self, policy: StatusPolicy) {
        self.status_policy = policy;
    }

    /// Get the status policy
    pub fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }

    /// Register a decoder
    ///
    /// A decoder for a media type that is already registered replaces the
    /// existing entry and keeps its position; otherwise it is appended.
    pub fn register(&mut self, decoder: Decoder<T>) {
        match self
            .decoders
            .iter_mut()
            .find(|existing| existing.media_type.same_as(&decoder.media_type))
        {
            Some(existing) => *existing = decoder,
            None => self.decoders.push(decoder),
        }
    }

    /// Register a decode function for `media_type`
    pub fn register_decoder<F>(&mut self, media_type: &str, decode: F) -> JsoncResult<()>
    where
        F: Fn(&[u8]) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let media_type = MediaType::new(media_type)?;
        self.register(Decoder::new(media_type, decode));
        Ok(())
    }

    /// Find the first decoder whose media type is contained in `content_type`
    pub fn select(&self, content_type: &str) -> Option<&Decoder<T>> {
        self.decoders
            .iter()
            .find(|decoder| decoder.matches(content_type))
    }

    /// Iterate over registered media types in selection order
    pub fn media_types(&self) -> impl Iterator<Item = &MediaType> {
        self.decoders.iter().map(Decoder::media_type)
    }

    /// Number of registered decoders
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Check if no decoder is registered
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decode a response according to the status policy and content type
    ///
    /// Returns `Skipped` when the status is not eligible, `Empty` for
    /// `204`/`205` or a zero-length body, `Unmatched` when no decoder applies,
    /// and an error only when the selected decoder fails.
    pub fn decode(
        &self,
        status: u16,
        content_type: Option<&str>,
        body: &[u8],
    ) -> JsoncResult<DecodeOutcome<T>> {
        if !self.status_policy.allows(status) {
            tracing::trace!(status, "status not eligible for decoding");
            return Ok(DecodeOutcome::Skipped { status });
        }

        if matches!(status, 204 | 205) || body.is_empty() {
            tracing::trace!(status, "response has no body to decode");
            return Ok(DecodeOutcome::Empty { status });
        }

        let Some(content_type) = content_type else {
            tracing::trace!("response has no content type");
            return Ok(DecodeOutcome::Unmatched { content_type: None });
        };

        let Some(decoder) = self.select(content_type) else {
            tracing::trace!(content_type, "no decoder matches content type");
            return Ok(DecodeOutcome::Unmatched {
                content_type: Some(content_type.to_string()),
            });
        };

        tracing::debug!(
            media_type = %decoder.media_type(),
            content_type,
            len = body.len(),
            "decoding response body"
        );

        match decoder.decode(body) {
            Ok(value) => Ok(DecodeOutcome::Decoded(value)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode response body");
                Err(e)
            }
        }
    }
}

impl<T> Default for CodecRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CodecRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            decoders: self.decoders.clone(),
            status_policy: self.status_policy,
        }
    }
}

impl<T> fmt::Debug for CodecRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("decoders", &self.decoders)
            .field("status_policy", &self.status_policy)
            .finish()
    }
}
