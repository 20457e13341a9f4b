//! JSON codec

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    codec::{Decoder, Encode, MediaType, APPLICATION_JSON},
    error::BoxError,
};

/// JSON codec for `application/json` bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Build a decoder that deserializes `application/json` bodies into `T`
    pub fn decoder<T>() -> Decoder<T>
    where
        T: DeserializeOwned + 'static,
    {
        Decoder::new(MediaType::application_json(), |body: &[u8]| {
            Ok(serde_json::from_slice(body)?)
        })
    }
}

impl<P> Encode<P> for JsonCodec
where
    P: Serialize + ?Sized,
{
    fn encode(&self, payload: &P) -> Result<Bytes, BoxError> {
        let bytes = serde_json::to_vec(payload)?;
        Ok(Bytes::from(bytes))
    }

    fn media_type(&self) -> &str {
        APPLICATION_JSON
    }
}
