//! # Tower JSONC
//!
//! Typed content negotiation on top of a pluggable HTTP transport.
//!
//! A [`Request<T>`](client::Request) is parameterized by the shape of the
//! response it expects. At construction it registers a JSON decoder for
//! `application/json` and a JSON encoder for outbound bodies. After the
//! transport returns, the response's `Content-Type` selects the first
//! registered decoder whose media type it contains:
//!
//! - a matching decoder produces `T`, or a decode error if the body is malformed;
//! - no matching decoder yields `T::default()` and no error;
//! - encode failures abort before any network I/O.
//!
//! ## Features
//!
//! - **Transport Agnostic**: Works with reqwest or any custom [`Transport`](transport::Transport)
//! - **Tower Native**: [`CodecService`](service::CodecService) and [`CodecLayer`](layer::CodecLayer)
//! - **Cancellable**: every exchange runs under a cancellation token and timeout
//!
//! ## Example
//!
//! ```rust,no_run
//! use serde::{Deserialize, Serialize};
//! use tower_jsonc::prelude::*;
//!
//! #[derive(Serialize)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Created {
//!     id: u64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), JsoncError> {
//!     let person = Person { name: "Jane".into(), age: 25 };
//!     let created = Request::<Created>::new()
//!         .post_json(&RequestContext::new(), "https://api.example.com/people", &person)
//!         .await?;
//!
//!     println!("created {}", created.id);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod layer;
pub mod service;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        client::{Request, RequestConfig},
        codec::{CodecRegistry, Decoder, Encode, JsonCodec, MediaType, StatusPolicy},
        error::{JsoncError, JsoncResult},
        service::{DecodeOutcome, RequestContext},
        transport::{HttpTransport, Method, Transport},
    };
}
