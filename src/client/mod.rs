//! Typed request facade

pub mod config;
pub mod request;

pub use config::RequestConfig;
pub use request::{EncodedBody, Request};
