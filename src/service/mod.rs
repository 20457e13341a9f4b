//! Tower Service implementations

pub mod core;
pub mod request;
pub mod response;

pub use self::core::CodecService;
pub use request::{CodecRequest, RequestContext};
pub use response::DecodeOutcome;
