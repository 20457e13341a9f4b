//! Tower Layer implementations

pub mod codec;

pub use codec::CodecLayer;
