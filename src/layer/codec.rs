//! Codec layer wrapping a transport

use std::{sync::Arc, time::Duration};

use tower_layer::Layer;

use crate::{codec::CodecRegistry, service::CodecService};

/// Layer that turns a transport into a [`CodecService`] producing `T`
pub struct CodecLayer<T> {
    registry: Arc<CodecRegistry<T>>,
    timeout: Option<Duration>,
}

impl<T> CodecLayer<T> {
    /// Create a new codec layer
    pub fn new(registry: CodecRegistry<T>) -> Self {
        Self {
            registry: Arc::new(registry),
            timeout: None,
        }
    }

    /// Set the default request timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<T> Clone for CodecLayer<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            timeout: self.timeout,
        }
    }
}

impl<Tr, T> Layer<Tr> for CodecLayer<T>
where
    Tr: crate::transport::Transport,
    T: Send + 'static,
{
    type Service = CodecService<Tr, T>;

    fn layer(&self, inner: Tr) -> Self::Service {
        CodecService::new(inner, self.registry.clone()).with_timeout(self.timeout)
    }
}
