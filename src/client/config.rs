//! Request configuration

use std::{collections::HashMap, time::Duration};

use crate::{codec::StatusPolicy, transport::insert_header};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a typed request
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Default request timeout; `None` waits until the transport gives up
    pub timeout: Option<Duration>,

    /// Which response statuses are decoded
    pub status_policy: StatusPolicy,

    /// Headers sent with every request
    pub headers: HashMap<String, String>,

    /// Advertise the registered media types in an `Accept` header
    pub send_accept: bool,
}

impl RequestConfig {
    /// Create a new request configuration
    pub fn new() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            status_policy: StatusPolicy::default(),
            headers: HashMap::new(),
            send_accept: true,
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the default timeout
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set the status policy
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, key.into(), value.into());
        self
    }

    /// Enable or disable the derived `Accept` header
    pub fn with_accept(mut self, enabled: bool) -> Self {
        self.send_accept = enabled;
        self
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RequestConfig::default();

        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert_eq!(config.status_policy, StatusPolicy::Success);
        assert!(config.headers.is_empty());
        assert!(config.send_accept);
    }

    #[test]
    fn test_config_builder() {
        let config = RequestConfig::new()
            .without_timeout()
            .with_status_policy(StatusPolicy::OkOnly)
            .with_header("User-Agent", "jsonc-test")
            .with_accept(false);

        assert_eq!(config.timeout, None);
        assert_eq!(config.status_policy, StatusPolicy::OkOnly);
        assert_eq!(config.headers.get("User-Agent"), Some(&"jsonc-test".to_string()));
        assert!(!config.send_accept);
    }

    #[test]
    fn test_config_header_replaces_any_case() {
        let config = RequestConfig::new()
            .with_header("User-Agent", "first")
            .with_header("user-agent", "second");

        assert_eq!(config.headers.len(), 1);
        assert_eq!(config.headers.get("user-agent"), Some(&"second".to_string()));
    }
}
