//! Decode outcome types

/// Outcome of running a response through a [`CodecRegistry`](crate::codec::CodecRegistry)
///
/// Only `Decoded` carries a value. The other outcomes are not errors: the
/// typed facade turns each of them into `T::default()`.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome<T> {
    /// A registered decoder matched and produced a value
    Decoded(T),

    /// No registered decoder matched the response's content type
    Unmatched {
        /// The declared content type, if the response had one
        content_type: Option<String>,
    },

    /// The response carried no body (`204`, `205` or zero length)
    Empty {
        /// The response status code
        status: u16,
    },

    /// The response status was not eligible for decoding under the status policy
    Skipped {
        /// The response status code
        status: u16,
    },
}

impl<T> DecodeOutcome<T> {
    /// Extract the decoded value, if present
    pub fn into_value(self) -> Option<T> {
        match self {
            DecodeOutcome::Decoded(value) => Some(value),
            _ => None,
        }
    }

    /// Check if a decoder produced a value
    pub fn is_decoded(&self) -> bool {
        matches!(self, DecodeOutcome::Decoded(_))
    }

    /// Extract the decoded value or fall back to `T::default()`
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.into_value().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_decoded() {
        let outcome = DecodeOutcome::Decoded(42);

        assert!(outcome.is_decoded());
        assert_eq!(outcome.into_value(), Some(42));
    }

    #[test]
    fn test_outcome_defaults() {
        let unmatched: DecodeOutcome<Vec<u8>> = DecodeOutcome::Unmatched {
            content_type: Some("text/plain".to_string()),
        };
        assert!(!unmatched.is_decoded());
        assert!(unmatched.unwrap_or_default().is_empty());

        let skipped: DecodeOutcome<i32> = DecodeOutcome::Skipped { status: 404 };
        assert_eq!(skipped.unwrap_or_default(), 0);

        let empty: DecodeOutcome<String> = DecodeOutcome::Empty { status: 204 };
        assert!(!empty.is_decoded());
        assert_eq!(empty.unwrap_or_default(), "");
    }
}
