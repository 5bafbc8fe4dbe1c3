//! # Framework Errors
//!
//! Errors a [`Store`](crate::Store) reports back to the generic adapter. The adapter only
//! needs to tell "the remote object is gone" apart from every other failure, so the
//! variants stay coarse; backend crates map their own error types into these.

/// Errors that can occur while talking to the backend behind a store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Invalid resource key: {0}")]
    InvalidKey(String),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl FrameworkError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FrameworkError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_body_verbatim() {
        let err = FrameworkError::Api {
            status: 422,
            body: r#"{"error":"title is required"}"#.into(),
        };
        assert_eq!(
            err.to_string(),
            r#"API error (status 422): {"error":"title is required"}"#
        );
        assert!(!err.is_not_found());
        assert!(FrameworkError::NotFound("x".into()).is_not_found());
    }
}
