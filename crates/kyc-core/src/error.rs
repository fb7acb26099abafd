//! Unified error types for the KYC flow

use thiserror::Error;

/// Unified error type for all KYC operations
#[derive(Error, Debug)]
pub enum KycError {
    // Media errors
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Speech error: {0}")]
    Speech(String),

    // Backend errors
    #[error("Network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// Non-success response from the verification backend.
    ///
    /// `body` carries the parsed response body when the backend sent JSON.
    #[error("Verification failed at {endpoint} ({status}): {message}")]
    Verification {
        endpoint: String,
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    // Flow errors
    #[error("Flow error: {0}")]
    Flow(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl KycError {
    /// Whether this error came from a backend call (network or HTTP status)
    pub fn is_verification_failure(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Verification { .. })
    }

    /// Parsed response body of a failed verification call, if any
    pub fn response_body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Verification { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

/// Result type alias using KycError
pub type Result<T> = std::result::Result<T, KycError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_error_carries_body() {
        let err = KycError::Verification {
            endpoint: "/kyc/process-face".to_string(),
            status: 400,
            message: "Aadhaar face not found".to_string(),
            body: Some(serde_json::json!({ "status": "face_failed" })),
        };

        assert!(err.is_verification_failure());
        assert_eq!(err.response_body().unwrap()["status"], "face_failed");
        assert!(err.to_string().contains("400"));
    }

    #[test]
    fn test_permission_denied_is_not_verification_failure() {
        let err = KycError::PermissionDenied("camera".to_string());
        assert!(!err.is_verification_failure());
        assert!(err.response_body().is_none());
    }
}
