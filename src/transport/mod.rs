use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

pub mod http;

pub use http::HttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection to the payments API failed: {message}")]
    Connection { message: String },

    #[error("payments API request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("invalid endpoint URL: {url}")]
    InvalidUrl { url: String },

    #[error("failed to encode request body: {message}")]
    Encoding { message: String },

    #[error("failed to decode response body: {message}")]
    Decoding { message: String },

    #[error("payments API returned HTTP {status}: {message}")]
    Api {
        status: u16,
        code: Option<u32>,
        message: String,
    },
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Connection { .. } => true,
            TransportError::Timeout { .. } => true,
            TransportError::InvalidUrl { .. } => false,
            TransportError::Encoding { .. } => false,
            TransportError::Decoding { .. } => false,
            TransportError::Api { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Abstract HTTP boundary of the SDK. All payloads are JSON; endpoints are
/// path-versioned REST resources under the configured base URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        url: &str,
        method: Method,
        payload: Option<&JsonValue>,
    ) -> Result<JsonValue, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_flags_are_set() {
        assert!(TransportError::Connection {
            message: "refused".to_string()
        }
        .is_retryable());
        assert!(TransportError::Api {
            status: 503,
            code: None,
            message: "unavailable".to_string()
        }
        .is_retryable());
        assert!(!TransportError::Api {
            status: 400,
            code: Some(5010),
            message: "bad request".to_string()
        }
        .is_retryable());
        assert!(!TransportError::Decoding {
            message: "truncated".to_string()
        }
        .is_retryable());
    }
}
