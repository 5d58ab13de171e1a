use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Symbolic error codes. The server may supply its own code in an error
/// body, which is passed through verbatim; these cover everything else.
pub mod codes {
    /// Server responded non-2xx without a parseable error body.
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    /// Request could not be completed for a non-transport reason.
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";
    /// No HTTP response reached the client (DNS, refused, timeout).
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    /// Upload transport failure (no response).
    pub const UPLOAD_ERROR: &str = "UPLOAD_ERROR";
    /// Upload rejected by the server (non-2xx).
    pub const UPLOAD_FAILED: &str = "UPLOAD_FAILED";
    /// Operation has no substitute-mode implementation.
    pub const MOCK_UNSUPPORTED: &str = "MOCK_UNSUPPORTED";
}

/// The canonical failure value of the data-access layer.
///
/// Every failure surfaced to a caller takes this shape - raw transport
/// errors never escape the client. `status_code` is 0 when no HTTP
/// response was received.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub code: String,
    pub status_code: u16,
    pub details: Option<Value>,
}

/// Server error body contract: `{ "error": { message, code, details? } }`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    code: String,
    #[serde(default)]
    details: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            status_code,
            details: None,
        }
    }

    /// Classify a non-2xx response from its status and raw body text.
    /// A malformed or absent error body is tolerated and synthesized into
    /// a generic error carrying the given fallback code.
    pub fn from_response(status: reqwest::StatusCode, body: &str, fallback_code: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Self {
                message: envelope.error.message,
                code: envelope.error.code,
                status_code: status.as_u16(),
                details: envelope.error.details,
            },
            Err(_) => Self::new(
                format!(
                    "HTTP error: {}",
                    status.canonical_reason().unwrap_or("unknown status")
                ),
                fallback_code,
                status.as_u16(),
            ),
        }
    }

    /// Classify a transport-level failure (no response at all).
    pub fn from_transport(err: &reqwest::Error, code: &str) -> Self {
        Self::new(err.to_string(), code, 0)
    }

    /// True when no HTTP response was received.
    pub fn is_network_error(&self) -> bool {
        self.status_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_parses_server_error_body() {
        let body = r#"{"error":{"message":"Not found","code":"NOT_FOUND"}}"#;
        let err = ApiError::from_response(StatusCode::NOT_FOUND, body, codes::HTTP_ERROR);
        assert_eq!(err.status_code, 404);
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.message, "Not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_passes_details_through() {
        let body = r#"{"error":{"message":"Bad input","code":"VALIDATION","details":{"field":"email"}}}"#;
        let err = ApiError::from_response(StatusCode::UNPROCESSABLE_ENTITY, body, codes::HTTP_ERROR);
        assert_eq!(err.code, "VALIDATION");
        assert_eq!(
            err.details,
            Some(serde_json::json!({ "field": "email" }))
        );
    }

    #[test]
    fn test_synthesizes_generic_error_on_malformed_body() {
        let err = ApiError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>oops</html>",
            codes::HTTP_ERROR,
        );
        assert_eq!(err.status_code, 500);
        assert_eq!(err.code, codes::HTTP_ERROR);
        assert!(err.message.contains("Internal Server Error"));
    }

    #[test]
    fn test_upload_failure_uses_upload_code() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "", codes::UPLOAD_FAILED);
        assert_eq!(err.code, codes::UPLOAD_FAILED);
        assert_eq!(err.status_code, 502);
    }

    #[test]
    fn test_network_error_has_zero_status() {
        let err = ApiError::new("connection refused", codes::NETWORK_ERROR, 0);
        assert!(err.is_network_error());
        assert_eq!(format!("{}", err), "connection refused");
    }
}
