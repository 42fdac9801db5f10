//! B2 error bodies.
//!
//! Every non-2xx response carries a JSON body of the shape
//! `{"status": 400, "code": "bad_request", "message": "..."}`.

use serde::{Deserialize, Serialize};

/// Well-known `code` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode;

impl ErrorCode {
    /// The request was malformed.
    pub const BAD_REQUEST: &str = "bad_request";
    /// The key ID or key is wrong.
    pub const UNAUTHORIZED: &str = "unauthorized";
    /// The token is valid but has expired.
    pub const EXPIRED_AUTH_TOKEN: &str = "expired_auth_token";
    /// The token is not allowed to perform this call.
    pub const BAD_AUTH_TOKEN: &str = "bad_auth_token";
    /// The service is temporarily unable to handle the request.
    pub const SERVICE_UNAVAILABLE: &str = "service_unavailable";
    /// The file or bucket does not exist.
    pub const NOT_FOUND: &str = "not_found";
}

/// Error body returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status repeated in the body.
    #[serde(default)]
    pub status: u16,

    /// Machine readable code.
    #[serde(default)]
    pub code: String,

    /// Human readable message.
    #[serde(default)]
    pub message: String,
}

impl ErrorResponse {
    /// Build an error body.
    #[must_use]
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Decode an error body, keeping the raw text as the message when it is not JSON.
    #[must_use]
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<Self>(body) {
            Ok(mut parsed) => {
                if parsed.status == 0 {
                    parsed.status = status;
                }
                parsed
            }
            Err(_) => Self::new(status, "", String::from_utf8_lossy(body).trim().to_owned()),
        }
    }
}
