//! Error types for the Brevo client.
//!
//! # Design
//! `Vendor` carries the full `BrevoError` record exactly as the vendor
//! reported it. `Code` is what the normalizer re-raises: its `Display` is the
//! bare vendor code, because callers match on that string. Everything that
//! never reached Brevo (transport, serde) has its own variant and is never
//! normalized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::HttpResponse;

/// A failure reported by the Brevo API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrevoError {
    pub body: Value,
    pub status_code: u16,
    pub request: Value,
    pub code: String,
    pub message: String,
}

impl BrevoError {
    /// Build the record from a non-success response.
    ///
    /// Brevo error bodies look like `{"code": "...", "message": "..."}`. A
    /// body without a code gets `http_<status>` so the code is always set.
    /// `request` is left `Null` for the caller to fill in.
    pub fn from_response(response: &HttpResponse) -> Self {
        let body = serde_json::from_str::<Value>(&response.body)
            .unwrap_or_else(|_| Value::String(response.body.clone()));
        let code = body
            .get("code")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("http_{}", response.status));
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| response.body.clone());

        Self {
            body,
            status_code: response.status,
            request: Value::Null,
            code,
            message,
        }
    }
}

/// Errors returned by `BrevoClient` and `BrevoService`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Brevo rejected the request.
    #[error("{}", .0.message)]
    Vendor(BrevoError),

    /// A vendor failure after normalization. Displays as the vendor code.
    #[error("{0}")]
    Code(String),

    /// The request never produced an HTTP response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// An explicit lookup table had no entry for `key`.
    #[error("unknown {kind} key: {key}")]
    UnknownKey { kind: &'static str, key: String },
}

impl ApiError {
    /// The vendor code, for both raw and normalized vendor failures.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Vendor(error) => Some(&error.code),
            ApiError::Code(code) => Some(code),
            _ => None,
        }
    }
}
