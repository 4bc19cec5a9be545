//! Vendor error normalization.
//!
//! `normalize_error` is the single place where a `BrevoError` becomes a log
//! entry plus an `ApiError::Code`. It has no success path: callers always
//! wrap its result in `Err`.

use serde_json::{json, Value};

use crate::error::{ApiError, BrevoError};
use crate::logger::Logger;

pub const DEFAULT_BREADCRUMB: &str = "Middleware";

/// Identifies the caller in the error log: a breadcrumb label and free-form
/// context such as `{"applicationId": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub breadcrumb: String,
    pub context: Value,
}

impl CallSite {
    pub fn new(breadcrumb: impl Into<String>) -> Self {
        Self {
            breadcrumb: breadcrumb.into(),
            context: json!({}),
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }
}

impl Default for CallSite {
    fn default() -> Self {
        Self::new(DEFAULT_BREADCRUMB)
    }
}

/// Log `error` once under `breadcrumb` and return the error to raise, keyed by
/// the vendor code rather than the vendor message.
pub fn normalize_error(
    logger: &dyn Logger,
    error: &BrevoError,
    breadcrumb: &str,
    context: &Value,
) -> ApiError {
    logger.error(
        breadcrumb,
        &json!({
            "message": error.message,
            "data": {
                "context": context,
                "request": error.request,
                "body": error.body,
                "statusCode": error.status_code,
            },
        }),
    );

    ApiError::Code(error.code.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::testing::RecordingLogger;

    fn vendor_error() -> BrevoError {
        BrevoError {
            body: json!("Error body"),
            status_code: 400,
            request: json!("Request details"),
            code: "ERROR_CODE".to_string(),
            message: "Error message".to_string(),
        }
    }

    #[test]
    fn logs_once_and_raises_code() {
        let logger = RecordingLogger::default();
        let err = normalize_error(
            &logger,
            &vendor_error(),
            "TestBreadcrumb",
            &json!({ "testData": "value" }),
        );

        assert_eq!(err.to_string(), "ERROR_CODE");
        assert!(matches!(err, ApiError::Code(ref code) if code == "ERROR_CODE"));

        let errors = logger.errors();
        assert_eq!(errors.len(), 1);
        let (breadcrumb, data) = &errors[0];
        assert_eq!(breadcrumb, "TestBreadcrumb");
        assert_eq!(data["message"], "Error message");
        assert_eq!(data["data"]["statusCode"], 400);
        assert_eq!(data["data"]["context"], json!({ "testData": "value" }));
        assert_eq!(data["data"]["request"], "Request details");
        assert_eq!(data["data"]["body"], "Error body");
    }

    #[test]
    fn message_is_not_the_raised_identity() {
        let logger = RecordingLogger::default();
        let err = normalize_error(&logger, &vendor_error(), "X", &json!({}));
        assert_ne!(err.to_string(), "Error message");
    }

    #[test]
    fn default_call_site_uses_middleware_breadcrumb() {
        let site = CallSite::default();
        assert_eq!(site.breadcrumb, "Middleware");
        assert_eq!(site.context, json!({}));

        let logger = RecordingLogger::default();
        normalize_error(&logger, &vendor_error(), &site.breadcrumb, &site.context);
        assert_eq!(logger.errors()[0].0, "Middleware");
    }
}
