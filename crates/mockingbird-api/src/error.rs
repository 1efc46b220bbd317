//! Wire rendering of simulated API errors.
//!
//! Only errors the real service actually reports get a wire form. The
//! harness-defect variants (unroutable path, undeclared or unsupported
//! parameters) deliberately have none: they indicate a gap in the
//! simulation's coverage or in the test's wiring, and must never look
//! like a simulated API failure to the client under test.

use mockingbird_core::error::ServiceError;
use serde_json::{Value, json};

/// A simulated transport-level error: numeric status, short reason and
/// the documented JSON error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireError {
    /// HTTP status code.
    pub status: u16,
    /// Short reason phrase.
    pub reason: &'static str,
    /// `{errors: [{message, code}]}` body.
    pub body: Value,
}

/// The wire form of a [`ServiceError`], if it has one.
pub fn wire_error(error: &ServiceError) -> Option<WireError> {
    match error {
        ServiceError::NotFound { .. } => Some(WireError {
            status: 404,
            reason: "Not Found",
            body: json!({
                "errors": [
                    {"message": "Sorry, that page does not exist", "code": 34},
                ],
            }),
        }),
        ServiceError::OwnershipViolation { .. } => Some(WireError {
            status: 403,
            reason: "Forbidden",
            body: json!({
                "errors": [
                    {"message": "You may not delete another user's status", "code": 183},
                ],
            }),
        }),
        ServiceError::UnsupportedFeature { .. }
        | ServiceError::UnroutableRequest { .. }
        | ServiceError::MissingParameter { .. }
        | ServiceError::UnknownParameter { .. }
        | ServiceError::InvalidParameter { .. } => None,
    }
}
