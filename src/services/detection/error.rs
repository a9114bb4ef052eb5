// Detection Errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// A required model field is missing, non-numeric or not finite.
    #[error("Invalid model result: {field} {reason}")]
    InvalidModelResult { field: &'static str, reason: String },
    /// The raw model payload could not be read as JSON at all.
    #[error("Malformed model payload: {0}")]
    MalformedPayload(String),
}

impl DetectionError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidModelResult {
            field,
            reason: reason.into(),
        }
    }
}
