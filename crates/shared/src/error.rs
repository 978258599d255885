use serde::{Deserialize, Serialize};

/// Error body returned by the studies backend, e.g. `{"error":"Could not find study 42"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Extracts the human-readable payload from a raw response body.
    ///
    /// Falls back to the trimmed body when it is not an error object.
    pub fn payload_from_body(body: &str) -> String {
        match serde_json::from_str::<ApiError>(body) {
            Ok(parsed) => parsed.error,
            Err(_) => body.trim().to_string(),
        }
    }
}
