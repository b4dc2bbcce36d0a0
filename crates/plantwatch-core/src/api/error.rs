use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Command delivery failed: {0}")]
    CommandDelivery(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl RelayError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Describe a failed response as `Status <code>: <body>`
    pub(crate) fn describe_status(status: reqwest::StatusCode, body: &str) -> String {
        let truncated = Self::truncate_body(body);
        if truncated.is_empty() {
            format!("Status {}", status)
        } else {
            format!("Status {}: {}", status, truncated)
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, RelayError::Configuration(_))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, RelayError::Authentication(_))
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, RelayError::CommandDelivery(_))
    }
}
