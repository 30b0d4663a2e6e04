use thiserror::Error;

use lotdispatch_core::DispatchWarning;

/// Fallback shown when the server rejects a request without a message.
pub const GENERIC_SERVER_MESSAGE: &str = "The warehouse service could not complete the request";

/// Errors that can occur when talking to the warehouse service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Non-success status or `success: false` envelope.
    #[error("{message} (status {status})")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server message, or a generic fallback.
        message: String,
    },

    /// Envelope carried no `data`.
    #[error("No data returned by the warehouse service")]
    NoData,

    /// Data present but in neither expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// No authenticated user to submit on behalf of.
    #[error("No authenticated user - sign in before submitting a dispatch")]
    NotAuthenticated,

    /// Recoverable validation warning.
    #[error(transparent)]
    Validation(#[from] DispatchWarning),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Whether the error is a recoverable validation warning rather than a
    /// failure of the operation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Build a server error, preferring the server's own message.
    pub(crate) fn server(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_SERVER_MESSAGE.to_string());
        Self::Server { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_preferred() {
        let err = ClientError::server(422, Some("Insufficient stock".to_string()));
        assert_eq!(err.to_string(), "Insufficient stock (status 422)");
    }

    #[test]
    fn test_server_message_fallback() {
        let err = ClientError::server(500, Some("  ".to_string()));
        assert!(matches!(
            err,
            ClientError::Server { status: 500, ref message } if message == GENERIC_SERVER_MESSAGE
        ));
    }

    #[test]
    fn test_validation_passes_warning_through() {
        let err = ClientError::from(DispatchWarning::EmptyCart);
        assert!(err.is_validation());
        assert_eq!(err.to_string(), DispatchWarning::EmptyCart.to_string());
        assert!(!ClientError::NoData.is_validation());
    }
}
