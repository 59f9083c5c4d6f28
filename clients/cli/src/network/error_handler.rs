//! Centralized error handling and classification

use super::error::ClientError;
use crate::reporting::ErrorCategory;

/// Decides how facade failures are categorised and whether they are worth retrying.
#[derive(Debug, Clone, Default)]
pub struct ErrorHandler;

impl ErrorHandler {
    pub fn new() -> Self {
        Self
    }

    /// Category used when the caller did not pick one.
    pub fn categorize(&self, error: &ClientError) -> ErrorCategory {
        match error {
            // Rejected credentials
            ClientError::Api(e) if e.status == 401 || e.status == 403 => ErrorCategory::Auth,

            // Any other non-2xx response
            ClientError::Api(_) => ErrorCategory::Api,

            // Connectivity
            ClientError::Reqwest(_) | ClientError::Io(_) => ErrorCategory::Network,

            // Bad caller input
            ClientError::InvalidHeader { .. } => ErrorCategory::Validation,

            ClientError::Serialization(_) => ErrorCategory::Unknown,
        }
    }

    /// Determine if an error should trigger retry logic
    pub fn should_retry(&self, error: &ClientError) -> bool {
        match error {
            // Malformed requests fail the same way every time
            ClientError::Reqwest(e) => !e.is_builder(),
            ClientError::Io(_) => true,

            ClientError::Api(e) => matches!(e.status, 408 | 429 | 500..=599),

            ClientError::Serialization(_) | ClientError::InvalidHeader { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::error::ApiError;

    fn api(status: u16) -> ClientError {
        ClientError::Api(ApiError::new(status, None))
    }

    #[test]
    fn test_categorize() {
        let handler = ErrorHandler::new();
        assert_eq!(handler.categorize(&api(401)), ErrorCategory::Auth);
        assert_eq!(handler.categorize(&api(403)), ErrorCategory::Auth);
        assert_eq!(handler.categorize(&api(404)), ErrorCategory::Api);
        assert_eq!(handler.categorize(&api(500)), ErrorCategory::Api);
        assert_eq!(
            handler.categorize(&ClientError::Io(std::io::Error::other("reset"))),
            ErrorCategory::Network
        );
        assert_eq!(
            handler.categorize(&ClientError::InvalidHeader {
                name: "x".to_string(),
                reason: "bad".to_string()
            }),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn test_should_retry() {
        let handler = ErrorHandler::new();
        assert!(handler.should_retry(&api(503)));
        assert!(handler.should_retry(&api(429)));
        assert!(handler.should_retry(&api(408)));
        assert!(!handler.should_retry(&api(404)));
        assert!(!handler.should_retry(&api(401)));
        assert!(handler.should_retry(&ClientError::Io(std::io::Error::other("reset"))));
    }
}
