//! Error handling for the network module

use super::response::ResponseBody;
use crate::reporting::{ErrorInput, get_http_error_message, get_http_status_message};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reqwest error, typically related to network issues or request failures.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Low-level connection failure reported by a transport.
    #[error("Connection error: {0}")]
    Io(#[from] std::io::Error),

    /// A request body could not be encoded or a JSON response could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A caller-supplied header (or the bearer token) is not a valid header.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

impl ClientError {
    /// The HTTP status, for errors that came back from the service.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(e) => Some(e.status),
            _ => None,
        }
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// A non-2xx response, normalised.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: u16,
    /// Parsed body; `None` only when the body was empty.
    pub data: Option<ResponseBody>,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, data: Option<ResponseBody>) -> Self {
        let message = data
            .as_ref()
            .and_then(ResponseBody::as_json)
            .and_then(|json| json.get("message"))
            .and_then(|message| message.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("API Error: {}", status));

        Self {
            status,
            data,
            message,
        }
    }

    pub fn user_message(&self) -> &'static str {
        get_http_error_message(self.status)
    }

    pub fn status_label(&self) -> &'static str {
        get_http_status_message(self.status)
    }
}

impl From<&ApiError> for ErrorInput {
    fn from(error: &ApiError) -> Self {
        ErrorInput::StructuredPayload(json!({
            "status": error.status,
            "message": error.message,
            "data": error.data.as_ref().map(ResponseBody::to_value),
        }))
    }
}

impl From<&ClientError> for ErrorInput {
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::Api(e) => ErrorInput::from(e),
            ClientError::Reqwest(e) => ErrorInput::from_error("TransportError", e),
            ClientError::Io(e) => ErrorInput::from_error("TransportError", e),
            ClientError::Serialization(e) => ErrorInput::from_error("SerializationError", e),
            ClientError::InvalidHeader { .. } => {
                ErrorInput::native("HeaderError", error.to_string())
            }
        }
    }
}
