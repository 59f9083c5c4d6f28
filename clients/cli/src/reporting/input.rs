//! Error inputs and the pure functions that describe them.

use crate::consts::client_consts::messages::{
    NETWORK_ERROR_MARKERS, REQUEST_ERROR_FALLBACK, UNEXPECTED_ERROR,
};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::backtrace::{Backtrace, BacktraceStatus};

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 6;

/// Anything that can be handed to the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ErrorInput {
    /// A Rust error value, identified by a short type name.
    Native {
        name: String,
        message: String,
        stack: Option<String>,
    },
    /// A bare message.
    Message(String),
    /// A JSON payload, typically an API error body.
    StructuredPayload(Value),
    /// Nothing usable.
    Unknown,
}

impl ErrorInput {
    pub fn native(name: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorInput::Native {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Wraps a Rust error. A backtrace is attached when `RUST_BACKTRACE` enables capture.
    pub fn from_error(name: &str, error: &dyn std::error::Error) -> Self {
        let backtrace = Backtrace::capture();
        let stack = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };
        ErrorInput::Native {
            name: name.to_string(),
            message: error.to_string(),
            stack,
        }
    }

    pub fn stack(&self) -> Option<&str> {
        match self {
            ErrorInput::Native { stack, .. } => stack.as_deref(),
            _ => None,
        }
    }
}

impl From<String> for ErrorInput {
    fn from(message: String) -> Self {
        ErrorInput::Message(message)
    }
}

impl From<&String> for ErrorInput {
    fn from(message: &String) -> Self {
        ErrorInput::Message(message.clone())
    }
}

impl From<&str> for ErrorInput {
    fn from(message: &str) -> Self {
        ErrorInput::Message(message.to_string())
    }
}

impl From<Value> for ErrorInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ErrorInput::Unknown,
            Value::String(message) => ErrorInput::Message(message),
            other => ErrorInput::StructuredPayload(other),
        }
    }
}

impl From<&Value> for ErrorInput {
    fn from(value: &Value) -> Self {
        ErrorInput::from(value.clone())
    }
}

impl From<&ErrorInput> for ErrorInput {
    fn from(input: &ErrorInput) -> Self {
        input.clone()
    }
}

impl From<&std::io::Error> for ErrorInput {
    fn from(error: &std::io::Error) -> Self {
        ErrorInput::from_error("IoError", error)
    }
}

impl<T: Into<ErrorInput>> From<Option<T>> for ErrorInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(ErrorInput::Unknown, Into::into)
    }
}

/// Produces a user-presentable message for any error input. Never fails.
pub fn format_error_message(error: &ErrorInput) -> String {
    match error {
        ErrorInput::Native { message, .. } => message.clone(),
        ErrorInput::Message(message) => message.clone(),
        ErrorInput::StructuredPayload(payload) => format_payload(payload),
        ErrorInput::Unknown => UNEXPECTED_ERROR.to_string(),
    }
}

fn format_payload(payload: &Value) -> String {
    if payload.is_null() {
        return UNEXPECTED_ERROR.to_string();
    }
    if let Some(message) = payload.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    if let Some(error) = payload.get("error").and_then(Value::as_str) {
        return error.to_string();
    }
    if let Some(message) = payload
        .get("data")
        .filter(|data| data.is_object())
        .and_then(|data| data.get("message"))
        .filter(|message| !message.is_null())
    {
        return match message {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
    }
    match serde_json::to_string(payload) {
        Ok(json) => format!("Error: {}", json),
        Err(_) => REQUEST_ERROR_FALLBACK.to_string(),
    }
}

/// Builds a correlation id of the form `<type>-<timestamp36>-<random6>`.
pub fn create_error_id(error: &ErrorInput) -> String {
    let timestamp = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
    format!(
        "{}-{}-{}",
        error_type_tag(error),
        to_base36(timestamp),
        random_base36(ID_SUFFIX_LEN)
    )
}

fn error_type_tag(error: &ErrorInput) -> String {
    match error {
        ErrorInput::Native { name, .. } if !name.is_empty() => {
            name.chars().take(4).collect::<String>().to_lowercase()
        }
        ErrorInput::StructuredPayload(payload) => {
            if let Some(status) = payload.get("status").filter(|s| s.is_number()) {
                return format!("http{}", status);
            }
            match payload.get("code") {
                Some(Value::String(code)) => format!("code{}", code.chars().take(4).collect::<String>()),
                Some(code) if !code.is_null() => {
                    format!("code{}", code.to_string().chars().take(4).collect::<String>())
                }
                _ => "unknown".to_string(),
            }
        }
        _ => "unknown".to_string(),
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36_DIGITS[rng.gen_range(0..BASE36_DIGITS.len())] as char)
        .collect()
}

/// True only for native errors whose message names a connectivity failure.
pub fn is_network_error(error: &ErrorInput) -> bool {
    match error {
        ErrorInput::Native { message, .. } => {
            let message = message.to_lowercase();
            NETWORK_ERROR_MARKERS
                .iter()
                .any(|marker| message.contains(marker))
        }
        _ => false,
    }
}
