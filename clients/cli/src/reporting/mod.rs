//! Error classification and reporting
//!
//! Every error that reaches this layer gets a category, a correlation id and a
//! user-presentable message, then is written to the log. In production the
//! record is also forwarded to an [`ErrorTracker`].

use crate::environment::Environment;
use crate::logging::LogLevel;
use serde::Serialize;
use std::sync::Arc;

pub mod http_status;
pub mod input;
mod safe;

pub use http_status::{get_http_error_message, get_http_status_message};
pub use input::{ErrorInput, create_error_id, format_error_message, is_network_error};
pub use safe::backoff_delay;

#[cfg(test)]
use mockall::automock;

#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorCategory {
    /// Non-2xx responses with a body.
    Api,
    /// Connectivity and transport failures, including exhausted retries.
    Network,
    /// Credential or session failures.
    Auth,
    /// Bad caller input.
    Validation,
    /// Presentation-layer failures.
    Ui,
    #[default]
    Unknown,
}

impl ErrorCategory {
    pub fn log_level(&self) -> LogLevel {
        match self {
            ErrorCategory::Network | ErrorCategory::Validation => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// The logged representation of an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub id: String,
    pub message: String,
    pub category: ErrorCategory,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub context: String,
    pub stack: Option<String>,
    pub original: ErrorInput,
}

impl ErrorRecord {
    pub fn new(error: ErrorInput, context: &str, category: ErrorCategory) -> Self {
        Self {
            id: create_error_id(&error),
            message: format_error_message(&error),
            category,
            timestamp: chrono::Utc::now().timestamp_millis(),
            context: context.to_string(),
            stack: error.stack().map(str::to_string),
            original: error,
        }
    }
}

/// External error-tracking sink. Implementations must not panic.
#[cfg_attr(test, automock)]
pub trait ErrorTracker: Send + Sync {
    fn capture(&self, record: &ErrorRecord);
}

/// Stand-in tracker that only notes the record in the debug log.
#[derive(Debug, Default, Clone)]
pub struct LogTracker;

impl ErrorTracker for LogTracker {
    fn capture(&self, record: &ErrorRecord) {
        log::debug!(
            target: "wander_client::tracker",
            "error {} ({}) queued for tracking",
            record.id,
            record.category
        );
    }
}

#[derive(Clone)]
pub struct ErrorReporter {
    environment: Environment,
    tracker: Arc<dyn ErrorTracker>,
}

impl ErrorReporter {
    pub fn new(environment: Environment) -> Self {
        Self::with_tracker(environment, Arc::new(LogTracker))
    }

    pub fn with_tracker(environment: Environment, tracker: Arc<dyn ErrorTracker>) -> Self {
        Self {
            environment,
            tracker,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Logs an error under `category` and, in production, forwards it to the tracker.
    pub fn log_error(
        &self,
        error: impl Into<ErrorInput>,
        context: &str,
        should_report: bool,
        category: ErrorCategory,
    ) {
        let record = ErrorRecord::new(error.into(), context, category);

        log::log!(
            target: "wander_client::errors",
            log::Level::from(category.log_level()),
            "[{}] {}: {} (id: {})",
            record.category,
            record.context,
            record.message,
            record.id
        );
        if let Some(stack) = &record.stack {
            log::debug!(target: "wander_client::errors", "{} stack:\n{}", record.id, stack);
        }

        if should_report && self.environment.is_production() {
            self.tracker.capture(&record);
        }
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}
