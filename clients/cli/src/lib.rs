//! HTTP client and error reporting layer for the wanderlist and packages APIs.

pub mod cli_messages;
pub mod config;
pub mod consts;
pub mod environment;
pub mod logging;
pub mod network;
pub mod reporting;
pub mod services;

pub use config::{Service, ServiceRegistry};
pub use environment::Environment;
pub use network::{ApiClient, ApiError, ClientError, RequestConfig, ResponseBody};
pub use reporting::{ErrorCategory, ErrorInput, ErrorRecord, ErrorReporter};
