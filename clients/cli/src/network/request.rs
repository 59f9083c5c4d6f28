//! Per-call request configuration and URL construction.

use super::credentials::CredentialSource;
use crate::reporting::ErrorCategory;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A scalar query parameter value. Nested values are not supported.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Uint(n) => write!(f, "{}", n),
            ParamValue::Float(n) => write!(f, "{}", n),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Uint(value.into())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Uint(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Options for a single call. Built fresh for every request.
#[derive(Clone)]
pub struct RequestConfig {
    /// Overrides the client's default credential source for this call.
    pub credentials: Option<Arc<dyn CredentialSource>>,
    /// Explicit bearer token; wins over any credential source.
    pub token: Option<String>,
    /// JSON body. Ignored for GET.
    pub body: Option<Value>,
    /// Query parameters, encoded in the order given.
    pub params: Vec<(String, ParamValue)>,
    pub headers: Vec<(String, String)>,
    /// Category used when this call's failure is logged.
    pub category: Option<ErrorCategory>,
    /// Forward this call's failure to the error tracker. It is logged either way.
    pub should_report: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            token: None,
            body: None,
            params: Vec::new(),
            headers: Vec::new(),
            category: None,
            should_report: true,
        }
    }
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn category(mut self, category: ErrorCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn should_report(mut self, should_report: bool) -> Self {
        self.should_report = should_report;
        self
    }
}

impl std::fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestConfig")
            .field(
                "credentials",
                &self.credentials.as_ref().map(|c| c.context()),
            )
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("body", &self.body)
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("category", &self.category)
            .field("should_report", &self.should_report)
            .finish()
    }
}

/// Form-urlencodes `params` as `key=value` pairs joined by `&`.
pub fn encode_query(params: &[(String, ParamValue)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&value.to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// `base_url + path`, verbatim, plus `?<query>` when there are params.
pub fn build_url(base_url: &str, path: &str, params: &[(String, ParamValue)]) -> String {
    if params.is_empty() {
        format!("{}{}", base_url, path)
    } else {
        format!("{}{}?{}", base_url, path, encode_query(params))
    }
}
