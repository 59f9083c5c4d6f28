//! The wire. `ApiClient` only sees [`Transport`]; production uses reqwest.

use super::credentials::CookieJar;
use super::error::ClientError;
use crate::consts::client_consts::{CONNECT_TIMEOUT_SECS, USER_AGENT};
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, ClientBuilder, Method};
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Attach and store jar cookies. Off for calls made on behalf of another caller.
    pub with_cookies: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and reads the whole response. No cancellation or overall timeout.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// reqwest-backed transport. Requests flagged `with_cookies` share the jar; the rest
/// go through a client that has no cookie store at all.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    anonymous: Client,
}

fn client_builder() -> ClientBuilder {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
}

impl ReqwestTransport {
    pub fn new(cookies: Arc<CookieJar>) -> Result<Self, ClientError> {
        Ok(Self {
            client: client_builder().cookie_provider(cookies).build()?,
            anonymous: client_builder().build()?,
        })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let client = if request.with_cookies {
            &self.client
        } else {
            &self.anonymous
        };
        let mut builder = client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
