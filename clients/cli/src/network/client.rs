//! API client facade
//!
//! One entry point for both backend services: resolves the base URL, attaches
//! the bearer token, encodes the body and query, and normalises the response.
//! Every failure is logged through the [`ErrorReporter`] and then returned.

use super::auth_events::AuthEventSink;
use super::credentials::{
    BrowserCookieCredentialSource, CookieJar, CredentialSource, ExecutionContext,
};
use super::error::{ApiError, ClientError};
use super::error_handler::ErrorHandler;
use super::request::{RequestConfig, build_url};
use super::response::ResponseBody;
use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::config::{Service, ServiceRegistry};
use crate::reporting::{ErrorCategory, ErrorReporter};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiClient {
    registry: Arc<ServiceRegistry>,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
    auth_events: Option<Arc<dyn AuthEventSink>>,
    reporter: ErrorReporter,
    error_handler: ErrorHandler,
}

impl ApiClient {
    pub fn new(
        registry: ServiceRegistry,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialSource>,
        reporter: ErrorReporter,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            transport,
            credentials,
            auth_events: None,
            reporter,
            error_handler: ErrorHandler::new(),
        }
    }

    /// A reqwest-backed client whose default credentials come from `jar`.
    pub fn with_cookie_jar(
        registry: ServiceRegistry,
        jar: Arc<CookieJar>,
        reporter: ErrorReporter,
    ) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(jar.clone())?;
        Ok(Self::new(
            registry,
            Arc::new(transport),
            Arc::new(BrowserCookieCredentialSource::new(jar)),
            reporter,
        ))
    }

    /// Registers the sink told about rejected credentials.
    pub fn with_auth_events(mut self, sink: Arc<dyn AuthEventSink>) -> Self {
        self.auth_events = Some(sink);
        self
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    pub fn error_handler(&self) -> &ErrorHandler {
        &self.error_handler
    }

    pub async fn get(
        &self,
        service: Service,
        path: &str,
        config: RequestConfig,
    ) -> Result<ResponseBody, ClientError> {
        self.request(Method::GET, service, path, config).await
    }

    pub async fn post(
        &self,
        service: Service,
        path: &str,
        config: RequestConfig,
    ) -> Result<ResponseBody, ClientError> {
        self.request(Method::POST, service, path, config).await
    }

    pub async fn put(
        &self,
        service: Service,
        path: &str,
        config: RequestConfig,
    ) -> Result<ResponseBody, ClientError> {
        self.request(Method::PUT, service, path, config).await
    }

    pub async fn patch(
        &self,
        service: Service,
        path: &str,
        config: RequestConfig,
    ) -> Result<ResponseBody, ClientError> {
        self.request(Method::PATCH, service, path, config).await
    }

    pub async fn delete(
        &self,
        service: Service,
        path: &str,
        config: RequestConfig,
    ) -> Result<ResponseBody, ClientError> {
        self.request(Method::DELETE, service, path, config).await
    }

    /// GET and deserialize the body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        service: Service,
        path: &str,
        config: RequestConfig,
    ) -> Result<T, ClientError> {
        let category = config.category;
        let should_report = config.should_report;
        let body = self.get(service, path, config).await?;
        body.into_json().map_err(|e| {
            self.report_failure(&e, &Method::GET, service, path, category, should_report);
            e
        })
    }

    pub async fn request(
        &self,
        method: Method,
        service: Service,
        path: &str,
        config: RequestConfig,
    ) -> Result<ResponseBody, ClientError> {
        match self.execute(&method, service, path, &config).await {
            Ok(body) => Ok(body),
            Err(e) => {
                // HTTP-level failures were already logged with their URL.
                if !matches!(e, ClientError::Api(_)) {
                    self.report_failure(
                        &e,
                        &method,
                        service,
                        path,
                        config.category,
                        config.should_report,
                    );
                }
                Err(e)
            }
        }
    }

    fn report_failure(
        &self,
        error: &ClientError,
        method: &Method,
        service: Service,
        path: &str,
        category: Option<ErrorCategory>,
        should_report: bool,
    ) {
        let category = category.unwrap_or_else(|| self.error_handler.categorize(error));
        self.reporter.log_error(
            error,
            &format!("{} {} {}", service, method, path),
            should_report,
            category,
        );
    }

    async fn execute(
        &self,
        method: &Method,
        service: Service,
        path: &str,
        config: &RequestConfig,
    ) -> Result<ResponseBody, ClientError> {
        let base_url = &self.registry.get(service).base_url;
        let url = build_url(base_url, path, &config.params);

        let credentials = config.credentials.as_ref().unwrap_or(&self.credentials);
        let token = config.token.clone().or_else(|| credentials.auth_token());
        let headers = build_headers(&config.headers, token.as_deref())?;

        let body = match &config.body {
            Some(body) if *method != Method::GET => Some(serde_json::to_vec(body)?),
            _ => None,
        };

        log::debug!("{} {}", method, url);
        let response = self
            .transport
            .send(HttpRequest {
                method: method.clone(),
                url: url.clone(),
                headers,
                body,
                with_cookies: credentials.context() == ExecutionContext::Browser,
            })
            .await?;

        self.handle_response(response, &url, &**credentials, config)
    }

    fn handle_response(
        &self,
        response: HttpResponse,
        url: &str,
        credentials: &dyn CredentialSource,
        config: &RequestConfig,
    ) -> Result<ResponseBody, ClientError> {
        let body = ResponseBody::parse(response.content_type.as_deref(), &response.body)?;

        // Server-side contexts cannot touch the user's cookies, so they are left alone.
        if response.status == 401 && credentials.context() == ExecutionContext::Browser {
            credentials.clear_session();
            if let Some(sink) = &self.auth_events {
                sink.on_unauthorized();
            }
        }

        if !(200..=299).contains(&response.status) {
            let error = ClientError::Api(ApiError::new(response.status, body));
            let category = config
                .category
                .unwrap_or_else(|| self.error_handler.categorize(&error));
            self.reporter.log_error(
                &error,
                &format!("API request to {}", url),
                config.should_report,
                category,
            );
            return Err(error);
        }

        Ok(body.unwrap_or_else(|| ResponseBody::Text(String::new())))
    }
}

fn build_headers(extra: &[(String, String)], token: Option<&str>) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    for (name, value) in extra {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ClientError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            ClientError::InvalidHeader {
                name: AUTHORIZATION.to_string(),
                reason: e.to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::client_consts::{AUTH_TOKEN_COOKIE, USER_COOKIE};
    use crate::environment::Environment;
    use crate::network::auth_events::MockAuthEventSink;
    use crate::network::credentials::{NoCredentials, RequestHeaderCredentialSource};
    use crate::network::transport::MockTransport;
    use crate::reporting::{ErrorCategory, MockErrorTracker};
    use serde_json::json;

    fn registry() -> ServiceRegistry {
        ServiceRegistry::new(
            "http://wanderlist.test/api",
            "http://packages.test/api",
            "http://app.test",
        )
        .unwrap()
    }

    fn client_with(transport: MockTransport, credentials: Arc<dyn CredentialSource>) -> ApiClient {
        ApiClient::new(
            registry(),
            Arc::new(transport),
            credentials,
            ErrorReporter::new(Environment::Development),
        )
    }

    fn browser_jar() -> Arc<CookieJar> {
        let jar = Arc::new(CookieJar::new());
        jar.set(AUTH_TOKEN_COOKIE, "jar-token");
        jar.set(USER_COOKIE, "{\"name\":\"Asha\"}");
        jar
    }

    #[tokio::test]
    async fn test_get_returns_json_body_without_auth() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.method == Method::GET
                    && request.url == "http://packages.test/api/travel-packages?page=1&limit=10"
                    && request.headers.get(AUTHORIZATION).is_none()
                    && request.headers.get(CONTENT_TYPE).unwrap() == "application/json"
                    && request.body.is_none()
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({"items": [], "total": 0}))));

        let client = client_with(transport, Arc::new(NoCredentials));
        let body = client
            .get(
                Service::Packages,
                "/travel-packages?page=1&limit=10",
                RequestConfig::new(),
            )
            .await
            .unwrap();

        assert_eq!(body, ResponseBody::Json(json!({"items": [], "total": 0})));
    }

    #[tokio::test]
    async fn test_explicit_token_wins_over_cookie() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| request.headers.get(AUTHORIZATION).unwrap() == "Bearer explicit")
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({}))));

        let client = client_with(
            transport,
            Arc::new(BrowserCookieCredentialSource::new(browser_jar())),
        );
        client
            .get(
                Service::Wanderlist,
                "/wanderlists",
                RequestConfig::new().token("explicit"),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_token_read_from_default_and_per_call_sources() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.headers.get(AUTHORIZATION).unwrap() == "Bearer jar-token"
                    && request.with_cookies
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({}))));
        transport
            .expect_send()
            .withf(|request| {
                request.headers.get(AUTHORIZATION).unwrap() == "Bearer inbound"
                    && !request.with_cookies
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({}))));

        let client = client_with(
            transport,
            Arc::new(BrowserCookieCredentialSource::new(browser_jar())),
        );
        client
            .get(Service::Wanderlist, "/me", RequestConfig::new())
            .await
            .unwrap();

        let server_side = RequestHeaderCredentialSource::new(Some(
            "theme=dark; authToken=inbound".to_string(),
        ));
        client
            .get(
                Service::Wanderlist,
                "/me",
                RequestConfig::new().credentials(Arc::new(server_side)),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_body_is_sent_for_writes_but_never_for_get() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| request.method == Method::GET && request.body.is_none())
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({}))));
        transport
            .expect_send()
            .withf(|request| {
                request.method == Method::PATCH
                    && request.body.as_deref() == Some(br#"{"name":"Spiti"}"#.as_slice())
                    && request.headers.get("x-request-source").unwrap() == "web"
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::text(200, "updated")));

        let client = client_with(transport, Arc::new(NoCredentials));
        let config = RequestConfig::new()
            .body(json!({"name": "Spiti"}))
            .header("X-Request-Source", "web");

        client
            .get(Service::Wanderlist, "/wanderlists/1", config.clone())
            .await
            .unwrap();
        let body = client
            .patch(Service::Wanderlist, "/wanderlists/1", config)
            .await
            .unwrap();
        assert_eq!(body, ResponseBody::Text("updated".to_string()));
    }

    #[tokio::test]
    async fn test_caller_cannot_drop_content_type() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| request.headers.get(CONTENT_TYPE).unwrap() == "application/json")
            .times(1)
            .returning(|_| {
                Ok(HttpResponse {
                    status: 204,
                    ..HttpResponse::default()
                })
            });

        let client = client_with(transport, Arc::new(NoCredentials));
        let body = client
            .delete(
                Service::Packages,
                "/travel-packages/9",
                RequestConfig::new().header("Content-Type", "text/plain"),
            )
            .await
            .unwrap();
        assert_eq!(body, ResponseBody::Text(String::new()));
    }

    #[tokio::test]
    async fn test_401_in_browser_clears_cookies_and_notifies_once() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::json(401, &json!({"message": "Token expired"}))));
        let mut sink = MockAuthEventSink::new();
        sink.expect_on_unauthorized().times(1).return_const(());

        let jar = browser_jar();
        let client = client_with(
            transport,
            Arc::new(BrowserCookieCredentialSource::new(jar.clone())),
        )
        .with_auth_events(Arc::new(sink));

        let error = client
            .get(Service::Wanderlist, "/me", RequestConfig::new())
            .await
            .unwrap_err();

        let api = error.as_api().unwrap();
        assert_eq!(api.status, 401);
        assert_eq!(api.message, "Token expired");
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), None);
        assert_eq!(jar.get(USER_COOKIE), None);
    }

    #[tokio::test]
    async fn test_401_without_sink_still_clears_cookies() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| {
                Ok(HttpResponse {
                    status: 401,
                    ..HttpResponse::default()
                })
            });

        let jar = browser_jar();
        let client = client_with(
            transport,
            Arc::new(BrowserCookieCredentialSource::new(jar.clone())),
        );
        let error = client
            .get(Service::Wanderlist, "/me", RequestConfig::new())
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(401));
        assert_eq!(error.as_api().unwrap().message, "API Error: 401");
        assert_eq!(error.as_api().unwrap().data, None);
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), None);
    }

    #[tokio::test]
    async fn test_401_on_server_side_leaves_cookies() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::json(401, &json!({}))));
        let mut sink = MockAuthEventSink::new();
        sink.expect_on_unauthorized().times(0);

        let jar = browser_jar();
        let server_side = RequestHeaderCredentialSource::new(None).with_ambient_jar(jar.clone());
        let client = client_with(transport, Arc::new(server_side)).with_auth_events(Arc::new(sink));

        let error = client
            .get(Service::Wanderlist, "/me", RequestConfig::new())
            .await
            .unwrap_err();
        assert_eq!(error.status(), Some(401));
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), Some("jar-token".to_string()));
    }

    #[tokio::test]
    async fn test_success_never_touches_session() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::json(201, &json!({"id": 7}))));
        let mut sink = MockAuthEventSink::new();
        sink.expect_on_unauthorized().times(0);

        let jar = browser_jar();
        let client = client_with(
            transport,
            Arc::new(BrowserCookieCredentialSource::new(jar.clone())),
        )
        .with_auth_events(Arc::new(sink));

        let body = client
            .post(
                Service::Wanderlist,
                "/inquiries",
                RequestConfig::new().body(json!({"phone": "9999999999"})),
            )
            .await
            .unwrap();
        assert_eq!(body, ResponseBody::Json(json!({"id": 7})));
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), Some("jar-token".to_string()));
    }

    #[tokio::test]
    async fn test_http_error_is_reported_with_url_context() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::json(404, &json!({"message": "No such package"}))));
        let mut tracker = MockErrorTracker::new();
        tracker
            .expect_capture()
            .withf(|record| {
                record.category == ErrorCategory::Api
                    && record.context == "API request to http://packages.test/api/travel-packages/x"
                    && record.message == "No such package"
                    && record.id.starts_with("http404-")
            })
            .times(1)
            .return_const(());

        let client = ApiClient::new(
            registry(),
            Arc::new(transport),
            Arc::new(NoCredentials),
            ErrorReporter::with_tracker(Environment::Production, Arc::new(tracker)),
        );
        let error = client
            .get(Service::Packages, "/travel-packages/x", RequestConfig::new())
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "No such package");
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_unchanged() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Failed to fetch",
            )))
        });
        let mut tracker = MockErrorTracker::new();
        tracker
            .expect_capture()
            .withf(|record| {
                record.category == ErrorCategory::Ui
                    && record.context == "packages GET /travel-packages"
                    && record.message == "Failed to fetch"
            })
            .times(1)
            .return_const(());

        let client = ApiClient::new(
            registry(),
            Arc::new(transport),
            Arc::new(NoCredentials),
            ErrorReporter::with_tracker(Environment::Production, Arc::new(tracker)),
        );
        let error = client
            .get(
                Service::Packages,
                "/travel-packages",
                RequestConfig::new().category(ErrorCategory::Ui),
            )
            .await
            .unwrap_err();

        match error {
            ClientError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::ConnectionRefused);
                assert_eq!(e.to_string(), "Failed to fetch");
            }
            other => panic!("expected the transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_header_fails_before_sending() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);

        let client = client_with(transport, Arc::new(NoCredentials));
        let error = client
            .get(
                Service::Packages,
                "/travel-packages",
                RequestConfig::new().header("bad header", "x"),
            )
            .await
            .unwrap_err();
        assert!(matches!(error, ClientError::InvalidHeader { .. }));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_reported() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({"items": "not a list"}))));
        let mut tracker = MockErrorTracker::new();
        tracker
            .expect_capture()
            .withf(|record| {
                record.category == ErrorCategory::Unknown
                    && record.context == "packages GET /travel-packages"
                    && record.id.starts_with("seri-")
            })
            .times(1)
            .return_const(());

        let client = ApiClient::new(
            registry(),
            Arc::new(transport),
            Arc::new(NoCredentials),
            ErrorReporter::with_tracker(Environment::Production, Arc::new(tracker)),
        );
        let error = client
            .get_json::<Vec<String>>(Service::Packages, "/travel-packages", RequestConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(error, ClientError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_unreported_call_is_not_tracked() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::json(503, &json!({"message": "busy"}))));
        let mut tracker = MockErrorTracker::new();
        tracker.expect_capture().times(0);

        let client = ApiClient::new(
            registry(),
            Arc::new(transport),
            Arc::new(NoCredentials),
            ErrorReporter::with_tracker(Environment::Production, Arc::new(tracker)),
        );
        let error = client
            .get(
                Service::Packages,
                "/travel-packages",
                RequestConfig::new().should_report(false),
            )
            .await
            .unwrap_err();
        assert_eq!(error.status(), Some(503));
    }
}
