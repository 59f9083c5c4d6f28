use crate::config::Service;
use crate::network::{ApiClient, ClientError, RequestConfig, ResponseBody};
use crate::reporting::ErrorCategory;
use serde_json::Value;

/// Submits a trip inquiry. Not retried: a repeated POST would file it twice.
pub async fn submit(client: &ApiClient, inquiry: Value) -> Result<ResponseBody, ClientError> {
    client
        .post(
            Service::Wanderlist,
            "/inquiries",
            RequestConfig::new()
                .body(inquiry)
                .category(ErrorCategory::Validation),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceRegistry;
    use crate::environment::Environment;
    use crate::network::transport::MockTransport;
    use crate::network::{HttpResponse, NoCredentials};
    use crate::reporting::ErrorReporter;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_submit_posts_json_once_even_on_failure() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.method == Method::POST
                    && request.url == "http://w.test/api/inquiries"
                    && request.body.is_some()
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::json(503, &json!({"message": "try later"}))));

        let client = ApiClient::new(
            ServiceRegistry::new("http://w.test/api", "http://p.test/api", "http://app.test")
                .unwrap(),
            Arc::new(transport),
            Arc::new(NoCredentials),
            ErrorReporter::new(Environment::Development),
        );
        let error = submit(&client, json!({"name": "Asha", "destination": "Spiti"}))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "try later");
    }
}
