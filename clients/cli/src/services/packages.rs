use super::read_with_retry;
use crate::config::Service;
use crate::network::{ApiClient, ClientError, RequestConfig};
use serde_json::Value;

/// One page of the travel packages catalogue.
pub async fn list(client: &ApiClient, page: u32, limit: u32) -> Result<Value, ClientError> {
    read_with_retry(client, "list travel packages", || {
        client.get_json(
            Service::Packages,
            "/travel-packages",
            RequestConfig::new()
                .param("page", page)
                .param("limit", limit)
                .should_report(false),
        )
    })
    .await
}

pub async fn get(client: &ApiClient, id: &str) -> Result<Value, ClientError> {
    let path = format!("/travel-packages/{}", urlencoding::encode(id));
    read_with_retry(client, "get travel package", || {
        client.get_json(
            Service::Packages,
            &path,
            RequestConfig::new().should_report(false),
        )
    })
    .await
}
