use super::read_with_retry;
use crate::config::Service;
use crate::network::{ApiClient, ClientError, RequestConfig};
use serde_json::Value;

/// All published wanderlists.
pub async fn list(client: &ApiClient) -> Result<Value, ClientError> {
    read_with_retry(client, "list wanderlists", || {
        client.get_json(
            Service::Wanderlist,
            "/wanderlists",
            RequestConfig::new().should_report(false),
        )
    })
    .await
}

pub async fn get(client: &ApiClient, slug: &str) -> Result<Value, ClientError> {
    let path = format!("/wanderlists/{}", urlencoding::encode(slug));
    read_with_retry(client, "get wanderlist", || {
        client.get_json(
            Service::Wanderlist,
            &path,
            RequestConfig::new().should_report(false),
        )
    })
    .await
}
