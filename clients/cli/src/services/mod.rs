//! Service functions
//!
//! The calls the application's pages make. Payloads stay as raw JSON; only the
//! request shape lives here.

use crate::consts::client_consts::retry;
use crate::network::{ApiClient, ClientError};
use std::future::Future;

pub mod inquiries;
pub mod packages;
pub mod wanderlist;

/// Runs a read with backoff, retrying only errors the handler considers transient.
///
/// Attempts are expected to run with `should_report(false)`. The final failure is
/// reported once: by the retry loop when retries ran out, here otherwise.
pub(crate) async fn read_with_retry<T, F, Fut>(
    client: &ApiClient,
    context: &str,
    operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let handler = client.error_handler();
    let result = client
        .reporter()
        .retry_with_backoff_if(
            operation,
            |e| handler.should_retry(e),
            retry::MAX_RETRIES,
            retry::initial_delay(),
            context,
        )
        .await;

    if let Err(e) = &result {
        if !handler.should_retry(e) {
            client
                .reporter()
                .log_error(e, context, true, handler.categorize(e));
        }
    }
    result
}
