//! Safe execution and retry helpers.

use super::{ErrorCategory, ErrorInput, ErrorReporter};
use crate::consts::client_consts::retry::MAX_JITTER_MS;
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Delay before the retry that follows `attempt` (zero-based): `initial * 2^attempt` plus jitter.
pub fn backoff_delay(initial_delay: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    let jitter = rand::thread_rng().gen_range(0..=MAX_JITTER_MS);
    initial_delay.saturating_mul(factor) + Duration::from_millis(jitter)
}

impl ErrorReporter {
    /// Awaits `future`, logging and substituting `fallback` on error.
    pub async fn try_catch<T, E, Fut>(
        &self,
        future: Fut,
        fallback: T,
        context: &str,
        category: ErrorCategory,
    ) -> T
    where
        Fut: Future<Output = Result<T, E>>,
        for<'a> &'a E: Into<ErrorInput>,
    {
        match future.await {
            Ok(value) => value,
            Err(e) => {
                self.log_error(&e, context, true, category);
                fallback
            }
        }
    }

    /// Synchronous counterpart of [`ErrorReporter::try_catch`].
    pub fn try_catch_sync<T, E, F>(
        &self,
        operation: F,
        fallback: T,
        context: &str,
        category: ErrorCategory,
    ) -> T
    where
        F: FnOnce() -> Result<T, E>,
        for<'a> &'a E: Into<ErrorInput>,
    {
        match operation() {
            Ok(value) => value,
            Err(e) => {
                self.log_error(&e, context, true, category);
                fallback
            }
        }
    }

    /// Runs `operation` up to `max_retries + 1` times with exponential backoff.
    ///
    /// Returns the first success. After the final failure the error is logged as
    /// [`ErrorCategory::Network`] and returned.
    pub async fn retry_with_backoff<T, E, F, Fut>(
        &self,
        operation: F,
        max_retries: u32,
        initial_delay: Duration,
        context: &str,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        for<'a> &'a E: Into<ErrorInput>,
    {
        self.retry_with_backoff_if(operation, |_| true, max_retries, initial_delay, context)
            .await
    }

    /// Like [`ErrorReporter::retry_with_backoff`], but gives up at once when
    /// `retryable` rejects an error. Such errors are returned without further logging.
    pub async fn retry_with_backoff_if<T, E, F, Fut, P>(
        &self,
        mut operation: F,
        retryable: P,
        max_retries: u32,
        initial_delay: Duration,
        context: &str,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
        for<'a> &'a E: Into<ErrorInput>,
    {
        let mut attempt: u32 = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !retryable(&e) => return Err(e),
                Err(e) => {
                    log::warn!(
                        "{}: attempt {}/{} failed: {}",
                        context,
                        attempt.saturating_add(1),
                        max_retries.saturating_add(1),
                        e
                    );

                    if attempt >= max_retries {
                        self.log_error(
                            &e,
                            &format!("{} (after {} retries)", context, max_retries),
                            true,
                            ErrorCategory::Network,
                        );
                        return Err(e);
                    }

                    tokio::time::sleep(backoff_delay(initial_delay, attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}
