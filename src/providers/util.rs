use crate::core::error::CountryError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub const RETRY_DELAY_MS: u64 = 500;

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error from the last attempt
pub async fn with_retry<F, Fut, T, E>(mut operation: F, retries: usize, delay_ms: u64) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

pub fn http_client(timeout: Duration, provider: &str) -> Result<reqwest::Client, CountryError> {
    reqwest::Client::builder()
        .user_agent(concat!("countryfx/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| CountryError::unavailable(provider, e))
}

/// GETs `url` and returns the body. Transport errors and non-success statuses are retried.
pub async fn fetch_body(
    client: &reqwest::Client,
    url: &str,
    retries: usize,
    delay_ms: u64,
    provider: &str,
) -> Result<String, CountryError> {
    debug!("Requesting {} data from {}", provider, url);
    let response = with_retry(
        || {
            let request = client.get(url);
            async move { request.send().await?.error_for_status() }
        },
        retries,
        delay_ms,
    )
    .await
    .map_err(|e| match e.status() {
        Some(status) => CountryError::unavailable(provider, format!("HTTP error: {status}")),
        None => CountryError::unavailable(provider, format!("Request error: {e}")),
    })?;

    response
        .text()
        .await
        .map_err(|e| CountryError::unavailable(provider, format!("Failed to read response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_with_retry_succeeds_after_failures() {
        let calls = AtomicUsize::new(0);
        let result: Result<usize, String> = with_retry(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(format!("failure {n}"))
                    } else {
                        Ok(n)
                    }
                }
            },
            2,
            0,
        )
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), String> = with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("down".to_string()) }
            },
            1,
            0,
        )
        .await;

        assert_eq!(result, Err("down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_body_retries_server_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let client = http_client(Duration::from_secs(5), "test").unwrap();
        let url = format!("{}/data", mock_server.uri());
        let body = fetch_body(&client, &url, 1, 0, "test").await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_fetch_body_reports_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = http_client(Duration::from_secs(5), "test").unwrap();
        let url = format!("{}/data", mock_server.uri());
        let err = fetch_body(&client, &url, 0, 0, "test").await.unwrap_err();
        assert_eq!(
            err,
            CountryError::ExternalSourceUnavailable {
                provider: "test".to_string(),
                cause: "HTTP error: 500 Internal Server Error".to_string(),
            }
        );
    }
}
