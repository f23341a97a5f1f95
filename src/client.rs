use std::fmt;
use std::time::Duration;
#[cfg(feature = "tracing")]
use std::time::Instant;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::{
    ClientOptions, QueryMeError, RequestOptions, Response, Result, Sleeper, TokioSleeper,
};

/// Upper bound on the backoff exponent; `1000 * 2^16` ms is already ~18 hours.
const MAX_BACKOFF_EXP: usize = 16;

/// Outcome of a single attempt within one [`ResilientClient::send`] call.
#[derive(Debug)]
enum Attempt {
    Success(Response),
    Retryable(QueryMeError),
    Terminal(QueryMeError),
}

/// HTTP client that bounds every attempt with a timeout and retries
/// transient failures with backoff.
///
/// Retry policy for one call with budget `max_retries`:
/// - 2xx returns immediately.
/// - 429 waits `rate_limit_backoff_ms * (attempt + 1)` and retries.
/// - other 4xx fails at once, whatever budget remains.
/// - 5xx, timeouts and transport errors wait `retry_backoff_ms * 2^attempt`
///   and retry.
///
/// When the budget is spent the last failure is returned.
#[derive(Clone)]
pub struct ResilientClient<S = TokioSleeper> {
    http: reqwest::Client,
    sleeper: S,
    options: ClientOptions,
}

impl<S> fmt::Debug for ResilientClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for ResilientClient<TokioSleeper> {
    fn default() -> Self {
        Self::new()
    }
}

impl ResilientClient<TokioSleeper> {
    pub fn new() -> Self {
        Self::with_http(reqwest::Client::new())
    }

    /// Wraps an existing `reqwest::Client`, sharing its connection pool.
    pub fn with_http(http: reqwest::Client) -> Self {
        Self {
            http,
            sleeper: TokioSleeper,
            options: ClientOptions::default(),
        }
    }
}

impl<S: Sleeper> ResilientClient<S> {
    /// Replaces the source of backoff delays.
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> ResilientClient<T> {
        ResilientClient {
            http: self.http,
            sleeper,
            options: self.options,
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Sends with the timeout and retry budget from [`ClientOptions`].
    pub async fn execute(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.send(url, options, self.options.timeout_ms, self.options.max_retries)
            .await
    }

    /// Sends one logical request, making at most `max_retries + 1` attempts.
    ///
    /// `timeout_ms` bounds each attempt separately, from connecting until the
    /// response body is fully read. Only a 2xx response is returned as `Ok`.
    pub async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
        timeout_ms: u64,
        max_retries: usize,
    ) -> Result<Response> {
        if url.trim().is_empty() {
            return Err(QueryMeError::InvalidRequest("url must not be empty".to_owned()));
        }
        if timeout_ms == 0 {
            return Err(QueryMeError::InvalidRequest(
                "timeout must be at least 1 ms".to_owned(),
            ));
        }

        let headers = options.merged_headers();
        let mut attempt = 0usize;
        loop {
            let err = match self
                .attempt(url, options, &headers, timeout_ms, attempt, max_retries)
                .await
            {
                Attempt::Success(response) => return Ok(response),
                Attempt::Terminal(err) => return Err(err),
                Attempt::Retryable(err) => err,
            };

            if attempt >= max_retries {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    url,
                    attempts = attempt + 1,
                    error = %err,
                    "all attempts failed"
                );
                return Err(err);
            }

            let delay = self.retry_delay(&err, attempt);

            #[cfg(feature = "tracing")]
            tracing::debug!(
                url,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying request after backoff"
            );

            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(
        &self,
        url: &str,
        options: &RequestOptions,
        headers: &HeaderMap,
        timeout_ms: u64,
        attempt: usize,
        max_retries: usize,
    ) -> Attempt {
        #[cfg(feature = "tracing")]
        let started = Instant::now();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            url,
            method = %options.method,
            attempt = attempt + 1,
            attempts = max_retries + 1,
            "sending request"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (attempt, max_retries);

        // reqwest arms a fresh timer for this request only; firing it drops
        // the in-flight connection and surfaces as a timeout error.
        let mut request = self
            .http
            .request(options.method.clone(), url)
            .headers(headers.clone())
            .timeout(Duration::from_millis(timeout_ms));
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let result = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        }
        .await;

        match result {
            Ok((status, body)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    url,
                    attempt = attempt + 1,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    status = status.as_u16(),
                    "response received"
                );

                if status.is_success() {
                    return Attempt::Success(Response::new(status, body));
                }
                let err = QueryMeError::http(status, body);
                if should_retry_status(status) {
                    Attempt::Retryable(err)
                } else {
                    Attempt::Terminal(err)
                }
            }
            Err(err) if err.is_builder() => {
                Attempt::Terminal(QueryMeError::InvalidRequest(err.to_string()))
            }
            Err(err) => {
                let err = QueryMeError::from_transport(err, timeout_ms);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    url,
                    attempt = attempt + 1,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    kind = ?err.kind(),
                    error = %err,
                    "attempt failed without a response"
                );

                Attempt::Retryable(err)
            }
        }
    }

    fn retry_delay(&self, err: &QueryMeError, attempt: usize) -> Duration {
        if err.status() == Some(StatusCode::TOO_MANY_REQUESTS.as_u16()) {
            rate_limit_delay(self.options.rate_limit_backoff_ms, attempt)
        } else {
            backoff_delay(self.options.retry_backoff_ms, attempt)
        }
    }
}

/// 4xx is final except for 429; everything else that is not 2xx is retried.
fn should_retry_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || !status.is_client_error()
}

/// Exponential backoff: `base`, `2 * base`, `4 * base`, ...
fn backoff_delay(base_ms: u64, attempt: usize) -> Duration {
    let multiplier = 1u64 << attempt.min(MAX_BACKOFF_EXP);
    Duration::from_millis(base_ms.saturating_mul(multiplier))
}

/// Linear backoff used after a 429: `step`, `2 * step`, `3 * step`, ...
fn rate_limit_delay(step_ms: u64, attempt: usize) -> Duration {
    let factor = u64::try_from(attempt).unwrap_or(u64::MAX).saturating_add(1);
    Duration::from_millis(step_ms.saturating_mul(factor))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;

    use super::{backoff_delay, rate_limit_delay, should_retry_status, ResilientClient};
    use crate::{ErrorKind, RequestOptions};

    #[test]
    fn backoff_doubles_per_attempt() {
        let delays: Vec<_> = (0..4).map(|attempt| backoff_delay(1_000, attempt)).collect();
        assert_eq!(
            delays,
            [1_000, 2_000, 4_000, 8_000].map(Duration::from_millis)
        );
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        assert_eq!(backoff_delay(u64::MAX, 3), Duration::from_millis(u64::MAX));
        assert_eq!(backoff_delay(1, 200), backoff_delay(1, 16));
    }

    #[test]
    fn rate_limit_backoff_is_linear() {
        assert_eq!(rate_limit_delay(1_000, 0), Duration::from_secs(1));
        assert_eq!(rate_limit_delay(1_000, 1), Duration::from_secs(2));
        assert_eq!(rate_limit_delay(1_000, 2), Duration::from_secs(3));
    }

    #[test]
    fn only_429_is_retried_among_client_errors() {
        assert!(should_retry_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(should_retry_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!should_retry_status(StatusCode::NOT_FOUND));
        assert!(!should_retry_status(StatusCode::UNAUTHORIZED));
        assert!(!should_retry_status(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[tokio::test]
    async fn empty_url_is_rejected_before_any_attempt() {
        let err = ResilientClient::new()
            .send("  ", &RequestOptions::get(), 1_000, 3)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn zero_timeout_is_rejected() {
        let err = ResilientClient::new()
            .send("http://127.0.0.1:9/", &RequestOptions::get(), 0, 0)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn malformed_url_is_not_retried() {
        let err = ResilientClient::new()
            .send("not a url", &RequestOptions::get(), 1_000, 5)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn debug_shows_options() {
        let debug = format!("{:?}", ResilientClient::new());
        assert!(debug.contains("timeout_ms: 30000"));
    }
}
