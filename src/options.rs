/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Base backoff after a server or transport failure (doubles per attempt).
    pub retry_backoff_ms: u64,
    /// Backoff step after a 429 response (grows linearly per attempt).
    pub rate_limit_backoff_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 2,
            retry_backoff_ms: 1_000,
            rate_limit_backoff_ms: 1_000,
        }
    }
}

impl ClientOptions {
    /// Same backoff settings with a different timeout and retry budget.
    pub fn with_budget(mut self, timeout_ms: u64, max_retries: usize) -> Self {
        self.timeout_ms = timeout_ms;
        self.max_retries = max_retries;
        self
    }
}
