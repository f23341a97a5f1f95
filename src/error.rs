/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum QueryMeError {
    /// The per-attempt timer fired and the in-flight request was aborted.
    #[error("request aborted after {timeout_ms} ms timeout")]
    Timeout {
        timeout_ms: u64,
        #[source]
        source: reqwest::Error,
    },
    /// The transport could not complete the exchange with the host.
    #[error("network error: {0}")]
    Network(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("HTTP {status}: {status_text}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },
    /// The request could not be built (empty URL, zero timeout, bad header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// User input rejected before any request was made.
    #[error("{0}")]
    Validation(String),
    #[error("configuration error: {0}")]
    Config(String),
    /// Key-value store read or write failure.
    #[error("store error: {0}")]
    Store(String),
}

/// Coarse classification of a [`QueryMeError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Timeout,
    Network,
    /// 4xx other than 429.
    ClientError,
    /// 429 Too Many Requests.
    RateLimited,
    /// 5xx, or any other non-success status outside 4xx.
    ServerError,
    InvalidRequest,
    Decode,
    Validation,
    Config,
    Store,
}

impl QueryMeError {
    pub(crate) fn http(status: reqwest::StatusCode, body: String) -> Self {
        Self::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            body,
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                timeout_ms,
                source: err,
            }
        } else {
            Self::Network(err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Network(_) => ErrorKind::Network,
            Self::Http { status, .. } => match *status {
                429 => ErrorKind::RateLimited,
                400..=499 => ErrorKind::ClientError,
                _ => ErrorKind::ServerError,
            },
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Config(_) => ErrorKind::Config,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// HTTP status of the failing response, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Timeout | ErrorKind::Network | ErrorKind::RateLimited | ErrorKind::ServerError
        )
    }
}
