use crate::{
    endpoint::{api_url_from_env, join_url},
    wire::{TextQuery, TextReply},
    ClientOptions, QueryMeError, RequestOptions, ResilientClient, Result, Sleeper, TokioSleeper,
};

pub const TEXT_QUERY_PATH: &str = "/text_query";

/// Reply used when the assistant answers without a `reply` field.
pub const DEFAULT_REPLY: &str = "Sorry, I couldn't find an answer.";

/// Client for the assistant's free-text query endpoint.
#[derive(Clone, Debug)]
pub struct AssistantClient<S = TokioSleeper> {
    http: ResilientClient<S>,
    query_url: String,
}

impl AssistantClient<TokioSleeper> {
    /// Creates a client for the back end at `base_url`.
    ///
    /// Uses a 30 second per-attempt timeout and 2 retries.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self::with_client(base_url, ResilientClient::new())
    }

    /// Creates a client from `QUERYME_API_URL` / `QUERYME_ENV`.
    ///
    /// See [`api_url_from_env`](crate::endpoint::api_url_from_env).
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(api_url_from_env()?))
    }
}

impl<S: Sleeper> AssistantClient<S> {
    /// Uses an existing resilient client, including its options and sleeper.
    pub fn with_client(base_url: impl AsRef<str>, http: ResilientClient<S>) -> Self {
        Self {
            http,
            query_url: join_url(base_url.as_ref(), TEXT_QUERY_PATH),
        }
    }

    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.http = self.http.with_options(opts);
        self
    }

    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> AssistantClient<T> {
        AssistantClient {
            http: self.http.with_sleeper(sleeper),
            query_url: self.query_url,
        }
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    /// Sends `text` to the assistant and returns its markdown reply.
    pub async fn text_query(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(QueryMeError::Validation(
                "query text must not be empty".to_owned(),
            ));
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            url = %self.query_url,
            message_len = text.len(),
            "sending text query"
        );

        let request = RequestOptions::post_json(&TextQuery { text_input: text })?;
        let response = self.http.execute(&self.query_url, &request).await?;
        let reply: TextReply = response.json()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(has_reply = reply.reply.is_some(), "text query answered");

        Ok(reply.reply.unwrap_or_else(|| DEFAULT_REPLY.to_owned()))
    }
}
