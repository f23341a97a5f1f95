//! Chat screen state: the landing prompt, the message list and the mapping
//! of request failures to text shown in the conversation.

use crate::{
    store::{is_logged_in, KeyValueStore, LOGIN_STATUS_KEY},
    AssistantClient, ErrorKind, QueryMeError, Result, Sleeper, TokioSleeper,
};

const RETRIED_SUFFIX: &str = " [Automatically retried, but still failed]";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChatPhase {
    /// Centered prompt, nothing sent yet.
    Landing,
    Chatting,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    /// Plain text for user messages, markdown for assistant messages.
    pub content: String,
}

#[derive(Debug)]
pub struct ChatSession<S = TokioSleeper> {
    assistant: AssistantClient<S>,
    phase: ChatPhase,
    messages: Vec<Message>,
    in_flight: bool,
    next_id: u64,
}

impl<S: Sleeper> ChatSession<S> {
    pub fn new(assistant: AssistantClient<S>) -> Self {
        Self {
            assistant,
            phase: ChatPhase::Landing,
            messages: Vec::new(),
            in_flight: false,
            next_id: 1,
        }
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a query is awaiting its reply.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Sends `input` and appends both sides of the exchange.
    ///
    /// Blank input is ignored and returns `None`. A failed query is not an
    /// error here: it becomes an assistant message built by [`error_text`].
    /// If the future is dropped before completion, the user message stays
    /// without a reply and the session is no longer in flight.
    pub async fn send_message(&mut self, input: &str) -> Option<&Message> {
        if input.trim().is_empty() {
            return None;
        }

        self.phase = ChatPhase::Chatting;
        self.push(Role::User, input.to_owned());

        let result = {
            let _in_flight = InFlight::enter(&mut self.in_flight);
            self.assistant.text_query(input).await
        };
        let content = match result {
            Ok(reply) => reply,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::error!(kind = ?err.kind(), status = ?err.status(), error = %err, "chat query failed");
                error_text(&err)
            }
        };

        self.push(Role::Assistant, content);
        self.messages.last()
    }

    fn push(&mut self, role: Role, content: String) {
        self.messages.push(Message {
            id: self.next_id,
            role,
            content,
        });
        self.next_id += 1;
    }
}

/// Holds the in-flight flag set until dropped, including on cancellation.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Whether the stored login flag allows entering the chat screen.
pub fn check_access(store: &dyn KeyValueStore) -> bool {
    match is_logged_in(store) {
        Ok(logged_in) => logged_in,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %_err, "reading login status failed");
            false
        }
    }
}

/// Clears the login flag; the next [`check_access`] returns `false`.
pub fn logout(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(LOGIN_STATUS_KEY)
}

/// User-facing text for a failed chat query.
pub fn error_text(err: &QueryMeError) -> String {
    let mut text = String::from("❌ ");
    match (err.kind(), err.status()) {
        (ErrorKind::Timeout, _) => text.push_str(
            "Request timeout - The server took too long to respond. Please check your connection or try again.",
        ),
        (ErrorKind::Network, _) => text.push_str(
            "Network error - Unable to reach the server. Please check your internet connection.",
        ),
        (_, Some(500..=509)) => {
            text.push_str("Server error - The server is having issues. Please try again in a moment.")
        }
        (_, Some(400..=409)) => {
            text.push_str("Request error - There was an issue with your request. Please try again.")
        }
        (_, Some(_)) => text.push_str(&format!("Server error: {err}")),
        _ => text.push_str(&err.to_string()),
    }
    if matches!(err.kind(), ErrorKind::Timeout | ErrorKind::Network) {
        text.push_str(RETRIED_SUFFIX);
    }
    text
}
