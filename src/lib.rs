//! `queryme-http` is an async client for the QueryMe assistant back end.
//!
//! The core is [`ResilientClient::send`], which bounds each attempt with a
//! timeout and retries transient failures with backoff. Built on top of it:
//! - [`AssistantClient::text_query`] for the chat endpoint
//! - [`chat::ChatSession`] for chat screen state
//! - [`registration::RegistrationFlow`] for the name/mobile/OTP sign-up
//! - [`store::KeyValueStore`] for the local login flag

pub mod assistant;
pub mod chat;
mod client;
pub mod endpoint;
mod error;
mod options;
pub mod registration;
mod request;
mod sleep;
pub mod store;
mod wire;

pub use assistant::AssistantClient;
pub use client::ResilientClient;
pub use error::{ErrorKind, QueryMeError};
pub use options::ClientOptions;
pub use request::{default_headers, RequestOptions, Response, USER_AGENT};
pub use sleep::{Sleeper, TokioSleeper};

pub type Result<T> = std::result::Result<T, QueryMeError>;
