//! Name / mobile / OTP registration that unlocks the chat screen.

use std::sync::Arc;

use crate::{
    endpoint::join_url,
    store::{KeyValueStore, LOGIN_STATUS_KEY, LOGIN_SUCCESS},
    wire::{RegisterUser, ServerMessage, ValidateOtp},
    QueryMeError, RequestOptions, ResilientClient, Result, Sleeper, TokioSleeper,
};

pub const REGISTER_PATH: &str = "/register-user/";
pub const VALIDATE_OTP_PATH: &str = "/validate-otp/";
pub const SOCIETIES: &[&str] = &["Smondoville"];
pub const OTP_LEN: usize = 6;

const INCOMPLETE_FORM: &str = "Please fill all fields and accept terms.";
const MISSING_OTP: &str = "Please enter your OTP";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegistrationForm {
    pub name: String,
    pub mobile: String,
    pub society: String,
    pub accepted_terms: bool,
}

impl RegistrationForm {
    fn validate(&self) -> Result<()> {
        let filled = !self.name.trim().is_empty() && !self.mobile.trim().is_empty();
        let mobile_ok = self.mobile.trim().chars().all(|c| c.is_ascii_digit());
        let society_ok = SOCIETIES.contains(&self.society.as_str());
        if filled && mobile_ok && society_ok && self.accepted_terms {
            Ok(())
        } else {
            Err(QueryMeError::Validation(INCOMPLETE_FORM.to_owned()))
        }
    }
}

/// Answer from a registration endpoint, with the body's optional `message`.
enum ServerReply {
    Accepted(Option<String>),
    /// Any non-2xx status.
    Refused(Option<String>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistrationState {
    Form,
    /// OTP requested; waiting for the user to enter it.
    OtpPending,
    Verified,
}

/// Drives the registration screen: form submission, then OTP verification.
///
/// Requests are made with no retries, since a repeated submission would
/// issue another OTP.
pub struct RegistrationFlow<S = TokioSleeper> {
    http: ResilientClient<S>,
    base_url: String,
    store: Arc<dyn KeyValueStore>,
    state: RegistrationState,
    otp_rejected: bool,
}

impl RegistrationFlow<TokioSleeper> {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_client(base_url, store, ResilientClient::new())
    }
}

impl<S: Sleeper> RegistrationFlow<S> {
    pub fn with_client(
        base_url: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        http: ResilientClient<S>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            store,
            state: RegistrationState::Form,
            otp_rejected: false,
        }
    }

    pub fn state(&self) -> RegistrationState {
        self.state
    }

    /// True after the server refused the last OTP entered.
    pub fn otp_rejected(&self) -> bool {
        self.otp_rejected
    }

    /// Submits the form and requests an OTP.
    ///
    /// On success the flow moves to [`RegistrationState::OtpPending`]. A
    /// server refusal is returned as [`QueryMeError::Validation`] carrying the
    /// server's message, and the flow stays on the form.
    pub async fn submit(&mut self, form: &RegistrationForm) -> Result<()> {
        if self.state != RegistrationState::Form {
            return Err(QueryMeError::Validation(
                "registration form already submitted".to_owned(),
            ));
        }
        form.validate()?;

        let payload = RegisterUser {
            mobilenumber: form.mobile.trim(),
            name: form.name.trim(),
            society: &form.society,
            otp: "",
            tnc: form.accepted_terms,
        };
        match self.post(REGISTER_PATH, &payload).await? {
            ServerReply::Accepted(_) => {
                #[cfg(feature = "tracing")]
                tracing::info!("OTP requested");
                self.state = RegistrationState::OtpPending;
                Ok(())
            }
            ServerReply::Refused(message) => Err(QueryMeError::Validation(
                message.unwrap_or_else(|| "Something went wrong.".to_owned()),
            )),
        }
    }

    /// Verifies the OTP and records the login flag.
    ///
    /// Returns the server's confirmation message. A wrong OTP leaves the flow
    /// in [`RegistrationState::OtpPending`] with [`otp_rejected`](Self::otp_rejected) set.
    pub async fn verify(&mut self, otp: &str) -> Result<String> {
        if self.state != RegistrationState::OtpPending {
            return Err(QueryMeError::Validation("no OTP has been requested".to_owned()));
        }
        let otp = otp.trim();
        if otp.len() != OTP_LEN || !otp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QueryMeError::Validation(MISSING_OTP.to_owned()));
        }

        match self.post(VALIDATE_OTP_PATH, &ValidateOtp { otp }).await? {
            ServerReply::Accepted(message) => {
                self.store.set(LOGIN_STATUS_KEY, LOGIN_SUCCESS)?;
                self.otp_rejected = false;
                self.state = RegistrationState::Verified;
                #[cfg(feature = "tracing")]
                tracing::info!("OTP verified");
                Ok(message.unwrap_or_else(|| "OTP Verified!".to_owned()))
            }
            ServerReply::Refused(message) => {
                self.otp_rejected = true;
                Err(QueryMeError::Validation(
                    message.unwrap_or_else(|| "Incorrect OTP".to_owned()),
                ))
            }
        }
    }

    async fn post<T: serde::Serialize>(&self, path: &str, payload: &T) -> Result<ServerReply> {
        let url = join_url(&self.base_url, path);
        let request = RequestOptions::post_json(payload)?;
        let timeout_ms = self.http.options().timeout_ms;

        match self.http.send(&url, &request, timeout_ms, 0).await {
            Ok(response) => Ok(ServerReply::Accepted(
                ServerMessage::parse(response.text()).message,
            )),
            Err(QueryMeError::Http { body, .. }) => {
                Ok(ServerReply::Refused(ServerMessage::parse(&body).message))
            }
            Err(err) => Err(err),
        }
    }
}
