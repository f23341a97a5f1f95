use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct TextQuery<'a> {
    pub text_input: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TextReply {
    #[serde(default)]
    pub reply: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterUser<'a> {
    pub mobilenumber: &'a str,
    pub name: &'a str,
    pub society: &'a str,
    pub otp: &'a str,
    pub tnc: bool,
}

#[derive(Debug, Serialize)]
pub struct ValidateOtp<'a> {
    pub otp: &'a str,
}

/// Body shape used by the registration endpoints for both success and error.
#[derive(Debug, Default, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub message: Option<String>,
}

impl ServerMessage {
    /// Parses a message body leniently; a non-JSON body yields no message.
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}
