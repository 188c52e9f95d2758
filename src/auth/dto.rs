use serde::{Deserialize, Serialize};

/// Delivery channel for a verification challenge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationChannel {
    Email,
    Sms,
}

impl VerificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationChannel::Email => "EMAIL",
            VerificationChannel::Sms => "SMS",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendVerificationRequest {
    pub channel: VerificationChannel,
    pub recipient: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub channel: VerificationChannel,
    pub recipient: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub email_verification_token: String,
    pub phone_verification_token: String,
    pub terms_agreement: bool,
    #[serde(default)]
    pub marketing_agreement: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeResponse {
    pub message: String,
    pub verification_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub message: String,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}
