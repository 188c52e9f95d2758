use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use rand::{rngs::OsRng, Rng};
use regex::Regex;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            LoginRequest, LoginResponse, MessageResponse, SendVerificationRequest,
            SignUpRequest, SignUpResponse, VerificationChannel, VerifyCodeRequest,
            VerifyCodeResponse,
        },
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{User, Verification},
    },
    error::AppError,
    state::AppState,
};

const CODE_TTL_MINUTES: i64 = 3;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/send-verification", post(send_verification))
        .route("/auth/verify-code", post(verify_code))
        .route("/auth/signup", post(sign_up))
        .route("/auth/login", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^01[0-9]{8,9}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

/// Six-digit code drawn from the OS entropy source.
fn generate_code() -> String {
    OsRng.gen_range(100_000..1_000_000).to_string()
}

/// Canonical form of a recipient. Email addresses are trimmed and lowercased
/// everywhere they enter the system, so the proof token always carries the
/// same string signup compares against. Phone numbers are only trimmed.
fn canonical_recipient(channel: VerificationChannel, raw: &str) -> String {
    let trimmed = raw.trim();
    match channel {
        VerificationChannel::Email => trimmed.to_lowercase(),
        VerificationChannel::Sms => trimmed.to_string(),
    }
}

/// Both proofs must verify and be bound to the exact recipient/channel
/// supplied at signup. One uniform error for every failure mode.
fn check_signup_proofs(
    keys: &JwtKeys,
    email: &str,
    phone_number: &str,
    email_token: &str,
    phone_token: &str,
) -> Result<(), AppError> {
    let unauthorized = || AppError::Unauthorized("Valid verification token is required.".into());

    let email_proof = keys.verify_proof(email_token).map_err(|_| unauthorized())?;
    let phone_proof = keys.verify_proof(phone_token).map_err(|_| unauthorized())?;

    if email_proof.recipient != email
        || email_proof.channel != VerificationChannel::Email
        || phone_proof.recipient != phone_number
        || phone_proof.channel != VerificationChannel::Sms
    {
        return Err(unauthorized());
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn send_verification(
    State(state): State<AppState>,
    Json(payload): Json<SendVerificationRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let recipient = canonical_recipient(payload.channel, &payload.recipient);
    let valid = match payload.channel {
        VerificationChannel::Email => is_valid_email(&recipient),
        VerificationChannel::Sms => is_valid_phone(&recipient),
    };
    if !valid {
        warn!(channel = payload.channel.as_str(), "invalid recipient format");
        return Err(AppError::Validation("Invalid recipient format.".into()));
    }

    let code = generate_code();
    let expires_at = OffsetDateTime::now_utc() + TimeDuration::minutes(CODE_TTL_MINUTES);

    // Only one live challenge per (channel, recipient).
    Verification::delete_for_recipient(&state.db, payload.channel, &recipient).await?;
    Verification::insert(&state.db, payload.channel, &recipient, &code, expires_at).await?;

    if let Err(e) = state
        .delivery
        .send_code(payload.channel, &recipient, &code)
        .await
    {
        // Delivery is best-effort; the user can request another code.
        warn!(error = %e, "verification code delivery failed");
    }

    Ok(Json(MessageResponse {
        message: "Verification code sent successfully.".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_code(
    State(state): State<AppState>,
    Json(payload): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, AppError> {
    // One uniform error regardless of whether the code is wrong or expired,
    // to avoid leaking guessing feedback.
    let invalid = || AppError::Unauthorized("Invalid or expired verification code.".into());

    let recipient = canonical_recipient(payload.channel, &payload.recipient);
    let verification =
        Verification::find_by_code(&state.db, payload.channel, &recipient, &payload.code)
            .await?
            .ok_or_else(invalid)?;

    if OffsetDateTime::now_utc() > verification.expires_at {
        Verification::delete_by_id(&state.db, verification.id).await?;
        return Err(invalid());
    }

    // Single use.
    Verification::delete_by_id(&state.db, verification.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let verification_token = keys.sign_proof(payload.channel, &recipient)?;

    Ok(Json(VerifyCodeResponse {
        message: "Verification successful.".into(),
        verification_token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(mut payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), AppError> {
    payload.email = canonical_recipient(VerificationChannel::Email, &payload.email);
    payload.phone_number = canonical_recipient(VerificationChannel::Sms, &payload.phone_number);

    if !payload.terms_agreement {
        return Err(AppError::Validation(
            "Agreement to the terms and privacy policy is required.".into(),
        ));
    }
    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        return Err(AppError::Validation("Password too short".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    check_signup_proofs(
        &keys,
        &payload.email,
        &payload.phone_number,
        &payload.email_verification_token,
        &payload.phone_verification_token,
    )?;

    if User::find_by_email_or_phone(&state.db, &payload.email, &payload.phone_number)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "signup conflict");
        return Err(AppError::Conflict(
            "User with this email or phone number already exists.".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &payload.email,
        &hash,
        &payload.phone_number,
        payload.marketing_agreement,
    )
    .await?;

    let access_token = keys.sign_access(user.id, &user.email)?;

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            message: "User successfully created.".into(),
            access_token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    // Same error whether the email is unknown or the password is wrong.
    let invalid = || AppError::Unauthorized("Invalid credentials.".into());

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id, &user.email)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse { access_token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.io"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("spaces in@mail.com"));
    }

    #[test]
    fn phone_validation_accepts_domestic_numbers() {
        assert!(is_valid_phone("01012345678"));
        assert!(is_valid_phone("0161234567"));
        assert!(!is_valid_phone("021234567"));
        assert!(!is_valid_phone("010-1234-5678"));
        assert!(!is_valid_phone("010123456789"));
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn canonical_recipient_lowercases_email_only() {
        assert_eq!(
            canonical_recipient(VerificationChannel::Email, "  User@Example.Com "),
            "user@example.com"
        );
        assert_eq!(
            canonical_recipient(VerificationChannel::Sms, " 01012345678 "),
            "01012345678"
        );
    }

    fn make_keys() -> JwtKeys {
        JwtKeys::new(&crate::config::JwtConfig {
            secret: "test".into(),
            access_ttl_days: 7,
            proof_ttl_minutes: 10,
        })
    }

    #[test]
    fn signup_accepts_proofs_issued_for_a_mixed_case_email() {
        let keys = make_keys();
        // verify_code signs proofs for the canonical recipient, however the
        // user typed the address. Signup must accept them for the same input.
        let supplied = "User@Example.com";
        let email_token = keys
            .sign_proof(
                VerificationChannel::Email,
                &canonical_recipient(VerificationChannel::Email, supplied),
            )
            .expect("sign email proof");
        let phone_token = keys
            .sign_proof(VerificationChannel::Sms, "01012345678")
            .expect("sign phone proof");

        let email = canonical_recipient(VerificationChannel::Email, supplied);
        assert!(check_signup_proofs(
            &keys,
            &email,
            "01012345678",
            &email_token,
            &phone_token
        )
        .is_ok());
    }

    #[test]
    fn signup_rejects_proofs_bound_to_another_recipient() {
        let keys = make_keys();
        let email_token = keys
            .sign_proof(VerificationChannel::Email, "other@example.com")
            .expect("sign email proof");
        let phone_token = keys
            .sign_proof(VerificationChannel::Sms, "01012345678")
            .expect("sign phone proof");

        let err = check_signup_proofs(
            &keys,
            "user@example.com",
            "01012345678",
            &email_token,
            &phone_token,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn signup_rejects_swapped_channel_proofs() {
        let keys = make_keys();
        // An SMS proof presented as the email proof must not pass, even with
        // matching recipient strings.
        let email_token = keys
            .sign_proof(VerificationChannel::Sms, "user@example.com")
            .expect("sign proof");
        let phone_token = keys
            .sign_proof(VerificationChannel::Sms, "01012345678")
            .expect("sign phone proof");

        let err = check_signup_proofs(
            &keys,
            "user@example.com",
            "01012345678",
            &email_token,
            &phone_token,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
