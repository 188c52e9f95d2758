use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    auth::dto::VerificationChannel, config::JwtConfig, error::AppError, state::AppState,
};

/// Token type: long-lived access credential, or short-lived proof that a
/// recipient passed code verification.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Proof,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
    pub kind: TokenKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProofClaims {
    pub recipient: String,
    pub channel: VerificationChannel,
    pub iat: usize,
    pub exp: usize,
    pub kind: TokenKind,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub access_ttl: Duration,
    pub proof_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: Duration::from_secs((config.access_ttl_days as u64) * 24 * 3600),
            proof_ttl: Duration::from_secs((config.proof_ttl_minutes as u64) * 60),
        }
    }

    pub fn sign_access(&self, user_id: Uuid, email: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.access_ttl.as_secs() as i64);
        let claims = AccessClaims {
            sub: user_id,
            email: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            kind: TokenKind::Access,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "access token signed");
        Ok(token)
    }

    pub fn sign_proof(
        &self,
        channel: VerificationChannel,
        recipient: &str,
    ) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.proof_ttl.as_secs() as i64);
        let claims = ProofClaims {
            recipient: recipient.to_string(),
            channel,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            kind: TokenKind::Proof,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(channel = ?channel, "proof token signed");
        Ok(token)
    }

    pub fn verify_access(&self, token: &str) -> anyhow::Result<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.decoding, &Validation::default())?;
        if data.claims.kind != TokenKind::Access {
            anyhow::bail!("not an access token");
        }
        Ok(data.claims)
    }

    pub fn verify_proof(&self, token: &str) -> anyhow::Result<ProofClaims> {
        let data = decode::<ProofClaims>(token, &self.decoding, &Validation::default())?;
        if data.claims.kind != TokenKind::Proof {
            anyhow::bail!("not a proof token");
        }
        Ok(data.claims)
    }
}

/// Extracts and validates the bearer access token, yielding the user id.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        match keys.verify_access(token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(AppError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn make_keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "dev-secret".into(),
            access_ttl_days: 7,
            proof_ttl_minutes: 10,
        })
    }

    #[test]
    fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id, "a@b.com").expect("sign access");
        let claims = keys.verify_access(&token).expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn sign_and_verify_proof_token_binding() {
        let keys = make_keys();
        let token = keys
            .sign_proof(VerificationChannel::Email, "a@b.com")
            .expect("sign proof");
        let claims = keys.verify_proof(&token).expect("verify proof");
        assert_eq!(claims.recipient, "a@b.com");
        assert_eq!(claims.channel, VerificationChannel::Email);
    }

    #[test]
    fn proof_token_is_not_an_access_token() {
        let keys = make_keys();
        let token = keys
            .sign_proof(VerificationChannel::Sms, "01012345678")
            .expect("sign proof");
        assert!(keys.verify_access(&token).is_err());
    }

    #[test]
    fn access_token_is_not_a_proof_token() {
        let keys = make_keys();
        let token = keys
            .sign_access(Uuid::new_v4(), "a@b.com")
            .expect("sign access");
        assert!(keys.verify_proof(&token).is_err());
    }

    #[test]
    fn verify_rejects_token_from_other_secret() {
        let keys = make_keys();
        let other = JwtKeys::new(&JwtConfig {
            secret: "other-secret".into(),
            access_ttl_days: 7,
            proof_ttl_minutes: 10,
        });
        let token = other
            .sign_access(Uuid::new_v4(), "a@b.com")
            .expect("sign access");
        assert!(keys.verify_access(&token).is_err());
    }
}
