use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::VerificationChannel;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone_number: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub terms_agreed_at: OffsetDateTime,
    pub marketing_agreement: bool,
    pub created_at: OffsetDateTime,
}

/// A pending verification challenge. At most one live row exists per
/// (channel, recipient); sending a new code deletes priors first.
#[derive(Debug, Clone, FromRow)]
pub struct Verification {
    pub id: Uuid,
    pub channel: String,
    pub recipient: String,
    pub code: String,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, phone_number, email_verified, phone_verified,
                   terms_agreed_at, marketing_agreement, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_email_or_phone(
        db: &PgPool,
        email: &str,
        phone_number: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, phone_number, email_verified, phone_verified,
                   terms_agreed_at, marketing_agreement, created_at
            FROM users
            WHERE email = $1 OR phone_number = $2
            "#,
        )
        .bind(email)
        .bind(phone_number)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        phone_number: &str,
        marketing_agreement: bool,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, phone_number, email_verified,
                               phone_verified, terms_agreed_at, marketing_agreement)
            VALUES ($1, $2, $3, TRUE, TRUE, now(), $4)
            RETURNING id, email, password_hash, phone_number, email_verified, phone_verified,
                      terms_agreed_at, marketing_agreement, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(phone_number)
        .bind(marketing_agreement)
        .fetch_one(db)
        .await
    }
}

impl Verification {
    pub async fn delete_for_recipient(
        db: &PgPool,
        channel: VerificationChannel,
        recipient: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM verifications WHERE channel = $1 AND recipient = $2")
            .bind(channel.as_str())
            .bind(recipient)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn insert(
        db: &PgPool,
        channel: VerificationChannel,
        recipient: &str,
        code: &str,
        expires_at: OffsetDateTime,
    ) -> Result<Verification, sqlx::Error> {
        sqlx::query_as::<_, Verification>(
            r#"
            INSERT INTO verifications (channel, recipient, code, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, channel, recipient, code, expires_at, created_at
            "#,
        )
        .bind(channel.as_str())
        .bind(recipient)
        .bind(code)
        .bind(expires_at)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_code(
        db: &PgPool,
        channel: VerificationChannel,
        recipient: &str,
        code: &str,
    ) -> Result<Option<Verification>, sqlx::Error> {
        sqlx::query_as::<_, Verification>(
            r#"
            SELECT id, channel, recipient, code, expires_at, created_at
            FROM verifications
            WHERE channel = $1 AND recipient = $2 AND code = $3
            "#,
        )
        .bind(channel.as_str())
        .bind(recipient)
        .bind(code)
        .fetch_optional(db)
        .await
    }

    pub async fn delete_by_id(db: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM verifications WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
