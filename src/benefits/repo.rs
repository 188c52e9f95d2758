use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Catalog entry describing a third-party incentive program a posting may
/// reference. Maintained by the daily sync, read-only everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SmeBenefit {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub source_url: Option<String>,
    pub is_active: bool,
    pub last_checked_at: OffsetDateTime,
}

pub async fn list_active(db: &PgPool) -> Result<Vec<SmeBenefit>, sqlx::Error> {
    sqlx::query_as::<_, SmeBenefit>(
        r#"
        SELECT id, name, description, source_url, is_active, last_checked_at
        FROM sme_benefits
        WHERE is_active = TRUE
        ORDER BY name ASC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn find_active_by_ids(
    db: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<SmeBenefit>, sqlx::Error> {
    sqlx::query_as::<_, SmeBenefit>(
        r#"
        SELECT id, name, description, source_url, is_active, last_checked_at
        FROM sme_benefits
        WHERE id = ANY($1) AND is_active = TRUE
        "#,
    )
    .bind(ids)
    .fetch_all(db)
    .await
}

/// Find-or-update by name; uniqueness is enforced here, not by a constraint.
pub async fn upsert_by_name(
    db: &PgPool,
    name: &str,
    description: &str,
    source_url: Option<&str>,
) -> Result<(), sqlx::Error> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM sme_benefits WHERE name = $1 LIMIT 1")
            .bind(name)
            .fetch_optional(db)
            .await?;

    match existing {
        Some((id,)) => {
            sqlx::query(
                r#"
                UPDATE sme_benefits
                SET description = $2, source_url = $3, is_active = TRUE, last_checked_at = now()
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(description)
            .bind(source_url)
            .execute(db)
            .await?;
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO sme_benefits (name, description, source_url, is_active, last_checked_at)
                VALUES ($1, $2, $3, TRUE, now())
                "#,
            )
            .bind(name)
            .bind(description)
            .bind(source_url)
            .execute(db)
            .await?;
        }
    }

    Ok(())
}
