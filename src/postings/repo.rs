use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::UpdatePostingRequest;

const COLUMNS: &str = "id, user_id, title, status, company_name, job_type, position, \
     career_level, employment_type, salary_range, work_location, keywords, company_intro, \
     company_culture, benefits, logo_image_url, color_tone, style_concept, \
     selected_benefits_json, generated_poster_url, generated_banner_url, generated_html, \
     created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub status: String,
    pub company_name: Option<String>,
    pub job_type: Option<String>,
    pub position: Option<String>,
    pub career_level: Option<String>,
    pub employment_type: Option<String>,
    pub salary_range: Option<String>,
    pub work_location: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub company_intro: Option<String>,
    pub company_culture: Option<String>,
    pub benefits: Option<String>,
    pub logo_image_url: Option<String>,
    pub color_tone: Option<String>,
    pub style_concept: Option<String>,
    pub selected_benefits_json: Option<String>,
    pub generated_poster_url: Option<String>,
    pub generated_banner_url: Option<String>,
    pub generated_html: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostingSummary {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub updated_at: OffsetDateTime,
}

/// Maps a caller-supplied sort key to a real column. Anything outside the
/// whitelist falls back to the update timestamp.
pub fn sort_column(sort_by: Option<&str>) -> &'static str {
    match sort_by {
        Some("createdAt") => "created_at",
        Some("title") => "title",
        Some("status") => "status",
        _ => "updated_at",
    }
}

pub fn sort_direction(order: Option<&str>) -> &'static str {
    match order {
        Some("asc") => "ASC",
        _ => "DESC",
    }
}

pub async fn create(db: &PgPool, user_id: Uuid, title: &str) -> Result<JobPosting, sqlx::Error> {
    sqlx::query_as::<_, JobPosting>(&format!(
        "INSERT INTO job_postings (user_id, title, status) VALUES ($1, $2, 'DRAFT') \
         RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(title)
    .fetch_one(db)
    .await
}

pub async fn list_page(
    db: &PgPool,
    user_id: Uuid,
    page: i64,
    limit: i64,
    sort_by: Option<&str>,
    order: Option<&str>,
) -> Result<(Vec<PostingSummary>, i64), sqlx::Error> {
    let offset = (page - 1) * limit;
    let column = sort_column(sort_by);
    let direction = sort_direction(order);

    // column/direction come from a fixed whitelist, never from user input.
    let rows = sqlx::query_as::<_, PostingSummary>(&format!(
        "SELECT id, title, status, updated_at FROM job_postings \
         WHERE user_id = $1 ORDER BY {column} {direction} LIMIT $2 OFFSET $3"
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let (total,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM job_postings WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(db)
            .await?;

    Ok((rows, total))
}

/// Ownership check is baked into the query: a posting owned by someone else
/// looks exactly like a missing one.
pub async fn find_owned(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<JobPosting>, sqlx::Error> {
    sqlx::query_as::<_, JobPosting>(&format!(
        "SELECT {COLUMNS} FROM job_postings WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    fields: &UpdatePostingRequest,
) -> Result<Option<JobPosting>, sqlx::Error> {
    sqlx::query_as::<_, JobPosting>(&format!(
        "UPDATE job_postings SET \
            title = COALESCE($3, title), \
            status = COALESCE($4, status), \
            company_name = COALESCE($5, company_name), \
            job_type = COALESCE($6, job_type), \
            position = COALESCE($7, position), \
            career_level = COALESCE($8, career_level), \
            employment_type = COALESCE($9, employment_type), \
            salary_range = COALESCE($10, salary_range), \
            work_location = COALESCE($11, work_location), \
            keywords = COALESCE($12, keywords), \
            company_intro = COALESCE($13, company_intro), \
            company_culture = COALESCE($14, company_culture), \
            benefits = COALESCE($15, benefits), \
            logo_image_url = COALESCE($16, logo_image_url), \
            color_tone = COALESCE($17, color_tone), \
            style_concept = COALESCE($18, style_concept), \
            selected_benefits_json = COALESCE($19, selected_benefits_json), \
            generated_poster_url = COALESCE($20, generated_poster_url), \
            generated_banner_url = COALESCE($21, generated_banner_url), \
            generated_html = COALESCE($22, generated_html), \
            updated_at = now() \
         WHERE id = $1 AND user_id = $2 \
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .bind(&fields.title)
    .bind(fields.status.map(|s| s.as_str()))
    .bind(&fields.company_name)
    .bind(&fields.job_type)
    .bind(&fields.position)
    .bind(&fields.career_level)
    .bind(&fields.employment_type)
    .bind(&fields.salary_range)
    .bind(&fields.work_location)
    .bind(&fields.keywords)
    .bind(&fields.company_intro)
    .bind(&fields.company_culture)
    .bind(&fields.benefits)
    .bind(&fields.logo_image_url)
    .bind(&fields.color_tone)
    .bind(&fields.style_concept)
    .bind(&fields.selected_benefits_json)
    .bind(&fields.generated_poster_url)
    .bind(&fields.generated_banner_url)
    .bind(&fields.generated_html)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM job_postings WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn set_generated_images(
    db: &PgPool,
    id: Uuid,
    poster_url: &str,
    banner_url: &str,
) -> Result<JobPosting, sqlx::Error> {
    sqlx::query_as::<_, JobPosting>(&format!(
        "UPDATE job_postings SET generated_poster_url = $2, generated_banner_url = $3, \
         updated_at = now() WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(poster_url)
    .bind(banner_url)
    .fetch_one(db)
    .await
}

pub async fn set_generated_html(
    db: &PgPool,
    id: Uuid,
    html: &str,
) -> Result<JobPosting, sqlx::Error> {
    sqlx::query_as::<_, JobPosting>(&format!(
        "UPDATE job_postings SET generated_html = $2, updated_at = now() \
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(html)
    .fetch_one(db)
    .await
}

pub async fn set_logo_url(db: &PgPool, id: Uuid, url: &str) -> Result<JobPosting, sqlx::Error> {
    sqlx::query_as::<_, JobPosting>(&format!(
        "UPDATE job_postings SET logo_image_url = $2, updated_at = now() \
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(url)
    .fetch_one(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_column_whitelists_known_fields() {
        assert_eq!(sort_column(Some("createdAt")), "created_at");
        assert_eq!(sort_column(Some("title")), "title");
        assert_eq!(sort_column(Some("status")), "status");
        assert_eq!(sort_column(Some("updatedAt")), "updated_at");
        // Anything unknown falls back instead of reaching the query.
        assert_eq!(sort_column(Some("password_hash; DROP TABLE")), "updated_at");
        assert_eq!(sort_column(None), "updated_at");
    }

    #[test]
    fn sort_direction_defaults_to_desc() {
        assert_eq!(sort_direction(Some("asc")), "ASC");
        assert_eq!(sort_direction(Some("desc")), "DESC");
        assert_eq!(sort_direction(Some("sideways")), "DESC");
        assert_eq!(sort_direction(None), "DESC");
    }
}
