use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    ai, benefits,
    error::AppError,
    postings::repo::{self, JobPosting},
    state::AppState,
};

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn not_found() -> AppError {
    AppError::NotFound("Posting not found.".into())
}

/// Guard for image generation: the prompts are useless without a position and
/// a company name.
fn ensure_image_fields(posting: &JobPosting) -> Result<(), AppError> {
    if is_blank(&posting.position) || is_blank(&posting.company_name) {
        return Err(AppError::Validation(
            "Missing required fields for generation.".into(),
        ));
    }
    Ok(())
}

/// Guard for HTML generation: needs a position and a company introduction.
fn ensure_html_fields(posting: &JobPosting) -> Result<(), AppError> {
    if is_blank(&posting.position) || is_blank(&posting.company_intro) {
        return Err(AppError::Validation(
            "Missing required fields for generation.".into(),
        ));
    }
    Ok(())
}

/// Parses the serialized benefit selection. Runs before any provider call so
/// malformed input fails fast as a validation error.
pub(crate) fn parse_benefit_ids(raw: &str) -> Result<Vec<Uuid>, AppError> {
    serde_json::from_str(raw)
        .map_err(|_| AppError::Validation("Invalid selectedBenefitsJson format.".into()))
}

#[instrument(skip(state))]
pub async fn generate_images(
    state: &AppState,
    posting_id: Uuid,
    user_id: Uuid,
) -> Result<JobPosting, AppError> {
    let posting = repo::find_owned(&state.db, posting_id, user_id)
        .await?
        .ok_or_else(not_found)?;
    ensure_image_fields(&posting)?;

    let (poster_url, banner_url) = ai::image::generate_poster_and_banner(
        state.image_gen.as_ref(),
        state.storage.as_ref(),
        &posting,
    )
    .await?;

    let updated =
        repo::set_generated_images(&state.db, posting_id, &poster_url, &banner_url).await?;
    info!(posting_id = %posting_id, "generated poster and banner");
    Ok(updated)
}

#[instrument(skip(state))]
pub async fn generate_html(
    state: &AppState,
    posting_id: Uuid,
    user_id: Uuid,
) -> Result<JobPosting, AppError> {
    let posting = repo::find_owned(&state.db, posting_id, user_id)
        .await?
        .ok_or_else(not_found)?;
    ensure_html_fields(&posting)?;

    let selected_benefits = match posting.selected_benefits_json.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            let ids = parse_benefit_ids(raw)?;
            if ids.is_empty() {
                Vec::new()
            } else {
                benefits::repo::find_active_by_ids(&state.db, &ids).await?
            }
        }
        _ => Vec::new(),
    };

    let html = ai::text::generate_html(state.text_gen.as_ref(), &posting, &selected_benefits)
        .await?;

    let updated = repo::set_generated_html(&state.db, posting_id, &html).await?;
    info!(posting_id = %posting_id, "generated posting HTML");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn blank_posting() -> JobPosting {
        let now = OffsetDateTime::now_utc();
        JobPosting {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "t".into(),
            status: "DRAFT".into(),
            company_name: None,
            job_type: None,
            position: None,
            career_level: None,
            employment_type: None,
            salary_range: None,
            work_location: None,
            keywords: None,
            company_intro: None,
            company_culture: None,
            benefits: None,
            logo_image_url: None,
            color_tone: None,
            style_concept: None,
            selected_benefits_json: None,
            generated_poster_url: None,
            generated_banner_url: None,
            generated_html: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn image_guard_requires_position_and_company_name() {
        let mut posting = blank_posting();
        assert!(matches!(
            ensure_image_fields(&posting),
            Err(AppError::Validation(_))
        ));

        posting.position = Some("Backend".into());
        assert!(ensure_image_fields(&posting).is_err());

        posting.company_name = Some("  ".into());
        assert!(ensure_image_fields(&posting).is_err());

        posting.company_name = Some("Acme".into());
        assert!(ensure_image_fields(&posting).is_ok());
    }

    #[test]
    fn html_guard_requires_position_and_intro() {
        let mut posting = blank_posting();
        posting.position = Some("Backend".into());
        assert!(ensure_html_fields(&posting).is_err());

        posting.company_intro = Some("We build things.".into());
        assert!(ensure_html_fields(&posting).is_ok());
    }

    #[test]
    fn benefit_ids_parse_and_reject_malformed_input() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!("[\"{a}\",\"{b}\"]");
        assert_eq!(parse_benefit_ids(&raw).unwrap(), vec![a, b]);

        assert_eq!(parse_benefit_ids("[]").unwrap(), Vec::<Uuid>::new());
        assert!(matches!(
            parse_benefit_ids("not json"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_benefit_ids("{\"ids\": []}"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_benefit_ids("[\"not-a-uuid\"]"),
            Err(AppError::Validation(_))
        ));
    }
}
