use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{error::AppError, postings::repo::JobPosting, storage::StorageClient};

use super::ImageGenerator;

const POSTER_ASPECT: &str = "9:16";
const BANNER_ASPECT: &str = "16:9";

const DEFAULT_COLOR_TONE: &str = "blue";
const DEFAULT_STYLE: &str = "professional";

fn field_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or(fallback)
}

pub fn poster_prompt(posting: &JobPosting) -> String {
    format!(
        "Create a professional recruitment poster with the following details:\n\
         - Company: {}\n\
         - Position: {}\n\
         - Color tone: {}\n\
         - Style: {}\n\
         Design a vertical portrait poster that is clean and professional.",
        field_or(&posting.company_name, "Company Name"),
        field_or(&posting.position, "Job Position"),
        field_or(&posting.color_tone, DEFAULT_COLOR_TONE),
        field_or(&posting.style_concept, DEFAULT_STYLE),
    )
}

pub fn banner_prompt(posting: &JobPosting) -> String {
    format!(
        "Create a professional recruitment web banner with the following details:\n\
         - Company: {}\n\
         - Position: {}\n\
         - Color tone: {}\n\
         - Style: {}\n\
         Design a horizontal landscape banner suitable for a website header.",
        field_or(&posting.company_name, "Company Name"),
        field_or(&posting.position, "Job Position"),
        field_or(&posting.color_tone, DEFAULT_COLOR_TONE),
        field_or(&posting.style_concept, DEFAULT_STYLE),
    )
}

/// Generates the portrait poster and landscape banner for a posting and
/// persists both to the content area. Both generations must succeed before
/// anything is written, so a failed call leaves no partial artifacts.
#[instrument(skip(generator, storage, posting), fields(posting_id = %posting.id))]
pub async fn generate_poster_and_banner(
    generator: &dyn ImageGenerator,
    storage: &dyn StorageClient,
    posting: &JobPosting,
) -> Result<(String, String), AppError> {
    let poster = generator
        .generate_image(&poster_prompt(posting), POSTER_ASPECT)
        .await?;
    let banner = generator
        .generate_image(&banner_prompt(posting), BANNER_ASPECT)
        .await?;

    let timestamp = OffsetDateTime::now_utc().unix_timestamp();
    let poster_key = format!("postings/{}/poster-{timestamp}.jpg", posting.id);
    let banner_key = format!("postings/{}/banner-{timestamp}.jpg", posting.id);

    storage
        .put_object(&poster_key, poster, "image/jpeg")
        .await
        .map_err(AppError::Internal)?;
    storage
        .put_object(&banner_key, banner, "image/jpeg")
        .await
        .map_err(AppError::Internal)?;

    info!("poster and banner generated");
    Ok((storage.public_url(&poster_key), storage.public_url(&banner_key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiError;
    use axum::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn test_posting() -> JobPosting {
        let now = OffsetDateTime::now_utc();
        JobPosting {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Backend engineer".into(),
            status: "DRAFT".into(),
            company_name: Some("Acme".into()),
            job_type: None,
            position: Some("Backend".into()),
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
            style_concept: Some("minimal".into()),
            selected_benefits_json: None,
            generated_poster_url: None,
            generated_banner_url: None,
            generated_html: None,
            created_at: now,
            updated_at: now,
        }
    }

    struct StubImages;

    #[async_trait]
    impl ImageGenerator for StubImages {
        async fn generate_image(
            &self,
            _prompt: &str,
            aspect_ratio: &str,
        ) -> Result<Bytes, AiError> {
            Ok(Bytes::from(aspect_ratio.as_bytes().to_vec()))
        }
    }

    /// Fails the second call, like a provider that returned zero images for
    /// the banner request.
    struct FailsSecondCall(Mutex<u32>);

    #[async_trait]
    impl ImageGenerator for FailsSecondCall {
        async fn generate_image(&self, _prompt: &str, _ar: &str) -> Result<Bytes, AiError> {
            let mut calls = self.0.lock().unwrap();
            *calls += 1;
            if *calls > 1 {
                Err(AiError::EmptyContent("no image in response".into()))
            } else {
                Ok(Bytes::from_static(b"poster"))
            }
        }
    }

    #[derive(Default)]
    struct RecordingStorage {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl crate::storage::StorageClient for RecordingStorage {
        async fn put_object(
            &self,
            key: &str,
            _body: Bytes,
            _content_type: &str,
        ) -> anyhow::Result<()> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("http://localhost:8080/uploads/{key}")
        }
    }

    #[tokio::test]
    async fn persists_two_distinct_artifacts() {
        let storage = RecordingStorage::default();
        let posting = test_posting();

        let (poster_url, banner_url) =
            generate_poster_and_banner(&StubImages, &storage, &posting)
                .await
                .unwrap();

        let keys = storage.keys.lock().unwrap();
        assert_eq!(keys.len(), 2);
        assert_ne!(keys[0], keys[1]);
        assert!(keys[0].contains("poster"));
        assert!(keys[1].contains("banner"));
        assert_ne!(poster_url, banner_url);
        assert!(poster_url.starts_with("http://localhost:8080/uploads/"));
    }

    #[tokio::test]
    async fn failed_generation_writes_nothing() {
        let storage = RecordingStorage::default();
        let posting = test_posting();
        let generator = FailsSecondCall(Mutex::new(0));

        let err = generate_poster_and_banner(&generator, &storage, &posting)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(storage.keys.lock().unwrap().is_empty());
    }

    #[test]
    fn prompts_fall_back_to_defaults() {
        let posting = test_posting();
        let prompt = poster_prompt(&posting);
        assert!(prompt.contains("Acme"));
        assert!(prompt.contains("Backend"));
        assert!(prompt.contains("blue"));
        assert!(prompt.contains("minimal"));

        let banner = banner_prompt(&posting);
        assert!(banner.contains("landscape banner"));
    }
}
