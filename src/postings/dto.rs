use serde::{Deserialize, Serialize};

pub const MAX_KEYWORDS: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostingStatus {
    Draft,
    Published,
    Archived,
}

impl PostingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingStatus::Draft => "DRAFT",
            PostingStatus::Published => "PUBLISHED",
            PostingStatus::Archived => "ARCHIVED",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePostingRequest {
    pub title: String,
}

/// Partial update. Absent fields keep their stored value; the generated
/// artifact fields stay directly writable through this path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostingRequest {
    pub title: Option<String>,
    pub status: Option<PostingStatus>,
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
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub total_items: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<super::repo::PostingSummary>,
    pub meta: ListMeta,
}

pub fn total_pages(total_items: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total_items + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[test]
    fn status_roundtrips_through_serde() {
        let s: PostingStatus = serde_json::from_str("\"PUBLISHED\"").unwrap();
        assert_eq!(s, PostingStatus::Published);
        assert_eq!(s.as_str(), "PUBLISHED");
        assert!(serde_json::from_str::<PostingStatus>("\"published\"").is_err());
    }
}
