use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::{benefits::repo::SmeBenefit, error::AppError, postings::repo::JobPosting};

use super::TextGenerator;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct KeywordRecommendation {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
}

/// First brace-delimited span in a free-text response. The provider gives no
/// structural guarantees, so locating the span is a separate, fallible step
/// from parsing it.
fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn parse_keyword_response(text: &str) -> Result<KeywordRecommendation, AppError> {
    let span = extract_json_span(text).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("no JSON object in AI response"))
    })?;
    serde_json::from_str(span)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("malformed AI response: {e}")))
}

#[instrument(skip(generator))]
pub async fn recommend_keywords(
    generator: &dyn TextGenerator,
    job_type: &str,
    position: &str,
) -> Result<KeywordRecommendation, AppError> {
    let prompt = format!(
        "Recommend 10 recruiting keywords for a job posting with job type '{job_type}' \
         and position '{position}'. Respond with strictly this JSON shape and nothing else:\n\
         {{\n  \"keywords\": [\"keyword1\", \"keyword2\", ...]\n}}\n\
         Return only JSON, no other text."
    );

    let text = generator.generate_text(&prompt).await?;
    parse_keyword_response(&text)
}

/// HTML payload extraction: fenced ```html block first, then a bare
/// `<html>...</html>` span, then the raw text as a last resort. The raw
/// fallback is deliberate; only the JSON path hard-fails on missing structure.
pub fn extract_html(text: &str) -> &str {
    if let Some(start) = text.find("```html") {
        let after = &text[start + "```html".len()..];
        let after = after.strip_prefix('\n').unwrap_or(after);
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }

    lazy_static! {
        static ref HTML_RE: Regex = Regex::new(r"(?is)<html.*</html>").unwrap();
    }
    if let Some(m) = HTML_RE.find(text) {
        return m.as_str();
    }

    text
}

fn html_prompt(posting: &JobPosting, benefits: &[SmeBenefit]) -> String {
    let benefit_data: Vec<_> = benefits
        .iter()
        .map(|b| {
            json!({
                "id": b.id,
                "name": b.name,
                "description": b.description,
                "sourceUrl": b.source_url,
            })
        })
        .collect();

    let data = json!({ "posting": posting, "benefits": benefit_data });
    let data = serde_json::to_string_pretty(&data).unwrap_or_default();

    format!(
        "You are a senior front-end developer. Generate one complete, self-contained \
         recruitment posting page as pure HTML from the JSON data below.\n\
         Rules:\n\
         - Full <!DOCTYPE html>, <html>, <head>, <body> structure.\n\
         - Include <script src=\"https://cdn.tailwindcss.com\"></script> in <head>.\n\
         - Style only with Tailwind utility classes; no <style> tags, no inline style attributes.\n\
         - Primary color: bg-blue-600 / text-blue-600. Accent color: bg-green-500 / \
           text-green-500. Page background: bg-gray-100.\n\
         - Use a centered card layout (max-w-4xl mx-auto bg-white shadow-lg rounded-lg) \
           with generous spacing.\n\
         - Split companyIntro, companyCulture and benefits text into visually distinct \
           sections; render list-like items as styled lists or tag chips.\n\
         - If generatedBannerUrl is present, render it as an <img> at the top of the card.\n\
         - Return only the HTML code itself, with no surrounding text and no markdown fences.\n\n\
         JSON data:\n{data}"
    )
}

#[instrument(skip(generator, posting, benefits))]
pub async fn generate_html(
    generator: &dyn TextGenerator,
    posting: &JobPosting,
    benefits: &[SmeBenefit],
) -> Result<String, AppError> {
    let prompt = html_prompt(posting, benefits);
    let text = generator.generate_text(&prompt).await?;
    Ok(extract_html(&text).to_string())
}
