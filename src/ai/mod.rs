use axum::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::{error::AppError, state::AppState};
use axum::Router;

pub mod client;
pub mod handlers;
pub mod image;
pub mod text;

pub use client::GeminiClient;

/// Errors from the generative provider. Transport and API failures mean "the
/// AI was down"; a successful call with an unusable payload means "the AI
/// answered oddly" and maps to an internal error instead.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("provider returned no usable payload: {0}")]
    EmptyContent(String),
}

impl From<AiError> for AppError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::Http(_) | AiError::Api { .. } => AppError::Upstream(e.to_string()),
            AiError::EmptyContent(_) => AppError::Internal(anyhow::anyhow!(e.to_string())),
        }
    }
}

/// Free-text generation capability. Returns unstructured text; all
/// structure extraction is the adapter's job.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, AiError>;
}

/// Image generation capability. Returns the raw bytes of exactly one image,
/// or fails; there is no partial success.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> Result<Bytes, AiError>;
}

pub fn router() -> Router<AppState> {
    handlers::ai_routes()
}
