use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::instrument;

use crate::{auth::jwt::AuthUser, error::AppError, state::AppState};

use super::text::{self, KeywordRecommendation};

pub fn ai_routes() -> Router<AppState> {
    Router::new().route("/ai/recommend/keywords", post(recommend_keywords))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendKeywordsRequest {
    pub job_type: String,
    pub position: String,
}

#[instrument(skip(state, payload))]
pub async fn recommend_keywords(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Json(payload): Json<RecommendKeywordsRequest>,
) -> Result<Json<KeywordRecommendation>, AppError> {
    if payload.job_type.trim().is_empty() || payload.position.trim().is_empty() {
        return Err(AppError::Validation(
            "jobType and position are required.".into(),
        ));
    }

    let recommendation = text::recommend_keywords(
        state.text_gen.as_ref(),
        payload.job_type.trim(),
        payload.position.trim(),
    )
    .await?;
    Ok(Json(recommendation))
}
