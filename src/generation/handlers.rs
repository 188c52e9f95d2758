use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, error::AppError, postings::repo::JobPosting, state::AppState};

use super::service;

pub fn generation_routes() -> Router<AppState> {
    Router::new()
        .route("/generate/:id/images", post(generate_images))
        .route("/generate/:id/html", post(generate_html))
}

#[instrument(skip(state))]
pub async fn generate_images(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    let posting = service::generate_images(&state, id, user_id).await?;
    Ok(Json(posting))
}

#[instrument(skip(state))]
pub async fn generate_html(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    let posting = service::generate_html(&state, id, user_id).await?;
    Ok(Json(posting))
}
