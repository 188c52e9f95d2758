use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{error::AppError, state::AppState};

use super::repo::{self, SmeBenefit};

pub fn benefit_routes() -> Router<AppState> {
    Router::new().route("/benefits", get(list_benefits))
}

#[instrument(skip(state))]
pub async fn list_benefits(
    State(state): State<AppState>,
) -> Result<Json<Vec<SmeBenefit>>, AppError> {
    let benefits = repo::list_active(&state.db).await?;
    Ok(Json(benefits))
}
