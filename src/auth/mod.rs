use crate::state::AppState;
use axum::Router;

pub mod delivery;
mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;

pub use dto::VerificationChannel;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
