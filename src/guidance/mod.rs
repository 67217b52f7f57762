use crate::state::AppState;
use axum::Router;

pub mod chat;
pub mod dto;
pub mod handlers;
pub mod lifecycle;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
