use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod status;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
