use axum::Router;

use crate::state::AppState;

pub mod claims;
mod dto;
pub mod handlers;
pub mod jwt;
mod password;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
