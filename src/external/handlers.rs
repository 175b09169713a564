use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::client::{self, DEFAULT_COUNTRY};
use crate::{error::ApiError, news::category::CategoryFilter, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/news/external", get(external_news))
}

#[derive(Debug, Deserialize)]
pub struct ExternalQuery {
    pub country: Option<String>,
    pub category: Option<String>,
}

/// Pass-through proxy to the upstream headline API. The payload is returned
/// verbatim; `category=all` is omitted upstream.
#[instrument(skip(state))]
pub async fn external_news(
    State(state): State<AppState>,
    Query(q): Query<ExternalQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = CategoryFilter::from_query(q.category.as_deref())?;
    let country = q.country.as_deref().unwrap_or(DEFAULT_COUNTRY);
    let payload = client::top_headlines(&state, country, filter.narrow()).await?;
    Ok(Json(payload))
}
