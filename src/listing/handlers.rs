use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{FeaturedQuery, ListItem, RawArticle, Tab, ViewQuery, ViewResponse},
    presenter::{Presenter, ViewState},
    services,
};
use crate::{
    auth::jwt::OptionalAuthUser,
    error::ApiError,
    external::client::{self, ExternalHeadline, DEFAULT_COUNTRY},
    images::services::image_url,
    news::{category::CategoryFilter, repo},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/news/view", get(news_view))
        .route("/news/featured", get(featured_view))
}

/// The assembled listing for one tab and category selection. Each request is
/// one presenter fetch cycle; a failure renders the error state, a successful
/// empty fetch renders the distinct no-results state (an empty `items`).
#[instrument(skip(state, viewer))]
pub async fn news_view(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Query(q): Query<ViewQuery>,
) -> Result<Json<ViewResponse>, ApiError> {
    let filter = CategoryFilter::from_query(q.category.as_deref())?;
    let tab = q.tab.unwrap_or(Tab::Local);

    match tab {
        Tab::Local => {
            let can_edit = services::can_edit(viewer.as_ref());
            let mut presenter: Presenter<ListItem> = Presenter::new();
            let tag = presenter.begin_fetch();
            let result = fetch_local(&state, filter, can_edit).await;
            presenter.apply(tag, result.map_err(|e| e.to_string()));
            Ok(Json(ViewResponse::Local(render(presenter.into_state())?)))
        }
        Tab::International => {
            let mut presenter: Presenter<ExternalHeadline> = Presenter::new();
            let tag = presenter.begin_fetch();
            let result = fetch_international(&state, filter).await;
            presenter.apply(tag, result.map_err(|e| e.to_string()));
            Ok(Json(ViewResponse::International(render(
                presenter.into_state(),
            )?)))
        }
    }
}

/// Maps the settled presenter state onto the response: `Empty` renders as a
/// distinct empty list, `Error` as a whole-list failure with no partial data.
fn render<T>(state: ViewState<T>) -> Result<Vec<T>, ApiError> {
    match state {
        ViewState::Ready(items) => Ok(items),
        ViewState::Empty => Ok(Vec::new()),
        ViewState::Error(message) => Err(ApiError::Upstream(message)),
        ViewState::Idle | ViewState::Loading => {
            Err(ApiError::Internal(anyhow::anyhow!("fetch was not applied")))
        }
    }
}

/// First ten external headlines for the featured carousel.
#[instrument(skip(state))]
pub async fn featured_view(
    State(state): State<AppState>,
    Query(q): Query<FeaturedQuery>,
) -> Result<Json<Vec<ExternalHeadline>>, ApiError> {
    let filter = CategoryFilter::from_query(q.category.as_deref())?;
    let headlines = fetch_international(&state, filter).await?;
    Ok(Json(services::featured_carousel(headlines)))
}

/// Server-side category narrowing is authoritative; the presenter's own
/// filter pass is redundant with it by construction.
async fn fetch_local(
    state: &AppState,
    filter: CategoryFilter,
    can_edit: bool,
) -> Result<Vec<ListItem>, ApiError> {
    let rows = repo::list(&state.db, filter.narrow()).await?;
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let url = image_url(state, row.image_key.as_deref()).await;
        records.push(RawArticle::from_row(row, url));
    }
    Ok(services::build_display_list(records, filter, can_edit))
}

/// Upstream display order is preserved; no sorting on this tab.
async fn fetch_international(
    state: &AppState,
    filter: CategoryFilter,
) -> Result<Vec<ExternalHeadline>, ApiError> {
    let payload = client::top_headlines(state, DEFAULT_COUNTRY, filter.narrow()).await?;
    Ok(client::parse_headlines(&payload))
}
