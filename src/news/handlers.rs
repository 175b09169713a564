use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    category::{Category, CategoryFilter},
    dto::{ArticleResponse, ListQuery},
    repo::{self, Article, ArticleChanges, NewArticle},
};
use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, FieldError},
    images::services::{image_url, remove_image, store_image, validate_image, UploadedImage},
    state::AppState,
};

// Generous multipart envelope; the 1MB image constraint is enforced
// per-field with a field-level message instead of a bare 413.
const UPLOAD_BODY_LIMIT: usize = 2 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/news", get(list_articles).post(create_article))
        .route(
            "/news/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

#[derive(Default)]
struct ArticleForm {
    title: Option<String>,
    excerpt: Option<String>,
    body: Option<String>,
    category: Option<String>,
    is_featured: Option<bool>,
    image: Option<UploadedImage>,
}

fn malformed(e: axum::extract::multipart::MultipartError) -> ApiError {
    warn!(error = %e, "malformed multipart body");
    ApiError::field("request", "Malformed multipart body")
}

async fn collect_form(mut mp: Multipart) -> Result<ArticleForm, ApiError> {
    let mut form = ArticleForm::default();
    while let Some(field) = mp.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = Some(field.text().await.map_err(malformed)?),
            "excerpt" => form.excerpt = Some(field.text().await.map_err(malformed)?),
            "body" => form.body = Some(field.text().await.map_err(malformed)?),
            "category" => form.category = Some(field.text().await.map_err(malformed)?),
            "is_featured" => {
                let v = field.text().await.map_err(malformed)?;
                form.is_featured = Some(matches!(v.as_str(), "true" | "1" | "on"));
            }
            "image" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(malformed)?;
                // Browsers submit an empty image part when no file was chosen.
                if !bytes.is_empty() {
                    form.image = Some(UploadedImage {
                        bytes,
                        content_type,
                    });
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

fn require(value: Option<String>, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match trimmed(value).filter(|v| !v.is_empty()) {
        Some(v) => Some(v),
        None => {
            errors.push(FieldError {
                field: field.into(),
                message: format!("{} is required", field),
            });
            None
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Applies the row update. The replacement image is already in object
/// storage at this point; when the row is gone or the update fails, that
/// object must not be left behind.
async fn apply_update(
    state: &AppState,
    id: Uuid,
    changes: ArticleChanges,
) -> Result<Article, ApiError> {
    let new_key = changes.image_key.clone();
    match repo::update(&state.db, id, changes).await {
        Ok(Some(article)) => Ok(article),
        Ok(None) => {
            if let Some(key) = &new_key {
                remove_image(state, key).await;
            }
            Err(ApiError::NotFound("Article not found".into()))
        }
        Err(e) => {
            if let Some(key) = &new_key {
                remove_image(state, key).await;
            }
            Err(e.into())
        }
    }
}

#[instrument(skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let filter = CategoryFilter::from_query(q.category.as_deref())?;
    let rows = repo::list(&state.db, filter.narrow()).await?;
    let mut items = Vec::with_capacity(rows.len());
    for article in rows {
        let url = image_url(&state, article.image_key.as_deref()).await;
        items.push(ArticleResponse::from_article(article, url));
    }
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".into()))?;
    let url = image_url(&state, article.image_key.as_deref()).await;
    Ok(Json(ArticleResponse::from_article(article, url)))
}

#[instrument(skip(state, mp))]
pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    mp: Multipart,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    let form = collect_form(mp).await?;

    let mut errors = Vec::new();
    let title = require(form.title, "title", &mut errors);
    let body = require(form.body, "body", &mut errors);
    let category = match require(form.category, "category", &mut errors) {
        Some(raw) => match Category::parse(&raw) {
            Some(c) => Some(c),
            None => {
                errors.push(FieldError {
                    field: "category".into(),
                    message: "Unknown category".into(),
                });
                None
            }
        },
        None => None,
    };
    if let Some(image) = &form.image {
        if let Err(e) = validate_image(image) {
            errors.push(e);
        }
    }
    let (title, body, category) = match (title, body, category) {
        (Some(t), Some(b), Some(c)) if errors.is_empty() => (t, b, c),
        _ => return Err(ApiError::Validation(errors)),
    };

    let image_key = match form.image {
        Some(image) => Some(store_image(&state, image).await?),
        None => None,
    };

    let article = repo::insert(
        &state.db,
        NewArticle {
            author_id: claims.sub,
            title,
            excerpt: form.excerpt,
            body,
            category,
            image_key,
            is_featured: form.is_featured.unwrap_or(false),
        },
    )
    .await?;

    info!(article_id = %article.id, author_id = %claims.sub, "article created");
    let url = image_url(&state, article.image_key.as_deref()).await;
    Ok((
        StatusCode::CREATED,
        Json(ArticleResponse::from_article(article, url)),
    ))
}

#[instrument(skip(state, mp))]
pub async fn update_article(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<ArticleResponse>, ApiError> {
    let existing = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".into()))?;

    let form = collect_form(mp).await?;

    let mut errors = Vec::new();
    for (value, field) in [(&form.title, "title"), (&form.body, "body")] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(FieldError {
                field: field.into(),
                message: format!("{} must not be empty", field),
            });
        }
    }
    let category = match form.category.as_deref() {
        None => None,
        Some(raw) => match Category::parse(raw) {
            Some(c) => Some(c),
            None => {
                errors.push(FieldError {
                    field: "category".into(),
                    message: "Unknown category".into(),
                });
                None
            }
        },
    };
    if let Some(image) = &form.image {
        if let Err(e) = validate_image(image) {
            errors.push(e);
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let image_key = match form.image {
        Some(image) => Some(store_image(&state, image).await?),
        None => None,
    };
    let replaced_image = image_key.is_some();

    let article = apply_update(
        &state,
        id,
        ArticleChanges {
            title: trimmed(form.title),
            excerpt: form.excerpt,
            body: trimmed(form.body),
            category,
            image_key,
            is_featured: form.is_featured,
        },
    )
    .await?;

    if replaced_image {
        if let Some(old_key) = existing.image_key {
            remove_image(&state, &old_key).await;
        }
    }

    info!(article_id = %article.id, editor_id = %claims.sub, "article updated");
    let url = image_url(&state, article.image_key.as_deref()).await;
    Ok(Json(ArticleResponse::from_article(article, url)))
}

#[instrument(skip(state))]
pub async fn delete_article(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match repo::delete(&state.db, id).await? {
        None => Err(ApiError::NotFound("Article not found".into())),
        Some(image_key) => {
            if let Some(key) = image_key {
                remove_image(&state, &key).await;
            }
            info!(article_id = %id, editor_id = %claims.sub, "article deleted");
            Ok(StatusCode::NO_CONTENT)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::storage::ObjectStore;

    #[test]
    fn require_trims_and_rejects_blank_values() {
        let mut errors = Vec::new();
        assert_eq!(
            require(Some("  Headline  ".into()), "title", &mut errors),
            Some("Headline".into())
        );
        assert!(errors.is_empty());

        assert_eq!(require(Some("   ".into()), "body", &mut errors), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "body");
    }

    #[test]
    fn trimmed_normalizes_provided_fields() {
        assert_eq!(trimmed(Some("  spaced  ".into())), Some("spaced".into()));
        assert_eq!(trimmed(Some("plain".into())), Some("plain".into()));
        assert_eq!(trimmed(None), None);
    }

    #[derive(Default)]
    struct RecordingStore {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStore for RecordingStore {
        async fn put(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn delete(&self, key: &str) -> anyhow::Result<()> {
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }
        async fn presign_get(&self, key: &str, _s: u64) -> anyhow::Result<String> {
            Ok(format!("https://fake.local/{}", key))
        }
    }

    #[tokio::test]
    async fn failed_update_discards_the_replacement_image() {
        let store = Arc::new(RecordingStore::default());
        let mut state = AppState::fake();
        state.storage = store.clone();

        // The fake state's pool never connects, so the row update cannot
        // succeed and the freshly stored object must be cleaned up.
        let changes = ArticleChanges {
            image_key: Some("articles/replacement.jpg".into()),
            ..ArticleChanges::default()
        };
        let res = apply_update(&state, Uuid::new_v4(), changes).await;
        assert!(res.is_err());

        let deleted = store.deleted.lock().unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0], "articles/replacement.jpg");
    }

    #[tokio::test]
    async fn failed_update_without_new_image_deletes_nothing() {
        let store = Arc::new(RecordingStore::default());
        let mut state = AppState::fake();
        state.storage = store.clone();

        let res = apply_update(&state, Uuid::new_v4(), ArticleChanges::default()).await;
        assert!(res.is_err());
        assert!(store.deleted.lock().unwrap().is_empty());
    }
}
