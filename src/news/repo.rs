use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::category::Category;

#[derive(Debug, Clone, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub category: String,
    pub image_key: Option<String>,
    pub is_featured: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Article {
    pub fn category(&self) -> Option<Category> {
        Category::parse(&self.category)
    }
}

pub struct NewArticle {
    pub author_id: Uuid,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub category: Category,
    pub image_key: Option<String>,
    pub is_featured: bool,
}

/// Partial update; `None` fields keep their current value. `created_at` is
/// set once at insert and never touched again.
#[derive(Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub category: Option<Category>,
    pub image_key: Option<String>,
    pub is_featured: Option<bool>,
}

const COLUMNS: &str =
    "id, author_id, title, excerpt, body, category, image_key, is_featured, created_at, updated_at";

pub async fn list(db: &PgPool, category: Option<Category>) -> anyhow::Result<Vec<Article>> {
    let rows = match category {
        Some(c) => {
            sqlx::query_as::<_, Article>(&format!(
                r#"
                SELECT {COLUMNS}
                FROM articles
                WHERE category = $1
                ORDER BY created_at DESC
                "#
            ))
            .bind(c.as_str())
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Article>(&format!(
                r#"
                SELECT {COLUMNS}
                FROM articles
                ORDER BY created_at DESC
                "#
            ))
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Article>> {
    let row = sqlx::query_as::<_, Article>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM articles
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn insert(db: &PgPool, new: NewArticle) -> anyhow::Result<Article> {
    let row = sqlx::query_as::<_, Article>(&format!(
        r#"
        INSERT INTO articles (author_id, title, excerpt, body, category, image_key, is_featured)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(new.author_id)
    .bind(&new.title)
    .bind(&new.excerpt)
    .bind(&new.body)
    .bind(new.category.as_str())
    .bind(&new.image_key)
    .bind(new.is_featured)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: ArticleChanges,
) -> anyhow::Result<Option<Article>> {
    let row = sqlx::query_as::<_, Article>(&format!(
        r#"
        UPDATE articles SET
            title = COALESCE($2, title),
            excerpt = COALESCE($3, excerpt),
            body = COALESCE($4, body),
            category = COALESCE($5, category),
            image_key = COALESCE($6, image_key),
            is_featured = COALESCE($7, is_featured),
            updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.excerpt)
    .bind(&changes.body)
    .bind(changes.category.map(|c| c.as_str()))
    .bind(&changes.image_key)
    .bind(changes.is_featured)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Hard delete; returns the stored image key (if any) so the caller can
/// remove the object. `None` means no such article.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Option<String>>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as(r#"DELETE FROM articles WHERE id = $1 RETURNING image_key"#)
            .bind(id)
            .fetch_optional(db)
            .await?;
    Ok(row.map(|(key,)| key))
}
