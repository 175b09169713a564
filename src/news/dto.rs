use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Article;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub category: String,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl ArticleResponse {
    pub fn from_article(article: Article, image_url: Option<String>) -> Self {
        Self {
            id: article.id,
            author_id: article.author_id,
            title: article.title,
            excerpt: article.excerpt,
            body: article.body,
            category: article.category,
            image_url,
            is_featured: article.is_featured,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}
