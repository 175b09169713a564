use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::external::client::ExternalHeadline;
use crate::news::category::Category;
use crate::news::repo::Article;

/// Which source the listing draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Local,
    International,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub tab: Option<Tab>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    pub category: Option<String>,
}

/// A locally authored record as fetched, before defensive validation.
/// Everything that the display depends on is optional here; validation
/// drops records missing id, title, or creation timestamp.
#[derive(Debug, Clone)]
pub struct RawArticle {
    pub id: Option<Uuid>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub created_at: Option<OffsetDateTime>,
}

impl RawArticle {
    pub fn from_row(article: &Article, image_url: Option<String>) -> Self {
        Self {
            id: Some(article.id),
            title: Some(article.title.clone()),
            excerpt: article.excerpt.clone(),
            category: article.category(),
            image_url,
            is_featured: article.is_featured,
            created_at: Some(article.created_at),
        }
    }
}

/// One validated entry of the rendered local list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListItem {
    pub id: Uuid,
    pub title: String,
    pub excerpt: Option<String>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub created_at: OffsetDateTime,
    /// Whether the viewer sees the edit affordance. Presentation only; the
    /// article service enforces the real authorization.
    pub can_edit: bool,
}

/// Presenter output for one tab. International order is whatever the
/// upstream returned; local order is featured-first, then recency.
#[derive(Debug, Serialize)]
#[serde(tag = "tab", content = "items", rename_all = "lowercase")]
pub enum ViewResponse {
    Local(Vec<ListItem>),
    International(Vec<ExternalHeadline>),
}
