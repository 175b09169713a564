use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed category set for locally authored articles. `all` is not a member;
/// it exists only as a filter value and is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Politics,
    Business,
    Health,
    Technology,
    Entertainment,
    Science,
    History,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Politics,
        Category::Business,
        Category::Health,
        Category::Technology,
        Category::Entertainment,
        Category::Science,
        Category::History,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::Business => "business",
            Category::Health => "health",
            Category::Technology => "technology",
            Category::Entertainment => "entertainment",
            Category::Science => "science",
            Category::History => "history",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category filter as selected in the UI: either everything or one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Option<Self> {
        if s == "all" {
            Some(CategoryFilter::All)
        } else {
            Category::parse(s).map(CategoryFilter::Only)
        }
    }

    /// Filter from an optional `?category=` query value; absence means `all`.
    pub fn from_query(raw: Option<&str>) -> Result<Self, crate::error::ApiError> {
        match raw {
            None => Ok(CategoryFilter::All),
            Some(s) => Self::parse(s)
                .ok_or_else(|| crate::error::ApiError::field("category", "Unknown category")),
        }
    }

    /// The category to narrow by, or `None` for `all`.
    pub fn narrow(self) -> Option<Category> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(c) => Some(c),
        }
    }

    pub fn matches(self, category: Option<Category>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(want) => category == Some(want),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_parses_back() {
        for c in Category::ALL {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
        assert_eq!(Category::parse("sports"), None);
        assert_eq!(Category::parse("all"), None);
    }

    #[test]
    fn filter_parsing() {
        assert_eq!(CategoryFilter::parse("all"), Some(CategoryFilter::All));
        assert_eq!(
            CategoryFilter::parse("science"),
            Some(CategoryFilter::Only(Category::Science))
        );
        assert_eq!(CategoryFilter::parse("weather"), None);
    }

    #[test]
    fn all_removes_narrowing() {
        assert_eq!(CategoryFilter::All.narrow(), None);
        assert_eq!(
            CategoryFilter::Only(Category::Health).narrow(),
            Some(Category::Health)
        );
    }

    #[test]
    fn matching_is_exact_for_a_single_category() {
        let only = CategoryFilter::Only(Category::Politics);
        assert!(only.matches(Some(Category::Politics)));
        assert!(!only.matches(Some(Category::Business)));
        assert!(!only.matches(None));
        assert!(CategoryFilter::All.matches(None));
        assert!(CategoryFilter::All.matches(Some(Category::History)));
    }
}
