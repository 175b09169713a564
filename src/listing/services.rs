use super::dto::{ListItem, RawArticle};
use crate::auth::claims::Claims;
use crate::external::client::ExternalHeadline;
use crate::news::category::CategoryFilter;

/// Carousel contexts display at most this many headlines.
pub const FEATURED_CAROUSEL_LIMIT: usize = 10;

/// Admin predicate: whether the viewer sees privileged affordances.
/// Role-based only; there is no email allowlist.
pub fn can_edit(viewer: Option<&Claims>) -> bool {
    viewer.map(|c| c.role.is_admin()).unwrap_or(false)
}

/// Builds the ordered local display list out of fetched records:
/// malformed records are dropped, the category filter is applied, and the
/// rest is sorted featured-first, newest-first.
pub fn build_display_list(
    records: Vec<RawArticle>,
    filter: CategoryFilter,
    can_edit: bool,
) -> Vec<ListItem> {
    let mut items: Vec<ListItem> = records
        .into_iter()
        .filter_map(|r| into_item(r, can_edit))
        .filter(|item| filter.matches(item.category))
        .collect();
    sort_for_display(&mut items);
    items
}

/// Defensive validation: a record without an id, a non-empty title, or a
/// creation timestamp never reaches the rendered list.
fn into_item(raw: RawArticle, can_edit: bool) -> Option<ListItem> {
    let id = raw.id?;
    let title = raw.title.filter(|t| !t.trim().is_empty())?;
    let created_at = raw.created_at?;
    Some(ListItem {
        id,
        title,
        excerpt: raw.excerpt,
        category: raw.category,
        image_url: raw.image_url,
        is_featured: raw.is_featured,
        created_at,
        can_edit,
    })
}

/// Featured articles precede non-featured ones; within each group, newer
/// creation timestamps come first. The sort is stable, so equal keys keep
/// their fetched order.
pub fn sort_for_display(items: &mut [ListItem]) {
    items.sort_by(|a, b| {
        b.is_featured
            .cmp(&a.is_featured)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Truncation for the featured-carousel context: first 10, upstream order.
pub fn featured_carousel(mut headlines: Vec<ExternalHeadline>) -> Vec<ExternalHeadline> {
    headlines.truncate(FEATURED_CAROUSEL_LIMIT);
    headlines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::{TokenKind, UserRole};
    use crate::news::category::Category;
    use time::macros::datetime;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn raw(
        id: Option<Uuid>,
        title: Option<&str>,
        featured: bool,
        created_at: Option<OffsetDateTime>,
        category: Option<Category>,
    ) -> RawArticle {
        RawArticle {
            id,
            title: title.map(|t| t.to_string()),
            excerpt: None,
            category,
            image_url: None,
            is_featured: featured,
            created_at,
        }
    }

    fn claims(role: UserRole) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            role,
            iat: 0,
            exp: usize::MAX,
            iss: "test".into(),
            aud: "test".into(),
            kind: TokenKind::Access,
        }
    }

    const T1: OffsetDateTime = datetime!(2024-03-01 08:00 UTC);
    const T2: OffsetDateTime = datetime!(2024-03-02 08:00 UTC);
    const T3: OffsetDateTime = datetime!(2024-03-03 08:00 UTC);

    #[test]
    fn featured_precedes_newer_non_featured() {
        // An older featured article still outranks a newer plain one.
        let featured_id = Uuid::new_v4();
        let newer_id = Uuid::new_v4();
        let items = build_display_list(
            vec![
                raw(Some(newer_id), Some("newer"), false, Some(T2), None),
                raw(Some(featured_id), Some("featured"), true, Some(T1), None),
            ],
            CategoryFilter::All,
            false,
        );
        assert_eq!(
            items.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![featured_id, newer_id]
        );
    }

    #[test]
    fn recency_orders_within_each_group() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let items = build_display_list(
            vec![
                raw(Some(ids[0]), Some("plain old"), false, Some(T1), None),
                raw(Some(ids[1]), Some("featured old"), true, Some(T1), None),
                raw(Some(ids[2]), Some("plain new"), false, Some(T3), None),
                raw(Some(ids[3]), Some("featured new"), true, Some(T2), None),
            ],
            CategoryFilter::All,
            false,
        );
        assert_eq!(
            items.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![ids[3], ids[1], ids[2], ids[0]]
        );
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let items = build_display_list(
            vec![
                raw(Some(first), Some("a"), false, Some(T1), None),
                raw(Some(second), Some("b"), false, Some(T1), None),
            ],
            CategoryFilter::All,
            false,
        );
        assert_eq!(
            items.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![first, second]
        );
    }

    #[test]
    fn malformed_records_are_dropped() {
        let good = Uuid::new_v4();
        let items = build_display_list(
            vec![
                raw(None, Some("no id"), true, Some(T1), None),
                raw(Some(Uuid::new_v4()), None, true, Some(T1), None),
                raw(Some(Uuid::new_v4()), Some("   "), true, Some(T1), None),
                raw(Some(Uuid::new_v4()), Some("no timestamp"), true, None, None),
                raw(Some(good), Some("valid"), false, Some(T1), None),
            ],
            CategoryFilter::All,
            false,
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, good);
    }

    #[test]
    fn category_filter_restricts_exactly() {
        let health = Uuid::new_v4();
        let records = vec![
            raw(Some(health), Some("h"), false, Some(T1), Some(Category::Health)),
            raw(Some(Uuid::new_v4()), Some("p"), false, Some(T2), Some(Category::Politics)),
            raw(Some(Uuid::new_v4()), Some("none"), false, Some(T3), None),
        ];

        let narrowed = build_display_list(
            records.clone(),
            CategoryFilter::Only(Category::Health),
            false,
        );
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].id, health);

        let everything = build_display_list(records, CategoryFilter::All, false);
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn edit_affordance_follows_the_role() {
        let record = vec![raw(Some(Uuid::new_v4()), Some("t"), false, Some(T1), None)];

        let admin = claims(UserRole::Admin);
        let reader = claims(UserRole::Reader);
        assert!(can_edit(Some(&admin)));
        assert!(!can_edit(Some(&reader)));
        assert!(!can_edit(None));

        let items = build_display_list(record, CategoryFilter::All, can_edit(Some(&admin)));
        assert!(items[0].can_edit);
    }

    #[test]
    fn carousel_truncates_to_ten_preserving_order() {
        let headlines: Vec<ExternalHeadline> = (0..15)
            .map(|i| ExternalHeadline {
                title: Some(format!("headline {}", i)),
                description: None,
                source: None,
                url: None,
                url_to_image: None,
                published_at: None,
            })
            .collect();
        let shown = featured_carousel(headlines);
        assert_eq!(shown.len(), FEATURED_CAROUSEL_LIMIT);
        assert_eq!(shown[0].title.as_deref(), Some("headline 0"));
        assert_eq!(shown[9].title.as_deref(), Some("headline 9"));

        let few = featured_carousel(vec![]);
        assert!(few.is_empty());
    }
}
