//! Fuzzy category match between a shipment's crop and inventory categories.

use crate::InventoryItem;

/// Case-insensitive substring test: does `category` contain `crop`?
///
/// "Super Basmati" matches crop "basmati"; an empty crop matches nothing.
pub fn category_matches(category: &str, crop: &str) -> bool {
    let crop = crop.trim();
    if crop.is_empty() {
        return false;
    }
    category.to_lowercase().contains(&crop.to_lowercase())
}

/// First item, by creation time, whose category matches `crop`.
pub fn find_matching_item<'a>(
    items: impl IntoIterator<Item = &'a InventoryItem>,
    crop: &str,
) -> Option<&'a InventoryItem> {
    items
        .into_iter()
        .filter(|i| category_matches(&i.category, crop))
        .min_by_key(|i| (i.created_at, i.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use grainbridge_core::ItemId;

    fn item(category: &str, age_minutes: i64) -> InventoryItem {
        let created = Utc::now() - Duration::minutes(age_minutes);
        InventoryItem {
            id: ItemId::new(),
            name: format!("{category} bags"),
            category: category.to_string(),
            quantity: 10,
            price_per_bag: 1.0,
            supplier: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn substring_match_ignores_case() {
        assert!(category_matches("Super Basmati", "Basmati"));
        assert!(category_matches("BASMATI", "basmati"));
        assert!(category_matches("Parboiled Sella", "sella"));
        assert!(!category_matches("Non-Basmati", "Kainat"));
        assert!(!category_matches("Basmati", "  "));
    }

    #[test]
    fn oldest_matching_item_wins() {
        let items = vec![item("Organic", 30), item("Basmati", 10), item("Basmati Premium", 20)];
        let found = find_matching_item(&items, "Basmati").unwrap();
        assert_eq!(found.category, "Basmati Premium");
    }

    #[test]
    fn no_match_returns_none() {
        let items = vec![item("Feed", 1)];
        assert!(find_matching_item(&items, "Brown").is_none());
    }
}
