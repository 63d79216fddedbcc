//! Category resolution and matching for menu items.
//!
//! Nutrislice carries a category in two places: on the menu item itself and
//! on its nested food record. The item-level value wins when present. Both
//! the state string and the attribute payload go through `resolve_category`.

use crate::types::MenuItem;

/// Requested names that stand for a group of API categories.
const SIDES_ALIASES: &[&str] = &["vegetable", "fruit", "grain"];

/// The category an item is filed under, lowercased. `None` if neither the
/// item nor its food record carries one.
pub fn resolve_category(item: &MenuItem) -> Option<&str> {
    item.item_category
        .as_deref()
        .filter(|c| !c.is_empty())
        .or_else(|| item.food_category.as_deref().filter(|c| !c.is_empty()))
}

/// Normalize a raw category value from the API or from config.
pub fn normalize_category(raw: &str) -> Option<String> {
    let value = raw.trim().to_lowercase();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Whether an item category satisfies a requested (configured) category.
///
/// Exact match, then the `sides` alias group, then a prefix match in either
/// direction against the requested name and its aliases. The prefix rule
/// absorbs drift like `entree` vs `entrees`; empty values never match.
pub fn matches(item_category: &str, requested: &str) -> bool {
    let cat = item_category.trim().to_lowercase();
    let wanted = requested.trim().to_lowercase();
    if cat.is_empty() || wanted.is_empty() {
        return false;
    }
    if cat == wanted {
        return true;
    }

    candidates(&wanted)
        .iter()
        .any(|alias| cat == *alias || cat.starts_with(alias) || alias.starts_with(cat.as_str()))
}

fn candidates(wanted: &str) -> Vec<&str> {
    let mut out = vec![wanted];
    if wanted == "sides" || wanted == "side" {
        out.extend_from_slice(SIDES_ALIASES);
    }
    out
}

/// Whether an item counts toward the requested category.
pub fn item_matches(item: &MenuItem, requested: &str) -> bool {
    resolve_category(item)
        .map(|cat| matches(cat, requested))
        .unwrap_or(false)
}
