use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Category name to its ordered subcategories.
pub type Taxonomy = BTreeMap<String, Vec<String>>;

lazy_static! {
    /// Categories shipped with the storefront. Custom rows with the same name override them.
    static ref DEFAULT_CATEGORIES: Taxonomy = {
        let entries: [(&str, &[&str]); 6] = [
            ("E-LIQUID", &["Freebase", "Nic Salt", "Shortfill", "Disposable Pod Juice"]),
            ("DEVICES", &["Pod System", "Box Mod", "Starter Kit", "Pen Style"]),
            ("DISPOSABLES", &["Puff Bar", "Rechargeable", "Zero Nicotine"]),
            ("COILS & PODS", &["Replacement Coils", "Replacement Pods", "RBA"]),
            ("TANKS", &["Sub-Ohm", "MTL", "Rebuildable"]),
            ("ACCESSORIES", &["Batteries", "Chargers", "Cases", "Cotton & Wire"]),
        ];
        entries
            .iter()
            .map(|(name, subcategories)| {
                (
                    name.to_string(),
                    subcategories.iter().map(|value| value.to_string()).collect(),
                )
            })
            .collect()
    };
}

/// Admin-managed taxonomy entry persisted alongside the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomCategory {
    pub id: i32,
    /// Uppercase, unique category name.
    pub name: String,
    pub subcategories: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a custom category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomCategory {
    pub name: String,
    pub subcategories: Vec<String>,
}

impl NewCustomCategory {
    pub fn new(name: impl AsRef<str>, subcategories: Vec<String>) -> Self {
        Self {
            name: normalize_category_name(name.as_ref()),
            subcategories,
        }
    }
}

/// Canonical (uppercase, trimmed) form of a category name.
pub fn normalize_category_name(name: &str) -> String {
    name.trim().to_uppercase()
}

pub fn is_builtin_category(name: &str) -> bool {
    DEFAULT_CATEGORIES.contains_key(&normalize_category_name(name))
}

/// Subcategories of a built-in category.
pub fn default_subcategories(name: &str) -> Option<Vec<String>> {
    DEFAULT_CATEGORIES.get(&normalize_category_name(name)).cloned()
}

/// Merge the built-in defaults with custom rows; a custom row replaces the default of the same
/// name.
pub fn merge_taxonomy(custom: &[CustomCategory]) -> Taxonomy {
    let mut merged = DEFAULT_CATEGORIES.clone();
    for category in custom {
        merged.insert(
            normalize_category_name(&category.name),
            category.subcategories.clone(),
        );
    }
    merged
}

/// Find the stored spelling of `subcategory` within `subcategories`, ignoring case.
pub fn find_subcategory<'a>(subcategories: &'a [String], subcategory: &str) -> Option<&'a str> {
    let needle = subcategory.trim().to_lowercase();
    subcategories
        .iter()
        .find(|value| value.to_lowercase() == needle)
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(name: &str, subcategories: &[&str]) -> CustomCategory {
        CustomCategory {
            id: 1,
            name: name.to_string(),
            subcategories: subcategories.iter().map(|s| s.to_string()).collect(),
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn custom_rows_override_defaults() {
        let merged = merge_taxonomy(&[
            custom("DEVICES", &["Pod System"]),
            custom("HOOKAH", &["Shisha"]),
        ]);

        assert_eq!(merged.get("DEVICES"), Some(&vec!["Pod System".to_string()]));
        assert_eq!(merged.get("HOOKAH"), Some(&vec!["Shisha".to_string()]));
        assert!(merged.contains_key("E-LIQUID"));
    }

    #[test]
    fn builtin_lookup_ignores_case() {
        assert!(is_builtin_category(" e-liquid "));
        assert!(!is_builtin_category("hookah"));
        assert!(default_subcategories("tanks").is_some_and(|subs| subs.len() == 3));
    }

    #[test]
    fn find_subcategory_returns_stored_spelling() {
        let subs = vec!["Nic Salt".to_string(), "Freebase".to_string()];
        assert_eq!(find_subcategory(&subs, "nic salt"), Some("Nic Salt"));
        assert_eq!(find_subcategory(&subs, "Shortfill"), None);
    }
}
