use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Suffix appended to a branch name to form its stock-map key.
pub const STOCK_KEY_SUFFIX: &str = "_stock";

/// Branches reported when no product carries stock rows yet.
pub const DEFAULT_BRANCHES: [&str; 2] = ["mirpur", "bashundhara"];

/// A named stock-keeping location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Normalize a branch name; `None` unless it is non-empty ASCII alphanumeric.
pub fn normalize_branch_name(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}

/// Stock-map key for `branch`, e.g. `mirpur_stock`.
pub fn stock_key(branch: &str) -> String {
    format!("{branch}{STOCK_KEY_SUFFIX}")
}

/// Extract the branch from a `<branch>_stock` key.
pub fn branch_from_stock_key(key: &str) -> Option<String> {
    key.trim()
        .strip_suffix(STOCK_KEY_SUFFIX)
        .and_then(normalize_branch_name)
}
