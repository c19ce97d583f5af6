use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Category tile promoted on the storefront home page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedCategory {
    pub id: i32,
    pub category: String,
    pub subcategory: Option<String>,
    pub title: String,
    pub image_url: Option<String>,
    /// Display order, ascending.
    pub position: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Values written when creating or replacing a featured category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedCategoryData {
    pub category: String,
    pub subcategory: Option<String>,
    pub title: String,
    pub image_url: Option<String>,
    pub position: i32,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}
