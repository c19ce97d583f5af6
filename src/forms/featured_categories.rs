use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::normalize_category_name;
use crate::domain::featured_category::FeaturedCategoryData;
use crate::forms::{IdInput, InvalidId, optional_inline, sanitize_inline_text};

#[derive(Debug, Error)]
pub enum FeaturedCategoryFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
}

/// Create (no `id`) or replace (with `id`) a featured category tile.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedCategoryForm {
    pub id: Option<IdInput>,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(max = 50))]
    pub subcategory: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(url, length(max = 500))]
    pub image_url: Option<String>,
    #[validate(range(min = 0, max = 1000))]
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl FeaturedCategoryForm {
    /// Target id (when replacing) and the sanitized values.
    pub fn into_data(
        self,
    ) -> Result<(Option<i32>, FeaturedCategoryData), FeaturedCategoryFormError> {
        self.validate()?;

        let id = self.id.as_ref().map(|id| id.resolve("id")).transpose()?;

        let category = sanitize_inline_text(&self.category);
        if category.is_empty() {
            return Err(FeaturedCategoryFormError::Empty("category"));
        }
        let title = sanitize_inline_text(&self.title);
        if title.is_empty() {
            return Err(FeaturedCategoryFormError::Empty("title"));
        }

        Ok((
            id,
            FeaturedCategoryData {
                category: normalize_category_name(&category),
                subcategory: optional_inline(self.subcategory.as_deref()),
                title,
                image_url: optional_inline(self.image_url.as_deref()),
                position: self.position,
                is_active: self.is_active,
                updated_at: chrono::Utc::now().naive_utc(),
            },
        ))
    }
}
