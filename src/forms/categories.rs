use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::normalize_category_name;
use crate::forms::sanitize_inline_text;

const CATEGORY_NAME_MIN_LEN: u64 = 2;
const CATEGORY_NAME_MAX_LEN: u64 = 50;
const SUBCATEGORY_MAX_LEN: u64 = 50;

/// Result type returned by the taxonomy form helpers.
pub type CategoryFormResult<T> = Result<T, CategoryFormError>;

/// Errors that can occur while processing taxonomy payloads.
#[derive(Debug, Error)]
pub enum CategoryFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("category name cannot be empty")]
    EmptyName,
    #[error("subcategory name cannot be empty")]
    EmptySubcategory,
    /// The name contains characters other than letters, digits, spaces, `&` and `-`.
    #[error("category name `{0}` may only contain letters, digits, spaces, `&` and `-`")]
    InvalidName(String),
}

/// Payload of `action: "add_category"`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCategoryForm {
    #[validate(length(min = CATEGORY_NAME_MIN_LEN, max = CATEGORY_NAME_MAX_LEN))]
    pub name: String,
    #[serde(default)]
    pub subcategories: Option<Vec<String>>,
}

/// Sanitized category name plus its initial subcategories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategoryInput {
    pub name: String,
    pub subcategories: Vec<String>,
}

impl AddCategoryForm {
    pub fn into_input(self) -> CategoryFormResult<NewCategoryInput> {
        self.validate()?;

        let name = sanitize_category_name(&self.name)?;

        let mut subcategories: Vec<String> = Vec::new();
        for subcategory in self.subcategories.unwrap_or_default() {
            let Ok(subcategory) = sanitize_subcategory(&subcategory) else {
                continue;
            };
            let duplicate = subcategories
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(&subcategory));
            if !duplicate {
                subcategories.push(subcategory);
            }
        }

        Ok(NewCategoryInput {
            name,
            subcategories,
        })
    }
}

/// Payload of `action: "delete_category"`.
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteCategoryForm {
    #[validate(length(min = 1, max = CATEGORY_NAME_MAX_LEN))]
    pub name: String,
}

impl DeleteCategoryForm {
    /// Normalized (uppercase) name of the category to delete.
    pub fn into_name(self) -> CategoryFormResult<String> {
        self.validate()?;
        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(CategoryFormError::EmptyName);
        }
        Ok(normalize_category_name(&name))
    }
}

/// Payload of `action: "add_subcategory"` and `action: "delete_subcategory"`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubcategoryForm {
    #[validate(length(min = 1, max = CATEGORY_NAME_MAX_LEN))]
    pub category: String,
    #[validate(length(min = 1, max = SUBCATEGORY_MAX_LEN))]
    pub subcategory: String,
}

/// Normalized category name and sanitized subcategory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryInput {
    pub category: String,
    pub subcategory: String,
}

impl SubcategoryForm {
    pub fn into_input(self) -> CategoryFormResult<SubcategoryInput> {
        self.validate()?;

        let category = sanitize_inline_text(&self.category);
        if category.is_empty() {
            return Err(CategoryFormError::EmptyName);
        }

        Ok(SubcategoryInput {
            category: normalize_category_name(&category),
            subcategory: sanitize_subcategory(&self.subcategory)?,
        })
    }
}

fn sanitize_category_name(input: &str) -> CategoryFormResult<String> {
    let name = sanitize_inline_text(input);
    if name.is_empty() {
        return Err(CategoryFormError::EmptyName);
    }

    if !name
        .chars()
        .all(|ch| ch.is_alphanumeric() || ch == ' ' || ch == '&' || ch == '-')
    {
        return Err(CategoryFormError::InvalidName(name));
    }

    if (name.chars().count() as u64) < CATEGORY_NAME_MIN_LEN {
        return Err(CategoryFormError::EmptyName);
    }

    Ok(normalize_category_name(&name))
}

fn sanitize_subcategory(input: &str) -> CategoryFormResult<String> {
    let subcategory = sanitize_inline_text(input);
    if subcategory.is_empty() {
        return Err(CategoryFormError::EmptySubcategory);
    }
    Ok(subcategory)
}
