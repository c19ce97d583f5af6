use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::branch::{branch_from_stock_key, normalize_branch_name, stock_key};
use crate::domain::category::normalize_category_name;
use crate::domain::product::{
    BranchSpecification, MAX_PRODUCT_IMAGES, NewProduct, ProductImage, ProductStatus, StockMap,
    UpdateProduct,
};
use crate::forms::{
    IdInput, InvalidId, optional_inline, sanitize_inline_text, sanitize_multiline_text,
};

const NAME_MAX_LEN: u64 = 100;
const DESCRIPTION_MAX_LEN: u64 = 2000;
const ATTRIBUTE_MAX_LEN: u64 = 100;
const CATEGORY_MAX_LEN: u64 = 50;
const BARCODE_MAX_LEN: u64 = 64;
const MAX_TAGS: usize = 20;
const TAG_MAX_LEN: usize = 50;

/// Highest accepted price, in cents (1,000,000.00).
const MAX_PRICE_CENTS: i64 = 100_000_000;
/// Highest stock count accepted for one branch.
pub const MAX_STOCK_PER_BRANCH: i64 = 10_000;

pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product payloads.
#[derive(Debug, Error)]
pub enum ProductFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("product name cannot be empty")]
    EmptyName,
    #[error("{field} must be a number between 0 and 1000000")]
    InvalidPrice { field: &'static str },
    #[error("barcode may only contain letters, digits and `-`")]
    InvalidBarcode,
    #[error("at most 20 tags are allowed")]
    TooManyTags,
    #[error("tag `{0}` is longer than 50 characters")]
    TagTooLong(String),
    #[error("invalid stock key `{0}`, expected `<branch>_stock` with an alphanumeric branch")]
    InvalidStockKey(String),
    #[error("stock for `{key}` must be between 0 and 10000, got {value}")]
    StockOutOfRange { key: String, value: i64 },
    #[error("invalid branch `{0}`")]
    InvalidBranch(String),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: u64 },
    #[error("invalid status `{0}`, expected active, inactive or draft")]
    InvalidStatus(String),
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
}

/// Price that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// Convert to cents, rounding to two decimals. A blank string yields `None`.
    fn to_cents(&self, field: &'static str) -> ProductFormResult<Option<i64>> {
        let value = match self {
            PriceInput::Number(value) => *value,
            PriceInput::Text(text) if text.trim().is_empty() => return Ok(None),
            PriceInput::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| ProductFormError::InvalidPrice { field })?,
        };

        if !value.is_finite() || value < 0.0 {
            return Err(ProductFormError::InvalidPrice { field });
        }

        let cents = (value * 100.0).round() as i64;
        if cents > MAX_PRICE_CENTS {
            return Err(ProductFormError::InvalidPrice { field });
        }

        Ok(Some(cents))
    }
}

/// One entry of the image order submitted with an update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOrderEntry {
    pub url: Option<String>,
    pub public_id: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Product payload accepted by create (`action` absent) and `action: "update"`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    /// Target product; required for updates.
    pub id: Option<IdInput>,
    #[validate(length(max = NAME_MAX_LEN))]
    pub name: Option<String>,
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    pub description: Option<String>,
    #[validate(length(max = ATTRIBUTE_MAX_LEN))]
    pub brand: Option<String>,
    #[validate(length(max = CATEGORY_MAX_LEN))]
    pub category: Option<String>,
    #[validate(length(max = CATEGORY_MAX_LEN))]
    pub subcategory: Option<String>,
    #[validate(length(max = BARCODE_MAX_LEN))]
    pub barcode: Option<String>,
    pub tags: Option<Vec<String>>,
    pub price: Option<PriceInput>,
    pub compare_at_price: Option<PriceInput>,
    #[validate(length(max = ATTRIBUTE_MAX_LEN))]
    pub nicotine_strength: Option<String>,
    #[validate(length(max = ATTRIBUTE_MAX_LEN))]
    pub vg_pg_ratio: Option<String>,
    #[validate(length(max = ATTRIBUTE_MAX_LEN))]
    pub flavor: Option<String>,
    #[validate(length(max = ATTRIBUTE_MAX_LEN))]
    pub resistance: Option<String>,
    #[validate(length(max = ATTRIBUTE_MAX_LEN))]
    pub wattage_range: Option<String>,
    pub branch_specifications: Option<BTreeMap<String, BranchSpecification>>,
    pub stock: Option<BTreeMap<String, i64>>,
    pub status: Option<String>,
    /// Replacement image order; update only.
    pub images: Option<Vec<ImageOrderEntry>>,
}

impl ProductForm {
    /// Validate and sanitize into a domain `NewProduct`. Name, price and category are required.
    pub fn into_new_product(self) -> ProductFormResult<NewProduct> {
        self.validate()?;

        let name = match self.name.as_deref() {
            Some(name) => sanitize_inline_text(name),
            None => return Err(ProductFormError::MissingField("name")),
        };
        if name.is_empty() {
            return Err(ProductFormError::EmptyName);
        }

        let category = optional_inline(self.category.as_deref())
            .map(|category| normalize_category_name(&category))
            .ok_or(ProductFormError::MissingField("category"))?;

        let price_cents = match self.price.as_ref() {
            Some(price) => price.to_cents("price")?,
            None => None,
        }
        .ok_or(ProductFormError::MissingField("price"))?;

        let mut product = NewProduct::new(name, category, price_cents);
        product.description = optional_multiline(self.description.as_deref());
        product.brand = optional_inline(self.brand.as_deref());
        product.subcategory = optional_inline(self.subcategory.as_deref());
        product.barcode = parse_barcode(self.barcode.as_deref())?;
        product.tags = match self.tags.as_deref() {
            Some(tags) => sanitize_tags(tags)?,
            None => Vec::new(),
        };
        product.compare_at_price_cents = match self.compare_at_price.as_ref() {
            Some(price) => price.to_cents("compareAtPrice")?,
            None => None,
        };
        product.nicotine_strength = optional_inline(self.nicotine_strength.as_deref());
        product.vg_pg_ratio = optional_inline(self.vg_pg_ratio.as_deref());
        product.flavor = optional_inline(self.flavor.as_deref());
        product.resistance = optional_inline(self.resistance.as_deref());
        product.wattage_range = optional_inline(self.wattage_range.as_deref());
        if let Some(specifications) = self.branch_specifications {
            product.branch_specifications = sanitize_branch_specifications(specifications)?;
        }
        if let Some(stock) = self.stock.as_ref() {
            product.stock = validate_stock(stock)?;
        }
        if let Some(status) = self.status.as_deref() {
            product.status = parse_status(status)?;
        }

        Ok(product)
    }

    /// Validate and sanitize into the target id plus a domain `UpdateProduct`.
    ///
    /// Absent fields stay untouched; a blank optional field clears the stored value.
    pub fn into_update_product(self) -> ProductFormResult<(i32, UpdateProduct)> {
        self.validate()?;

        let id = self
            .id
            .as_ref()
            .ok_or(ProductFormError::MissingField("id"))?
            .resolve("id")?;

        let mut updates = UpdateProduct::new();

        if let Some(name) = self.name.as_deref() {
            let name = sanitize_inline_text(name);
            if name.is_empty() {
                return Err(ProductFormError::EmptyName);
            }
            updates.name = Some(name);
        }

        if let Some(category) = self.category.as_deref() {
            let category = sanitize_inline_text(category);
            if category.is_empty() {
                return Err(ProductFormError::MissingField("category"));
            }
            updates.category = Some(normalize_category_name(&category));
        }

        if let Some(price) = self.price.as_ref() {
            updates.price_cents =
                Some(price.to_cents("price")?.ok_or(ProductFormError::MissingField("price"))?);
        }

        if let Some(price) = self.compare_at_price.as_ref() {
            updates.compare_at_price_cents = Some(price.to_cents("compareAtPrice")?);
        }

        if let Some(barcode) = self.barcode.as_deref() {
            updates.barcode = Some(parse_barcode(Some(barcode))?);
        }

        if let Some(tags) = self.tags.as_deref() {
            updates.tags = Some(sanitize_tags(tags)?);
        }

        updates.description = self
            .description
            .as_deref()
            .map(|value| optional_multiline(Some(value)));
        updates.brand = patch_inline(self.brand.as_deref());
        updates.subcategory = patch_inline(self.subcategory.as_deref());
        updates.nicotine_strength = patch_inline(self.nicotine_strength.as_deref());
        updates.vg_pg_ratio = patch_inline(self.vg_pg_ratio.as_deref());
        updates.flavor = patch_inline(self.flavor.as_deref());
        updates.resistance = patch_inline(self.resistance.as_deref());
        updates.wattage_range = patch_inline(self.wattage_range.as_deref());

        if let Some(specifications) = self.branch_specifications {
            updates.branch_specifications = Some(sanitize_branch_specifications(specifications)?);
        }

        if let Some(stock) = self.stock.as_ref() {
            updates.stock = Some(validate_stock(stock)?);
        }

        if let Some(status) = self.status.as_deref() {
            updates.status = Some(parse_status(status)?);
        }

        if let Some(entries) = self.images {
            updates.images = Some(order_images(entries));
        }

        Ok((id, updates))
    }
}

fn optional_multiline(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_multiline_text)
        .filter(|value| !value.is_empty())
}

fn patch_inline(input: Option<&str>) -> Option<Option<String>> {
    input.map(|value| optional_inline(Some(value)))
}

fn parse_barcode(input: Option<&str>) -> ProductFormResult<Option<String>> {
    let Some(barcode) = input.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    if !barcode
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
    {
        return Err(ProductFormError::InvalidBarcode);
    }

    Ok(Some(barcode.to_string()))
}

/// Trim tags, drop blanks and duplicates (ignoring case), keep the first spelling.
fn sanitize_tags(tags: &[String]) -> ProductFormResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for tag in tags {
        let tag = sanitize_inline_text(tag);
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > TAG_MAX_LEN {
            return Err(ProductFormError::TagTooLong(tag));
        }
        if seen.insert(tag.to_lowercase()) {
            result.push(tag);
        }
    }

    if result.len() > MAX_TAGS {
        return Err(ProductFormError::TooManyTags);
    }

    Ok(result)
}

fn validate_stock(stock: &BTreeMap<String, i64>) -> ProductFormResult<StockMap> {
    let mut validated = StockMap::new();

    for (key, value) in stock {
        let branch = branch_from_stock_key(key)
            .ok_or_else(|| ProductFormError::InvalidStockKey(key.clone()))?;

        if !(0..=MAX_STOCK_PER_BRANCH).contains(value) {
            return Err(ProductFormError::StockOutOfRange {
                key: key.clone(),
                value: *value,
            });
        }

        validated.insert(stock_key(&branch), *value as i32);
    }

    Ok(validated)
}

fn sanitize_branch_specifications(
    specifications: BTreeMap<String, BranchSpecification>,
) -> ProductFormResult<BTreeMap<String, BranchSpecification>> {
    let mut sanitized = BTreeMap::new();

    for (branch, specification) in specifications {
        let name = normalize_branch_name(&branch)
            .ok_or_else(|| ProductFormError::InvalidBranch(branch.clone()))?;

        let specification = BranchSpecification {
            nicotine_strength: bounded_attribute(
                "nicotineStrength",
                specification.nicotine_strength,
            )?,
            vg_pg_ratio: bounded_attribute("vgPgRatio", specification.vg_pg_ratio)?,
            flavor: bounded_attribute("flavor", specification.flavor)?,
            resistance: bounded_attribute("resistance", specification.resistance)?,
            wattage_range: bounded_attribute("wattageRange", specification.wattage_range)?,
        };

        if !specification.is_empty() {
            sanitized.insert(name, specification);
        }
    }

    Ok(sanitized)
}

fn bounded_attribute(
    field: &'static str,
    value: Option<String>,
) -> ProductFormResult<Option<String>> {
    let value = optional_inline(value.as_deref());
    if let Some(text) = value.as_deref()
        && text.chars().count() as u64 > ATTRIBUTE_MAX_LEN
    {
        return Err(ProductFormError::TooLong {
            field,
            max: ATTRIBUTE_MAX_LEN,
        });
    }
    Ok(value)
}

fn parse_status(value: &str) -> ProductFormResult<ProductStatus> {
    value
        .parse::<ProductStatus>()
        .map_err(|_| ProductFormError::InvalidStatus(value.trim().to_string()))
}

/// Keep entries that reference an uploaded asset, in the submitted order, up to the image cap.
fn order_images(entries: Vec<ImageOrderEntry>) -> Vec<ProductImage> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let public_id = entry.public_id.map(|value| value.trim().to_string())?;
            let url = entry.url.map(|value| value.trim().to_string())?;
            if public_id.is_empty() || url.is_empty() {
                return None;
            }
            Some(ProductImage {
                url,
                public_id,
                alt: entry
                    .alt
                    .as_deref()
                    .map(sanitize_inline_text)
                    .unwrap_or_default(),
            })
        })
        .take(MAX_PRODUCT_IMAGES)
        .collect()
}
