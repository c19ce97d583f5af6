use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::branch::stock_key;
use crate::pagination::Pagination;

/// Maximum number of images a product may hold.
pub const MAX_PRODUCT_IMAGES: usize = 10;

/// Stock counts keyed by `<branch>_stock`.
pub type StockMap = BTreeMap<String, i32>;

/// Visibility flag of a product. Only `Active` products reach public callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            "draft" => Ok(ProductStatus::Draft),
            other => Err(format!("unknown product status `{other}`")),
        }
    }
}

/// Attribute set a single branch offers for a catalog item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BranchSpecification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nicotine_strength: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vg_pg_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wattage_range: Option<String>,
}

impl BranchSpecification {
    pub fn is_empty(&self) -> bool {
        self.nicotine_strength.is_none()
            && self.vg_pg_ratio.is_none()
            && self.flavor.is_none()
            && self.resistance.is_none()
            && self.wattage_range.is_none()
    }
}

/// Image stored on the media CDN. The first image of a product is its primary image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    /// Media-store identifier used to delete the asset.
    pub public_id: String,
    #[serde(default)]
    pub alt: String,
}

/// Domain representation of a sellable catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    /// Uppercase taxonomy category name.
    pub category: String,
    pub subcategory: Option<String>,
    /// Unique across the catalog when present.
    pub barcode: Option<String>,
    pub tags: Vec<String>,
    /// Price represented in the smallest currency unit.
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub nicotine_strength: Option<String>,
    pub vg_pg_ratio: Option<String>,
    pub flavor: Option<String>,
    pub resistance: Option<String>,
    pub wattage_range: Option<String>,
    pub branch_specifications: BTreeMap<String, BranchSpecification>,
    pub stock: StockMap,
    pub images: Vec<ProductImage>,
    pub status: ProductStatus,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.first()
    }

    /// Stock held by `branch`, zero when the product has no entry for it.
    pub fn stock_for_branch(&self, branch: &str) -> i32 {
        self.stock.get(&stock_key(branch)).copied().unwrap_or(0)
    }

    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// Payload required to insert a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub barcode: Option<String>,
    pub tags: Vec<String>,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub nicotine_strength: Option<String>,
    pub vg_pg_ratio: Option<String>,
    pub flavor: Option<String>,
    pub resistance: Option<String>,
    pub wattage_range: Option<String>,
    pub branch_specifications: BTreeMap<String, BranchSpecification>,
    pub stock: StockMap,
    pub status: ProductStatus,
    /// Subject of the acting user.
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
}

impl NewProduct {
    /// Build a new product payload with the required fields and current timestamp.
    pub fn new(name: impl Into<String>, category: impl Into<String>, price_cents: i64) -> Self {
        Self {
            name: name.into(),
            description: None,
            brand: None,
            category: category.into(),
            subcategory: None,
            barcode: None,
            tags: Vec::new(),
            price_cents,
            compare_at_price_cents: None,
            nicotine_strength: None,
            vg_pg_ratio: None,
            flavor: None,
            resistance: None,
            wattage_range: None,
            branch_specifications: BTreeMap::new(),
            stock: StockMap::new(),
            status: ProductStatus::default(),
            created_by: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    pub fn with_stock(mut self, stock: StockMap) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = status;
        self
    }

    pub fn created_by(mut self, subject: impl Into<String>) -> Self {
        self.created_by = Some(subject.into());
        self
    }
}

/// Patch applied to an existing product. `None` leaves a field untouched;
/// `Some(None)` clears a nullable field.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub brand: Option<Option<String>>,
    pub category: Option<String>,
    pub subcategory: Option<Option<String>>,
    pub barcode: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub price_cents: Option<i64>,
    pub compare_at_price_cents: Option<Option<i64>>,
    pub nicotine_strength: Option<Option<String>>,
    pub vg_pg_ratio: Option<Option<String>>,
    pub flavor: Option<Option<String>>,
    pub resistance: Option<Option<String>>,
    pub wattage_range: Option<Option<String>>,
    pub branch_specifications: Option<BTreeMap<String, BranchSpecification>>,
    /// Stock keys to upsert; keys absent from the map keep their value.
    pub stock: Option<StockMap>,
    /// Replacement image list, in display order.
    pub images: Option<Vec<ProductImage>>,
    pub status: Option<ProductStatus>,
    pub updated_by: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateProduct {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProduct {
    /// Create a new patch object with no changes applied yet.
    pub fn new() -> Self {
        Self {
            name: None,
            description: None,
            brand: None,
            category: None,
            subcategory: None,
            barcode: None,
            tags: None,
            price_cents: None,
            compare_at_price_cents: None,
            nicotine_strength: None,
            vg_pg_ratio: None,
            flavor: None,
            resistance: None,
            wattage_range: None,
            branch_specifications: None,
            stock: None,
            images: None,
            status: None,
            updated_by: None,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn barcode(mut self, barcode: Option<impl Into<String>>) -> Self {
        self.barcode = Some(barcode.map(|value| value.into()));
        self
    }

    pub fn images(mut self, images: Vec<ProductImage>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn updated_by(mut self, subject: impl Into<String>) -> Self {
        self.updated_by = Some(subject.into());
        self
    }

    /// The new barcode value when the patch sets one.
    pub fn new_barcode(&self) -> Option<&str> {
        self.barcode.as_ref().and_then(|value| value.as_deref())
    }
}

/// Query definition used to list products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListQuery {
    /// Case-insensitive literal substring matched against name, description, brand and flavor.
    pub search: Option<String>,
    /// Case-insensitive exact category match.
    pub category: Option<String>,
    /// Case-insensitive exact subcategory match.
    pub subcategory: Option<String>,
    /// Restrict to one status; `None` returns every status.
    pub status: Option<ProductStatus>,
    /// Branch the in-stock filter applies to.
    pub branch: Option<String>,
    /// Keep only products with positive stock.
    pub in_stock: bool,
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn status(mut self, status: ProductStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn in_stock(mut self) -> Self {
        self.in_stock = true;
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
