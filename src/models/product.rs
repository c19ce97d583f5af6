use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::branch::{branch_from_stock_key, stock_key};
use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, ProductImage as DomainProductImage,
    ProductStatus, StockMap, UpdateProduct as DomainUpdateProduct,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub barcode: Option<String>,
    pub tags: String,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub nicotine_strength: Option<String>,
    pub vg_pg_ratio: Option<String>,
    pub flavor: Option<String>,
    pub resistance: Option<String>,
    pub wattage_range: Option<String>,
    pub branch_specifications: String,
    pub status: String,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::product_stocks)]
#[diesel(belongs_to(Product, foreign_key = product_id))]
pub struct ProductStock {
    pub id: i32,
    pub product_id: i32,
    pub branch: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::product_images)]
#[diesel(belongs_to(Product, foreign_key = product_id))]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub position: i32,
    pub url: String,
    pub public_id: String,
    pub alt_text: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub brand: Option<&'a str>,
    pub category: &'a str,
    pub subcategory: Option<&'a str>,
    pub barcode: Option<&'a str>,
    pub tags: String,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub nicotine_strength: Option<&'a str>,
    pub vg_pg_ratio: Option<&'a str>,
    pub flavor: Option<&'a str>,
    pub resistance: Option<&'a str>,
    pub wattage_range: Option<&'a str>,
    pub branch_specifications: String,
    pub status: &'a str,
    pub created_by: Option<&'a str>,
    pub updated_by: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_stocks)]
pub struct NewProductStock<'a> {
    pub product_id: i32,
    pub branch: &'a str,
    pub quantity: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct NewProductImage<'a> {
    pub product_id: i32,
    pub position: i32,
    pub url: &'a str,
    pub public_id: &'a str,
    pub alt_text: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProduct<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub brand: Option<Option<&'a str>>,
    pub category: Option<&'a str>,
    pub subcategory: Option<Option<&'a str>>,
    pub barcode: Option<Option<&'a str>>,
    pub tags: Option<String>,
    pub price_cents: Option<i64>,
    pub compare_at_price_cents: Option<Option<i64>>,
    pub nicotine_strength: Option<Option<&'a str>>,
    pub vg_pg_ratio: Option<Option<&'a str>>,
    pub flavor: Option<Option<&'a str>>,
    pub resistance: Option<Option<&'a str>>,
    pub wattage_range: Option<Option<&'a str>>,
    pub branch_specifications: Option<String>,
    pub status: Option<&'a str>,
    pub updated_by: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Assemble the domain product from its row plus stock and image rows.
    pub fn into_domain(
        self,
        stocks: Vec<ProductStock>,
        mut images: Vec<ProductImage>,
    ) -> RepositoryResult<DomainProduct> {
        let tags: Vec<String> = serde_json::from_str(&self.tags)?;
        let branch_specifications = serde_json::from_str(&self.branch_specifications)?;
        let status = self
            .status
            .parse::<ProductStatus>()
            .map_err(RepositoryError::Corrupt)?;

        let stock: StockMap = stocks
            .into_iter()
            .map(|row| (stock_key(&row.branch), row.quantity))
            .collect();

        images.sort_by_key(|image| image.position);
        let images = images.into_iter().map(DomainProductImage::from).collect();

        Ok(DomainProduct {
            id: self.id,
            name: self.name,
            description: self.description,
            brand: self.brand,
            category: self.category,
            subcategory: self.subcategory,
            barcode: self.barcode,
            tags,
            price_cents: self.price_cents,
            compare_at_price_cents: self.compare_at_price_cents,
            nicotine_strength: self.nicotine_strength,
            vg_pg_ratio: self.vg_pg_ratio,
            flavor: self.flavor,
            resistance: self.resistance,
            wattage_range: self.wattage_range,
            branch_specifications,
            stock,
            images,
            status,
            created_by: self.created_by,
            updated_by: self.updated_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<ProductImage> for DomainProductImage {
    fn from(value: ProductImage) -> Self {
        Self {
            url: value.url,
            public_id: value.public_id,
            alt: value.alt_text,
        }
    }
}

impl<'a> TryFrom<&'a DomainNewProduct> for NewProduct<'a> {
    type Error = RepositoryError;

    fn try_from(value: &'a DomainNewProduct) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name.as_str(),
            description: value.description.as_deref(),
            brand: value.brand.as_deref(),
            category: value.category.as_str(),
            subcategory: value.subcategory.as_deref(),
            barcode: value.barcode.as_deref(),
            tags: serde_json::to_string(&value.tags)?,
            price_cents: value.price_cents,
            compare_at_price_cents: value.compare_at_price_cents,
            nicotine_strength: value.nicotine_strength.as_deref(),
            vg_pg_ratio: value.vg_pg_ratio.as_deref(),
            flavor: value.flavor.as_deref(),
            resistance: value.resistance.as_deref(),
            wattage_range: value.wattage_range.as_deref(),
            branch_specifications: serde_json::to_string(&value.branch_specifications)?,
            status: value.status.as_str(),
            created_by: value.created_by.as_deref(),
            updated_by: value.created_by.as_deref(),
            created_at: value.created_at,
            updated_at: value.created_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainUpdateProduct> for UpdateProduct<'a> {
    type Error = RepositoryError;

    fn try_from(value: &'a DomainUpdateProduct) -> Result<Self, Self::Error> {
        let tags = value.tags.as_ref().map(serde_json::to_string).transpose()?;
        let branch_specifications = value
            .branch_specifications
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        Ok(Self {
            name: value.name.as_deref(),
            description: value.description.as_ref().map(Option::as_deref),
            brand: value.brand.as_ref().map(Option::as_deref),
            category: value.category.as_deref(),
            subcategory: value.subcategory.as_ref().map(Option::as_deref),
            barcode: value.barcode.as_ref().map(Option::as_deref),
            tags,
            price_cents: value.price_cents,
            compare_at_price_cents: value.compare_at_price_cents,
            nicotine_strength: value.nicotine_strength.as_ref().map(Option::as_deref),
            vg_pg_ratio: value.vg_pg_ratio.as_ref().map(Option::as_deref),
            flavor: value.flavor.as_ref().map(Option::as_deref),
            resistance: value.resistance.as_ref().map(Option::as_deref),
            wattage_range: value.wattage_range.as_ref().map(Option::as_deref),
            branch_specifications,
            status: value.status.as_ref().map(ProductStatus::as_str),
            updated_by: value.updated_by.as_deref(),
            updated_at: value.updated_at,
        })
    }
}

/// Turn a `<branch>_stock` keyed map into `(branch, quantity)` rows, skipping malformed keys.
pub fn stock_rows(stock: &StockMap) -> BTreeMap<String, i32> {
    stock
        .iter()
        .filter_map(|(key, quantity)| branch_from_stock_key(key).map(|branch| (branch, *quantity)))
        .collect()
}
