use crate::db::{DbConnection, DbPool};
use crate::domain::branch::Branch;
use crate::domain::category::{CustomCategory, NewCustomCategory};
use crate::domain::featured_category::{FeaturedCategory, FeaturedCategoryData};
use crate::domain::offer_popup::{OfferPopup, OfferPopupData};
use crate::domain::order::{NewOrder, Order, OrderListQuery, UpdateOrder};
use crate::domain::product::{
    NewProduct, Product, ProductImage, ProductListQuery, UpdateProduct,
};
use crate::repository::errors::RepositoryResult;

pub mod branch;
pub mod category;
pub mod errors;
pub mod featured_category;
pub mod offer_popup;
pub mod order;
pub mod product;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Escape `%`, `_` and `\` so `value` matches literally in a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Read-only operations over products.
pub trait ProductReader {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
    /// Exact barcode match first, then a case-insensitive one.
    fn get_product_by_barcode(&self, barcode: &str) -> RepositoryResult<Option<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    /// Products whose category equals `category`, ignoring case.
    fn count_products_in_category(&self, category: &str) -> RepositoryResult<usize>;
    fn count_products_in_subcategory(
        &self,
        category: &str,
        subcategory: &str,
    ) -> RepositoryResult<usize>;
    /// Distinct branches that hold stock rows for active products.
    fn list_stock_branches(&self) -> RepositoryResult<Vec<String>>;
}

/// Write operations over products.
pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    fn update_product(&self, product_id: i32, updates: &UpdateProduct)
    -> RepositoryResult<Product>;
    fn append_product_images(
        &self,
        product_id: i32,
        images: &[ProductImage],
        updated_by: &str,
    ) -> RepositoryResult<Product>;
    /// Remove the image with `public_id`; `NotFound` when the product does not hold it.
    fn remove_product_image(
        &self,
        product_id: i32,
        public_id: &str,
        updated_by: &str,
    ) -> RepositoryResult<Product>;
    fn delete_product(&self, product_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over admin-managed categories.
pub trait CategoryReader {
    fn list_custom_categories(&self) -> RepositoryResult<Vec<CustomCategory>>;
    fn get_custom_category(&self, name: &str) -> RepositoryResult<Option<CustomCategory>>;
}

/// Write operations over admin-managed categories.
pub trait CategoryWriter {
    fn create_custom_category(
        &self,
        new_category: &NewCustomCategory,
    ) -> RepositoryResult<CustomCategory>;
    fn update_custom_subcategories(
        &self,
        name: &str,
        subcategories: &[String],
    ) -> RepositoryResult<CustomCategory>;
    fn delete_custom_category(&self, name: &str) -> RepositoryResult<()>;
}

pub trait BranchReader {
    fn list_branches(&self) -> RepositoryResult<Vec<Branch>>;
}

pub trait BranchWriter {
    fn create_branch(&self, name: &str) -> RepositoryResult<Branch>;
    fn delete_branch(&self, name: &str) -> RepositoryResult<()>;
}

/// Read-only operations over orders.
pub trait OrderReader {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
}

/// Write operations over orders.
pub trait OrderWriter {
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
    fn update_order(&self, order_id: i32, updates: &UpdateOrder) -> RepositoryResult<Order>;
    fn delete_order(&self, order_id: i32) -> RepositoryResult<()>;
}

pub trait FeaturedCategoryReader {
    /// Ordered by position, then id.
    fn list_featured_categories(&self, active_only: bool)
    -> RepositoryResult<Vec<FeaturedCategory>>;
    fn get_featured_category(&self, id: i32) -> RepositoryResult<Option<FeaturedCategory>>;
}

pub trait FeaturedCategoryWriter {
    fn create_featured_category(
        &self,
        data: &FeaturedCategoryData,
    ) -> RepositoryResult<FeaturedCategory>;
    fn update_featured_category(
        &self,
        id: i32,
        data: &FeaturedCategoryData,
    ) -> RepositoryResult<FeaturedCategory>;
    fn delete_featured_category(&self, id: i32) -> RepositoryResult<()>;
}

pub trait OfferPopupReader {
    /// Newest first.
    fn list_offer_popups(&self) -> RepositoryResult<Vec<OfferPopup>>;
    fn get_offer_popup(&self, id: i32) -> RepositoryResult<Option<OfferPopup>>;
}

pub trait OfferPopupWriter {
    fn create_offer_popup(&self, data: &OfferPopupData) -> RepositoryResult<OfferPopup>;
    fn update_offer_popup(&self, id: i32, data: &OfferPopupData) -> RepositoryResult<OfferPopup>;
    fn delete_offer_popup(&self, id: i32) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
