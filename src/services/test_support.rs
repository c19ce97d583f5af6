//! Shared fixtures for service unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::auth::{AuthenticatedUser, Role};
use crate::domain::branch::Branch;
use crate::domain::category::{CustomCategory, NewCustomCategory};
use crate::domain::featured_category::{FeaturedCategory, FeaturedCategoryData};
use crate::domain::offer_popup::{OfferPopup, OfferPopupData};
use crate::domain::order::{NewOrder, Order, OrderListQuery, UpdateOrder};
use crate::domain::product::{
    NewProduct, Product, ProductImage, ProductListQuery, ProductStatus, StockMap, UpdateProduct,
};
use crate::forms::uploads::ImageFile;
use crate::media::{MediaError, MediaStore, StoredMedia};
use crate::repository::errors::RepositoryResult;
use crate::repository::mock::{
    MockBranchReader, MockBranchWriter, MockCategoryReader, MockCategoryWriter,
    MockFeaturedCategoryReader, MockFeaturedCategoryWriter, MockOfferPopupReader,
    MockOfferPopupWriter, MockOrderReader, MockOrderWriter, MockProductReader, MockProductWriter,
};
use crate::repository::{
    BranchReader, BranchWriter, CategoryReader, CategoryWriter, FeaturedCategoryReader,
    FeaturedCategoryWriter, OfferPopupReader, OfferPopupWriter, OrderReader, OrderWriter,
    ProductReader, ProductWriter,
};

pub fn fixed_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub fn user(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: format!("{}-1", role.as_str()),
        email: Some(format!("{}@vapeshop.test", role.as_str())),
        name: Some("Test User".to_string()),
        role,
        branch: None,
        exp: 0,
    }
}

pub fn moderator(branch: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        branch: Some(branch.to_string()),
        ..user(Role::Moderator)
    }
}

pub fn image(public_id: &str) -> ProductImage {
    ProductImage {
        url: format!("https://cdn.test/{public_id}.jpg"),
        public_id: public_id.to_string(),
        alt: String::new(),
    }
}

pub fn sample_product(id: i32) -> Product {
    Product {
        id,
        name: format!("Product {id}"),
        description: Some("Smooth draw".to_string()),
        brand: Some("Vaporesso".to_string()),
        category: "DEVICES".to_string(),
        subcategory: Some("Pod System".to_string()),
        barcode: Some(format!("BC-{id}")),
        tags: vec!["pod".to_string()],
        price_cents: 2_500,
        compare_at_price_cents: None,
        nicotine_strength: None,
        vg_pg_ratio: None,
        flavor: None,
        resistance: None,
        wattage_range: None,
        branch_specifications: BTreeMap::new(),
        stock: StockMap::from([
            ("bashundhara_stock".to_string(), 3),
            ("mirpur_stock".to_string(), 5),
        ]),
        images: Vec::new(),
        status: ProductStatus::Active,
        created_by: Some("admin-1".to_string()),
        updated_by: Some("admin-1".to_string()),
        created_at: fixed_datetime(),
        updated_at: fixed_datetime(),
    }
}

/// Repository double that forwards every trait to its own mock.
#[derive(Default)]
pub struct FakeRepo {
    pub products: MockProductReader,
    pub product_writer: MockProductWriter,
    pub categories: MockCategoryReader,
    pub category_writer: MockCategoryWriter,
    pub branches: MockBranchReader,
    pub branch_writer: MockBranchWriter,
    pub orders: MockOrderReader,
    pub order_writer: MockOrderWriter,
    pub featured: MockFeaturedCategoryReader,
    pub featured_writer: MockFeaturedCategoryWriter,
    pub popups: MockOfferPopupReader,
    pub popup_writer: MockOfferPopupWriter,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductReader for FakeRepo {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>> {
        self.products.get_product_by_id(id)
    }

    fn get_product_by_barcode(&self, barcode: &str) -> RepositoryResult<Option<Product>> {
        self.products.get_product_by_barcode(barcode)
    }

    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        self.products.list_products(query)
    }

    fn count_products_in_category(&self, category: &str) -> RepositoryResult<usize> {
        self.products.count_products_in_category(category)
    }

    fn count_products_in_subcategory(
        &self,
        category: &str,
        subcategory: &str,
    ) -> RepositoryResult<usize> {
        self.products
            .count_products_in_subcategory(category, subcategory)
    }

    fn list_stock_branches(&self) -> RepositoryResult<Vec<String>> {
        self.products.list_stock_branches()
    }
}

impl ProductWriter for FakeRepo {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product> {
        self.product_writer.create_product(new_product)
    }

    fn update_product(
        &self,
        product_id: i32,
        updates: &UpdateProduct,
    ) -> RepositoryResult<Product> {
        self.product_writer.update_product(product_id, updates)
    }

    fn append_product_images(
        &self,
        product_id: i32,
        images: &[ProductImage],
        updated_by: &str,
    ) -> RepositoryResult<Product> {
        self.product_writer
            .append_product_images(product_id, images, updated_by)
    }

    fn remove_product_image(
        &self,
        product_id: i32,
        public_id: &str,
        updated_by: &str,
    ) -> RepositoryResult<Product> {
        self.product_writer
            .remove_product_image(product_id, public_id, updated_by)
    }

    fn delete_product(&self, product_id: i32) -> RepositoryResult<()> {
        self.product_writer.delete_product(product_id)
    }
}

impl CategoryReader for FakeRepo {
    fn list_custom_categories(&self) -> RepositoryResult<Vec<CustomCategory>> {
        self.categories.list_custom_categories()
    }

    fn get_custom_category(&self, name: &str) -> RepositoryResult<Option<CustomCategory>> {
        self.categories.get_custom_category(name)
    }
}

impl CategoryWriter for FakeRepo {
    fn create_custom_category(
        &self,
        new_category: &NewCustomCategory,
    ) -> RepositoryResult<CustomCategory> {
        self.category_writer.create_custom_category(new_category)
    }

    fn update_custom_subcategories(
        &self,
        name: &str,
        subcategories: &[String],
    ) -> RepositoryResult<CustomCategory> {
        self.category_writer
            .update_custom_subcategories(name, subcategories)
    }

    fn delete_custom_category(&self, name: &str) -> RepositoryResult<()> {
        self.category_writer.delete_custom_category(name)
    }
}

impl BranchReader for FakeRepo {
    fn list_branches(&self) -> RepositoryResult<Vec<Branch>> {
        self.branches.list_branches()
    }
}

impl BranchWriter for FakeRepo {
    fn create_branch(&self, name: &str) -> RepositoryResult<Branch> {
        self.branch_writer.create_branch(name)
    }

    fn delete_branch(&self, name: &str) -> RepositoryResult<()> {
        self.branch_writer.delete_branch(name)
    }
}

impl OrderReader for FakeRepo {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>> {
        self.orders.get_order_by_id(id)
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)> {
        self.orders.list_orders(query)
    }
}

impl OrderWriter for FakeRepo {
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order> {
        self.order_writer.create_order(new_order)
    }

    fn update_order(&self, order_id: i32, updates: &UpdateOrder) -> RepositoryResult<Order> {
        self.order_writer.update_order(order_id, updates)
    }

    fn delete_order(&self, order_id: i32) -> RepositoryResult<()> {
        self.order_writer.delete_order(order_id)
    }
}

impl FeaturedCategoryReader for FakeRepo {
    fn list_featured_categories(
        &self,
        active_only: bool,
    ) -> RepositoryResult<Vec<FeaturedCategory>> {
        self.featured.list_featured_categories(active_only)
    }

    fn get_featured_category(&self, id: i32) -> RepositoryResult<Option<FeaturedCategory>> {
        self.featured.get_featured_category(id)
    }
}

impl FeaturedCategoryWriter for FakeRepo {
    fn create_featured_category(
        &self,
        data: &FeaturedCategoryData,
    ) -> RepositoryResult<FeaturedCategory> {
        self.featured_writer.create_featured_category(data)
    }

    fn update_featured_category(
        &self,
        id: i32,
        data: &FeaturedCategoryData,
    ) -> RepositoryResult<FeaturedCategory> {
        self.featured_writer.update_featured_category(id, data)
    }

    fn delete_featured_category(&self, id: i32) -> RepositoryResult<()> {
        self.featured_writer.delete_featured_category(id)
    }
}

impl OfferPopupReader for FakeRepo {
    fn list_offer_popups(&self) -> RepositoryResult<Vec<OfferPopup>> {
        self.popups.list_offer_popups()
    }

    fn get_offer_popup(&self, id: i32) -> RepositoryResult<Option<OfferPopup>> {
        self.popups.get_offer_popup(id)
    }
}

impl OfferPopupWriter for FakeRepo {
    fn create_offer_popup(&self, data: &OfferPopupData) -> RepositoryResult<OfferPopup> {
        self.popup_writer.create_offer_popup(data)
    }

    fn update_offer_popup(&self, id: i32, data: &OfferPopupData) -> RepositoryResult<OfferPopup> {
        self.popup_writer.update_offer_popup(id, data)
    }

    fn delete_offer_popup(&self, id: i32) -> RepositoryResult<()> {
        self.popup_writer.delete_offer_popup(id)
    }
}

/// In-memory media store; files named `fail*` are rejected by the "CDN".
#[derive(Default)]
pub struct FakeMediaStore {
    pub uploaded: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub fail_deletes: bool,
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn upload(&self, file: &ImageFile) -> Result<StoredMedia, MediaError> {
        if file.file_name.starts_with("fail") {
            return Err(MediaError::Upstream {
                status: 500,
                message: "cdn unavailable".to_string(),
            });
        }

        let mut uploaded = self.uploaded.lock().expect("media lock");
        let public_id = format!("products/{}-{}", uploaded.len(), file.file_name);
        uploaded.push(public_id.clone());

        Ok(StoredMedia {
            url: format!("https://cdn.test/{public_id}"),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        if self.fail_deletes {
            return Err(MediaError::Decode("destroy result `error`".to_string()));
        }
        self.deleted
            .lock()
            .expect("media lock")
            .push(public_id.to_string());
        Ok(())
    }
}
