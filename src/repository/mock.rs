use mockall::mock;

use super::{
    BranchReader, BranchWriter, CategoryReader, CategoryWriter, FeaturedCategoryReader,
    FeaturedCategoryWriter, OfferPopupReader, OfferPopupWriter, OrderReader, OrderWriter,
    ProductReader, ProductWriter,
};
use crate::domain::{
    branch::Branch,
    category::{CustomCategory, NewCustomCategory},
    featured_category::{FeaturedCategory, FeaturedCategoryData},
    offer_popup::{OfferPopup, OfferPopupData},
    order::{NewOrder, Order, OrderListQuery, UpdateOrder},
    product::{NewProduct, Product, ProductImage, ProductListQuery, UpdateProduct},
};
use crate::repository::errors::RepositoryResult;

mock! {
    pub ProductReader {}

    impl ProductReader for ProductReader {
        fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
        fn get_product_by_barcode(&self, barcode: &str) -> RepositoryResult<Option<Product>>;
        fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
        fn count_products_in_category(&self, category: &str) -> RepositoryResult<usize>;
        fn count_products_in_subcategory(&self, category: &str, subcategory: &str) -> RepositoryResult<usize>;
        fn list_stock_branches(&self) -> RepositoryResult<Vec<String>>;
    }
}

mock! {
    pub ProductWriter {}

    impl ProductWriter for ProductWriter {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn update_product(&self, product_id: i32, updates: &UpdateProduct) -> RepositoryResult<Product>;
        fn append_product_images(&self, product_id: i32, images: &[ProductImage], updated_by: &str) -> RepositoryResult<Product>;
        fn remove_product_image(&self, product_id: i32, public_id: &str, updated_by: &str) -> RepositoryResult<Product>;
        fn delete_product(&self, product_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub CategoryReader {}

    impl CategoryReader for CategoryReader {
        fn list_custom_categories(&self) -> RepositoryResult<Vec<CustomCategory>>;
        fn get_custom_category(&self, name: &str) -> RepositoryResult<Option<CustomCategory>>;
    }
}

mock! {
    pub CategoryWriter {}

    impl CategoryWriter for CategoryWriter {
        fn create_custom_category(&self, new_category: &NewCustomCategory) -> RepositoryResult<CustomCategory>;
        fn update_custom_subcategories(&self, name: &str, subcategories: &[String]) -> RepositoryResult<CustomCategory>;
        fn delete_custom_category(&self, name: &str) -> RepositoryResult<()>;
    }
}

mock! {
    pub BranchReader {}

    impl BranchReader for BranchReader {
        fn list_branches(&self) -> RepositoryResult<Vec<Branch>>;
    }
}

mock! {
    pub BranchWriter {}

    impl BranchWriter for BranchWriter {
        fn create_branch(&self, name: &str) -> RepositoryResult<Branch>;
        fn delete_branch(&self, name: &str) -> RepositoryResult<()>;
    }
}

mock! {
    pub OrderReader {}

    impl OrderReader for OrderReader {
        fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
        fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
    }
}

mock! {
    pub OrderWriter {}

    impl OrderWriter for OrderWriter {
        fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
        fn update_order(&self, order_id: i32, updates: &UpdateOrder) -> RepositoryResult<Order>;
        fn delete_order(&self, order_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub FeaturedCategoryReader {}

    impl FeaturedCategoryReader for FeaturedCategoryReader {
        fn list_featured_categories(&self, active_only: bool) -> RepositoryResult<Vec<FeaturedCategory>>;
        fn get_featured_category(&self, id: i32) -> RepositoryResult<Option<FeaturedCategory>>;
    }
}

mock! {
    pub FeaturedCategoryWriter {}

    impl FeaturedCategoryWriter for FeaturedCategoryWriter {
        fn create_featured_category(&self, data: &FeaturedCategoryData) -> RepositoryResult<FeaturedCategory>;
        fn update_featured_category(&self, id: i32, data: &FeaturedCategoryData) -> RepositoryResult<FeaturedCategory>;
        fn delete_featured_category(&self, id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub OfferPopupReader {}

    impl OfferPopupReader for OfferPopupReader {
        fn list_offer_popups(&self) -> RepositoryResult<Vec<OfferPopup>>;
        fn get_offer_popup(&self, id: i32) -> RepositoryResult<Option<OfferPopup>>;
    }
}

mock! {
    pub OfferPopupWriter {}

    impl OfferPopupWriter for OfferPopupWriter {
        fn create_offer_popup(&self, data: &OfferPopupData) -> RepositoryResult<OfferPopup>;
        fn update_offer_popup(&self, id: i32, data: &OfferPopupData) -> RepositoryResult<OfferPopup>;
        fn delete_offer_popup(&self, id: i32) -> RepositoryResult<()>;
    }
}
