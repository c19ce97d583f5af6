use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use vapeshop_api::domain::auth::{AuthenticatedUser, Role};
use vapeshop_api::domain::product::{NewProduct, ProductStatus, StockMap};
use vapeshop_api::forms::categories::{AddCategoryForm, DeleteCategoryForm};
use vapeshop_api::forms::products::ProductForm;
use vapeshop_api::forms::uploads::ImageFile;
use vapeshop_api::media::{MediaError, MediaStore, StoredMedia};
use vapeshop_api::rate_limit::{InMemoryCounterStore, RateLimiter};
use vapeshop_api::repository::{DieselRepository, ProductReader, ProductWriter};
use vapeshop_api::services::ServiceError;
use vapeshop_api::services::images::upload_product_images;
use vapeshop_api::services::products::{
    ProductsQuery, create_product, read_products, update_product,
};
use vapeshop_api::services::taxonomy::{add_category, delete_category};

mod common;

/// Media store that accepts every file except those named `broken*`.
#[derive(Default)]
struct RecordingMediaStore {
    uploads: AtomicUsize,
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn upload(&self, file: &ImageFile) -> Result<StoredMedia, MediaError> {
        if file.file_name.starts_with("broken") {
            return Err(MediaError::Upstream {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("products/{n}");
        Ok(StoredMedia {
            url: format!("https://cdn.test/{public_id}.jpg"),
            public_id,
        })
    }

    async fn delete(&self, _public_id: &str) -> Result<(), MediaError> {
        Ok(())
    }
}

fn form(value: Value) -> ProductForm {
    serde_json::from_value(value).expect("valid product form")
}

fn seed(repo: &DieselRepository, name: &str, status: ProductStatus) -> i32 {
    let stock: StockMap = [("mirpur_stock".to_string(), 5), ("bashundhara_stock".to_string(), 3)]
        .into_iter()
        .collect();
    repo.create_product(
        &NewProduct::new(name, "DEVICES", 2_000)
            .with_subcategory("Pod System")
            .with_barcode(format!("BC-{name}"))
            .with_stock(stock)
            .with_status(status),
    )
    .expect("seed product")
    .id
}

fn list(
    repo: &DieselRepository,
    viewer: Option<&AuthenticatedUser>,
    query: ProductsQuery,
) -> Value {
    let response = read_products(repo, viewer, query).expect("read products");
    serde_json::to_value(response).expect("serialize response")
}

#[test]
fn public_callers_see_only_active_products_without_internal_fields() {
    let test_db = common::TestDb::new("test_public_callers_see_only_active.db");
    let repo = DieselRepository::new(test_db.pool());

    seed(&repo, "Active", ProductStatus::Active);
    let hidden = seed(&repo, "Hidden", ProductStatus::Inactive);

    let body = list(
        &repo,
        None,
        ProductsQuery {
            status: Some("all".to_string()),
            ..ProductsQuery::default()
        },
    );

    let products = body["products"].as_array().expect("product list");
    assert_eq!(products.len(), 1);
    assert_eq!(body["pagination"]["totalProducts"], json!(1));
    let product = products[0].as_object().expect("object");
    for key in ["stock", "barcode", "status", "createdBy", "updatedBy"] {
        assert!(!product.contains_key(key), "public view leaks `{key}`");
    }

    let direct = read_products(
        &repo,
        None,
        ProductsQuery {
            id: Some(hidden.to_string()),
            ..ProductsQuery::default()
        },
    );
    assert!(matches!(direct, Err(ServiceError::NotFound(_))));

    let customer = common::user(Role::Customer);
    let body = list(&repo, Some(&customer), ProductsQuery::default());
    assert_eq!(body["products"].as_array().map(Vec::len), Some(1));
}

#[test]
fn moderators_see_a_single_stock_key_for_their_branch() {
    let test_db = common::TestDb::new("test_moderators_single_stock_key.db");
    let repo = DieselRepository::new(test_db.pool());

    seed(&repo, "Pod", ProductStatus::Active);
    let moderator = common::moderator("mirpur");

    let body = list(&repo, Some(&moderator), ProductsQuery::default());
    let stock = body["products"][0]["stock"]
        .as_object()
        .expect("moderators see stock");
    assert_eq!(stock.len(), 1);
    assert_eq!(stock["mirpur_stock"], json!(5));

    let other_branch = read_products(
        &repo,
        Some(&moderator),
        ProductsQuery {
            branch: Some("bashundhara".to_string()),
            ..ProductsQuery::default()
        },
    );
    assert!(matches!(other_branch, Err(ServiceError::Forbidden(_))));
}

#[test]
fn barcodes_stay_unique_on_create_and_update() {
    let test_db = common::TestDb::new("test_barcodes_stay_unique.db");
    let repo = DieselRepository::new(test_db.pool());
    let admin = common::user(Role::Admin);

    let first = create_product(
        &repo,
        &admin,
        form(json!({ "name": "First", "price": 10, "category": "devices", "barcode": "X-1" })),
    )
    .expect("first product");
    let second = create_product(
        &repo,
        &admin,
        form(json!({ "name": "Second", "price": 12, "category": "devices", "barcode": "X-2" })),
    )
    .expect("second product");

    let duplicate = create_product(
        &repo,
        &admin,
        form(json!({ "name": "Copy", "price": 10, "category": "DEVICES", "barcode": "X-1" })),
    );
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

    let collision = update_product(
        &repo,
        &admin,
        form(json!({ "id": second.id, "barcode": "X-1", "name": "Renamed" })),
    );
    assert!(matches!(collision, Err(ServiceError::Conflict(_))));

    let unchanged = repo
        .get_product_by_id(second.id)
        .expect("lookup")
        .expect("present");
    assert_eq!(unchanged.name, "Second");
    assert_eq!(unchanged.barcode.as_deref(), Some("X-2"));

    let same_owner = update_product(
        &repo,
        &admin,
        form(json!({ "id": first.id.to_string(), "barcode": "X-1" })),
    );
    assert!(same_owner.is_ok(), "keeping its own barcode is not a conflict");
}

#[test]
fn stock_round_trips_and_image_order_drops_incomplete_entries() {
    let test_db = common::TestDb::new("test_stock_round_trips.db");
    let repo = DieselRepository::new(test_db.pool());
    let manager = common::user(Role::Manager);

    let created = create_product(
        &repo,
        &manager,
        form(json!({
            "name": "Drag X",
            "price": "45.50",
            "category": "DEVICES",
            "subcategory": "box mod",
            "stock": { "mirpur_stock": 5 }
        })),
    )
    .expect("created");
    assert_eq!(created.subcategory.as_deref(), Some("Box Mod"));
    assert_eq!(created.price_cents, 4_550);
    assert_eq!(created.created_by.as_deref(), Some("manager-1"));

    let body = list(
        &repo,
        Some(&manager),
        ProductsQuery {
            id: Some(created.id.to_string()),
            ..ProductsQuery::default()
        },
    );
    assert_eq!(body["product"]["stock"]["mirpur_stock"], json!(5));

    let updated = update_product(
        &repo,
        &manager,
        form(json!({
            "id": created.id,
            "images": [
                { "url": "https://cdn.test/a.jpg", "publicId": "products/a" },
                { "url": "https://cdn.test/b.jpg" },
                { "url": "https://cdn.test/c.jpg", "publicId": "products/c" }
            ]
        })),
    )
    .expect("updated");
    assert_eq!(
        updated
            .images
            .iter()
            .map(|image| image.public_id.as_str())
            .collect::<Vec<_>>(),
        vec!["products/a", "products/c"]
    );
    assert_eq!(updated.updated_by.as_deref(), Some("manager-1"));
}

#[test]
fn categories_in_use_cannot_be_deleted() {
    let test_db = common::TestDb::new("test_categories_in_use.db");
    let repo = DieselRepository::new(test_db.pool());
    let admin = common::user(Role::Admin);

    add_category(
        &repo,
        &admin,
        AddCategoryForm {
            name: "Herbal".to_string(),
            subcategories: Some(vec!["Dry Herb".to_string()]),
        },
    )
    .expect("category added");
    add_category(
        &repo,
        &admin,
        AddCategoryForm {
            name: "Empty".to_string(),
            subcategories: None,
        },
    )
    .expect("category added");

    for name in ["One", "Two"] {
        create_product(
            &repo,
            &admin,
            form(json!({ "name": name, "price": 1, "category": "herbal" })),
        )
        .expect("product in category");
    }

    let blocked = delete_category(
        &repo,
        &admin,
        DeleteCategoryForm {
            name: "HERBAL".to_string(),
        },
    );
    assert!(matches!(blocked, Err(ServiceError::InUse { count: 2, .. })));

    let remaining = delete_category(
        &repo,
        &admin,
        DeleteCategoryForm {
            name: "empty".to_string(),
        },
    )
    .expect("unused category deleted");
    assert!(!remaining.contains_key("EMPTY"));
    assert!(remaining.contains_key("HERBAL"));
}

#[actix_web::test]
async fn bulk_upload_keeps_successful_files() {
    let test_db = common::TestDb::new("test_bulk_upload_keeps_successful_files.db");
    let repo = DieselRepository::new(test_db.pool());
    let media = RecordingMediaStore::default();
    let limiter = RateLimiter::uploads(Arc::new(InMemoryCounterStore::new()), 50);
    let admin = common::user(Role::Admin);

    let product_id = seed(&repo, "Gallery", ProductStatus::Active);

    let png = || Some("image/png".to_string());
    let files = vec![
        ImageFile::new(Some("front.png"), png(), vec![1, 2, 3]),
        ImageFile::new(Some("broken.png"), png(), vec![4, 5, 6]),
        ImageFile::new(Some("back.png"), png(), vec![7, 8, 9]),
    ];

    let outcome = upload_product_images(
        &repo,
        &media,
        &limiter,
        "203.0.113.7",
        &admin,
        &product_id.to_string(),
        files,
    )
    .await
    .expect("partial success");

    assert_eq!(outcome.uploaded.len(), 2);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].file_name, "broken.png");

    let stored = repo
        .get_product_by_id(product_id)
        .expect("lookup")
        .expect("present");
    assert_eq!(stored.images.len(), 2);
    assert!(stored.images.iter().all(|image| image.alt == "Gallery"));
}
