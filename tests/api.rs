use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use vapeshop_api::config::{Environment, ServerConfig};
use vapeshop_api::domain::auth::Claims;
use vapeshop_api::domain::product::{NewProduct, ProductStatus};
use vapeshop_api::forms::uploads::ImageFile;
use vapeshop_api::media::{MediaError, MediaStore, StoredMedia};
use vapeshop_api::pagination::MAX_PAGE;
use vapeshop_api::rate_limit::{InMemoryCounterStore, RateLimiter};
use vapeshop_api::repository::{DieselRepository, ProductWriter};
use vapeshop_api::routes;

mod common;

const SECRET: &str = "integration-secret";

struct NoopMediaStore;

#[async_trait]
impl MediaStore for NoopMediaStore {
    async fn upload(&self, file: &ImageFile) -> Result<StoredMedia, MediaError> {
        Ok(StoredMedia {
            url: format!("https://cdn.test/{}", file.file_name),
            public_id: format!("products/{}", file.file_name),
        })
    }

    async fn delete(&self, _public_id: &str) -> Result<(), MediaError> {
        Ok(())
    }
}

fn bearer(role: &str, branch: Option<&str>) -> String {
    let claims = Claims {
        sub: format!("{role}-1"),
        email: None,
        name: None,
        role: role.to_string(),
        branch: branch.map(str::to_string),
        exp: chrono::Utc::now().timestamp() + 3_600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("encode token");
    format!("Bearer {token}")
}

const BOUNDARY: &str = "vapeshop-test-boundary";

/// Multipart body with a `productId` field and one `images` part per file.
fn multipart_body(product_id: i32, files: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"productId\"\r\n\r\n\
             {product_id}\r\n"
        )
        .as_bytes(),
    );
    for (file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; \
                 filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(
    product_id: i32,
    files: &[(&str, Vec<u8>)],
    forwarded_for: &str,
) -> test::TestRequest {
    test::TestRequest::put()
        .uri("/api/products")
        .peer_addr("10.0.0.5:41000".parse().expect("socket address"))
        .insert_header((header::AUTHORIZATION, bearer("admin", None)))
        .insert_header(("X-Forwarded-For", forwarded_for))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(product_id, files))
}

macro_rules! app {
    ($repo:expr) => {
        app!($repo, 50)
    };
    ($repo:expr, $uploads_per_hour:expr) => {{
        let media: Arc<dyn MediaStore> = Arc::new(NoopMediaStore);
        test::init_service(
            App::new()
                .app_data(web::Data::new($repo.clone()))
                .app_data(web::Data::new(ServerConfig::new(
                    SECRET,
                    Environment::Production,
                )))
                .app_data(web::Data::from(media))
                .app_data(web::Data::new(RateLimiter::uploads(
                    Arc::new(InMemoryCounterStore::new()),
                    $uploads_per_hour,
                )))
                .configure(routes::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn anonymous_listing_hides_inactive_products() {
    let test_db = common::TestDb::new("test_api_anonymous_listing.db");
    let repo = DieselRepository::new(test_db.pool());
    repo.create_product(&NewProduct::new("Visible", "DEVICES", 1_000))
        .expect("seed visible");
    repo.create_product(
        &NewProduct::new("Draft", "DEVICES", 1_000).with_status(ProductStatus::Draft),
    )
    .expect("seed draft");
    let app = app!(repo);

    let req = test::TestRequest::get()
        .uri("/api/products?status=all")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let products = body["products"].as_array().expect("products");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], json!("Visible"));
    assert!(products[0].get("status").is_none());
}

#[actix_web::test]
async fn invalid_input_uses_the_error_envelope() {
    let test_db = common::TestDb::new("test_api_error_envelope.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = app!(repo);

    let req = test::TestRequest::get()
        .uri("/api/products?id=abc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
    assert!(body["timestamp"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/products")
        .set_json(json!({ "name": "Anon", "price": 1, "category": "DEVICES" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/products")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/products")
        .insert_header((header::AUTHORIZATION, bearer("admin", None)))
        .set_json(json!({ "action": "rename_everything" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn create_then_block_category_delete() {
    let test_db = common::TestDb::new("test_api_create_then_block.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = app!(repo);
    let admin = bearer("admin", None);

    let req = test::TestRequest::post()
        .uri("/api/products")
        .insert_header((header::AUTHORIZATION, admin.clone()))
        .set_json(json!({ "action": "add_category", "name": "Herbal" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/products")
        .insert_header((header::AUTHORIZATION, admin.clone()))
        .set_json(json!({
            "name": "Herb Grinder",
            "price": 12.5,
            "category": "herbal",
            "barcode": "HG-1"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["product"]["price"], json!(12.5));
    assert_eq!(body["product"]["barcode"], json!("HG-1"));

    let req = test::TestRequest::post()
        .uri("/api/products")
        .insert_header((header::AUTHORIZATION, bearer("manager", None)))
        .set_json(json!({ "name": "Copy", "price": 1, "category": "HERBAL", "barcode": "HG-1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/products")
        .insert_header((header::AUTHORIZATION, admin))
        .set_json(json!({ "action": "delete_category", "name": "HERBAL" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["productCount"], json!(1));
}

#[actix_web::test]
async fn moderators_cannot_read_other_branches() {
    let test_db = common::TestDb::new("test_api_moderator_branch.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = app!(repo);

    let req = test::TestRequest::get()
        .uri("/api/products?branch=bashundhara")
        .insert_header((header::AUTHORIZATION, bearer("moderator", Some("mirpur"))))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn huge_page_numbers_are_clamped() {
    let test_db = common::TestDb::new("test_api_huge_page_numbers.db");
    let repo = DieselRepository::new(test_db.pool());
    repo.create_product(&NewProduct::new("Only", "DEVICES", 1_000))
        .expect("seed product");
    let app = app!(repo);

    let req = test::TestRequest::get()
        .uri("/api/products?page=18446744073709551615&limit=100")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["products"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["pagination"]["currentPage"], json!(MAX_PAGE));
    assert_eq!(body["pagination"]["totalProducts"], json!(1));
}

#[actix_web::test]
async fn oversized_file_is_reported_while_others_attach() {
    let test_db = common::TestDb::new("test_api_oversized_file.db");
    let repo = DieselRepository::new(test_db.pool());
    let product = repo
        .create_product(&NewProduct::new("Gallery", "DEVICES", 1_000))
        .expect("seed product");
    let app = app!(repo);

    let files = [
        ("front.png", vec![1u8; 1024]),
        ("huge.png", vec![2u8; 12 * 1024 * 1024]),
        ("back.png", vec![3u8; 1024]),
    ];
    let req = upload_request(product.id, &files, "1.1.1.1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["uploaded"].as_array().map(Vec::len), Some(2));
    let failed = body["failed"].as_array().expect("failure list");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["fileName"], json!("huge.png"));
    assert_eq!(body["product"]["images"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn forwarded_headers_do_not_split_the_upload_budget() {
    let test_db = common::TestDb::new("test_api_forwarded_headers_budget.db");
    let repo = DieselRepository::new(test_db.pool());
    let product = repo
        .create_product(&NewProduct::new("Gallery", "DEVICES", 1_000))
        .expect("seed product");
    let app = app!(repo, 3);

    let files = [("a.png", vec![1u8; 64]), ("b.png", vec![2u8; 64])];

    let req = upload_request(product.id, &files, "1.1.1.1").to_request();
    let first = test::call_service(&app, req).await;
    assert_eq!(first.status(), StatusCode::OK);

    let req = upload_request(product.id, &files, "2.2.2.2").to_request();
    let second = test::call_service(&app, req).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}
