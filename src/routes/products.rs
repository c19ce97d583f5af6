use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::ServerConfig;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::categories::{AddCategoryForm, DeleteCategoryForm, SubcategoryForm};
use crate::forms::products::ProductForm;
use crate::forms::uploads::UploadImagesForm;
use crate::media::MediaStore;
use crate::rate_limit::RateLimiter;
use crate::repository::DieselRepository;
use crate::routes::auth::Viewer;
use crate::routes::errors::ApiError;
use crate::services::products::{Audience, ProductsQuery, shape};
use crate::services::{images, products, taxonomy};

/// Query string of `DELETE /api/products`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProductQuery {
    pub product_id: Option<String>,
    pub image_public_id: Option<String>,
}

/// Rate-limit key for the caller: the TCP peer address. Forwarding headers are client-controlled
/// and ignored.
fn client_key(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn payload<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|err| ApiError::bad_request(format!("Invalid payload: {err}")))
}

#[get("/api/products")]
pub async fn get_products(
    params: web::Query<ProductsQuery>,
    viewer: Viewer,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let response = products::read_products(repo.get_ref(), viewer.user(), params.into_inner())
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(response))
}

/// Product create/update and taxonomy mutations, selected by the `action` field.
#[post("/api/products")]
pub async fn post_products(
    user: AuthenticatedUser,
    body: web::Json<Value>,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let action = body
        .get("action")
        .and_then(Value::as_str)
        .map(str::to_string);
    let repo = repo.get_ref();
    let fail = |err| ApiError::service(err, &config);

    let response = match action.as_deref() {
        None | Some("create") => {
            let product = products::create_product(repo, &user, payload::<ProductForm>(body)?)
                .map_err(fail)?;
            return Ok(HttpResponse::Created().json(json!({
                "message": "Product created",
                "product": shape(product, &Audience::Full),
            })));
        }
        Some("update") => {
            let product = products::update_product(repo, &user, payload::<ProductForm>(body)?)
                .map_err(fail)?;
            json!({
                "message": "Product updated",
                "product": shape(product, &Audience::Full),
            })
        }
        Some("add_category") => {
            let categories = taxonomy::add_category(repo, &user, payload::<AddCategoryForm>(body)?)
                .map_err(fail)?;
            json!({ "message": "Category added", "categories": categories })
        }
        Some("delete_category") => {
            let categories =
                taxonomy::delete_category(repo, &user, payload::<DeleteCategoryForm>(body)?)
                    .map_err(fail)?;
            json!({ "message": "Category deleted", "categories": categories })
        }
        Some("add_subcategory") => {
            let categories =
                taxonomy::add_subcategory(repo, &user, payload::<SubcategoryForm>(body)?)
                    .map_err(fail)?;
            json!({ "message": "Subcategory added", "categories": categories })
        }
        Some("delete_subcategory") => {
            let categories =
                taxonomy::delete_subcategory(repo, &user, payload::<SubcategoryForm>(body)?)
                    .map_err(fail)?;
            json!({ "message": "Subcategory deleted", "categories": categories })
        }
        Some(other) => {
            return Err(ApiError::bad_request(format!("Unknown action `{other}`")));
        }
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Bulk image upload.
#[put("/api/products")]
pub async fn put_product_images(
    req: HttpRequest,
    user: AuthenticatedUser,
    MultipartForm(form): MultipartForm<UploadImagesForm>,
    repo: web::Data<DieselRepository>,
    media: web::Data<dyn MediaStore>,
    limiter: web::Data<RateLimiter>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let (product_id, files) = form.into_parts();
    let product_id = product_id.ok_or_else(|| ApiError::bad_request("productId is required"))?;
    let client_ip = client_key(&req);

    let outcome = images::upload_product_images(
        repo.get_ref(),
        media.get_ref(),
        limiter.get_ref(),
        &client_ip,
        &user,
        &product_id,
        files,
    )
    .await
    .map_err(|err| ApiError::service(err, &config))?;

    let message = if outcome.failed.is_empty() {
        format!("{} image(s) uploaded", outcome.uploaded.len())
    } else {
        format!(
            "{} image(s) uploaded, {} failed",
            outcome.uploaded.len(),
            outcome.failed.len()
        )
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "product": shape(outcome.product, &Audience::Full),
        "uploaded": outcome.uploaded,
        "failed": outcome.failed,
    })))
}

/// Deletes one image when `imagePublicId` is given, otherwise the whole product.
#[delete("/api/products")]
pub async fn delete_products(
    params: web::Query<DeleteProductQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    media: web::Data<dyn MediaStore>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let DeleteProductQuery {
        product_id,
        image_public_id,
    } = params.into_inner();
    let product_id = product_id.ok_or_else(|| ApiError::bad_request("productId is required"))?;

    match image_public_id.filter(|value| !value.trim().is_empty()) {
        Some(public_id) => {
            let product = images::delete_product_image(
                repo.get_ref(),
                media.get_ref(),
                &user,
                &product_id,
                &public_id,
            )
            .await
            .map_err(|err| ApiError::service(err, &config))?;

            Ok(HttpResponse::Ok().json(json!({
                "message": "Image deleted",
                "product": shape(product, &Audience::Full),
            })))
        }
        None => {
            images::delete_product(repo.get_ref(), media.get_ref(), &user, &product_id)
                .await
                .map_err(|err| ApiError::service(err, &config))?;

            Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted" })))
        }
    }
}
