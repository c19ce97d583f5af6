use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::forms::uploads::MAX_UPLOAD_BODY_BYTES;
use crate::routes::errors::ApiError;

pub mod auth;
pub mod branches;
pub mod errors;
pub mod featured_categories;
pub mod offer_popup;
pub mod orders;
pub mod products;

/// Register every API handler together with extractor settings that render
/// malformed bodies and query strings in the shared error envelope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::bad_request(format!("Invalid JSON body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::bad_request(format!("Invalid query string: {err}")).into()
    }))
    .app_data(
        MultipartFormConfig::default()
            .total_limit(MAX_UPLOAD_BODY_BYTES)
            .error_handler(|err, _req| {
                ApiError::bad_request(format!("Invalid upload: {err}")).into()
            }),
    )
    .service(products::get_products)
    .service(products::post_products)
    .service(products::put_product_images)
    .service(products::delete_products)
    .service(branches::get_branches)
    .service(branches::post_branch)
    .service(branches::delete_branch)
    .service(orders::post_order)
    .service(orders::get_orders)
    .service(orders::patch_order)
    .service(orders::delete_order)
    .service(featured_categories::get_featured_categories)
    .service(featured_categories::post_featured_category)
    .service(featured_categories::delete_featured_category)
    .service(offer_popup::get_offer_popup)
    .service(offer_popup::post_offer_popup)
    .service(offer_popup::delete_offer_popup);
}
