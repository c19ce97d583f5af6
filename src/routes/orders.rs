use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::config::ServerConfig;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::orders::{CheckoutForm, OrderStatusForm};
use crate::repository::DieselRepository;
use crate::routes::auth::Viewer;
use crate::routes::errors::ApiError;
use crate::services::orders::{self, OrdersQuery};

#[derive(Debug, Deserialize)]
pub struct OrderIdQuery {
    pub id: Option<String>,
}

/// Checkout. Open to anonymous callers.
#[post("/api/orders")]
pub async fn post_order(
    viewer: Viewer,
    form: web::Json<CheckoutForm>,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let order = orders::place_order(repo.get_ref(), viewer.user(), form.into_inner())
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Created().json(json!({ "message": "Order placed", "order": order })))
}

#[get("/api/orders")]
pub async fn get_orders(
    params: web::Query<OrdersQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let page = orders::list_orders(repo.get_ref(), &user, params.into_inner())
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(page))
}

#[patch("/api/orders")]
pub async fn patch_order(
    user: AuthenticatedUser,
    form: web::Json<OrderStatusForm>,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let order = orders::update_order_status(repo.get_ref(), &user, form.into_inner())
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Order updated", "order": order })))
}

#[delete("/api/orders")]
pub async fn delete_order(
    params: web::Query<OrderIdQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = params
        .into_inner()
        .id
        .ok_or_else(|| ApiError::bad_request("id is required"))?;
    orders::delete_order(repo.get_ref(), &user, &id)
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Order deleted" })))
}
