use actix_web::{HttpResponse, delete, get, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::config::ServerConfig;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::featured_categories::FeaturedCategoryForm;
use crate::repository::DieselRepository;
use crate::routes::auth::Viewer;
use crate::routes::errors::ApiError;
use crate::services::featured_categories;

#[derive(Debug, Deserialize)]
pub struct FeaturedIdQuery {
    pub id: Option<String>,
}

#[get("/api/featured-categories")]
pub async fn get_featured_categories(
    viewer: Viewer,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let featured = featured_categories::list_featured_categories(repo.get_ref(), viewer.user())
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(json!({ "featuredCategories": featured })))
}

/// Creates a tile, or replaces it when the body carries an `id`.
#[post("/api/featured-categories")]
pub async fn post_featured_category(
    user: AuthenticatedUser,
    form: web::Json<FeaturedCategoryForm>,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let featured =
        featured_categories::save_featured_category(repo.get_ref(), &user, form.into_inner())
            .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Featured category saved",
        "featuredCategory": featured,
    })))
}

#[delete("/api/featured-categories")]
pub async fn delete_featured_category(
    params: web::Query<FeaturedIdQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = params
        .into_inner()
        .id
        .ok_or_else(|| ApiError::bad_request("id is required"))?;
    featured_categories::delete_featured_category(repo.get_ref(), &user, &id)
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Featured category deleted" })))
}
