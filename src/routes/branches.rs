use actix_web::{HttpResponse, delete, get, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::config::ServerConfig;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::branches::BranchForm;
use crate::repository::DieselRepository;
use crate::routes::errors::ApiError;
use crate::services::branches;

#[derive(Debug, Deserialize)]
pub struct BranchNameQuery {
    pub name: Option<String>,
}

#[get("/api/branches")]
pub async fn get_branches(
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let branches =
        branches::list_branches(repo.get_ref()).map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(json!({ "branches": branches })))
}

#[post("/api/branches")]
pub async fn post_branch(
    user: AuthenticatedUser,
    form: web::Json<BranchForm>,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let branch = branches::add_branch(repo.get_ref(), &user, form.into_inner())
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Created().json(json!({ "message": "Branch added", "branch": branch })))
}

#[delete("/api/branches")]
pub async fn delete_branch(
    params: web::Query<BranchNameQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let name = params
        .into_inner()
        .name
        .ok_or_else(|| ApiError::bad_request("name is required"))?;
    branches::delete_branch(repo.get_ref(), &user, &name)
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Branch deleted" })))
}
