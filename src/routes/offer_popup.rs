use actix_web::{HttpResponse, delete, get, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::config::ServerConfig;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::offer_popup::OfferPopupForm;
use crate::repository::DieselRepository;
use crate::routes::auth::Viewer;
use crate::routes::errors::ApiError;
use crate::services::offer_popup;

#[derive(Debug, Deserialize)]
pub struct PopupIdQuery {
    pub id: Option<String>,
}

/// The live popup for everyone; staff additionally receive the full list.
#[get("/api/offer-popup")]
pub async fn get_offer_popup(
    viewer: Viewer,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let repo = repo.get_ref();
    let now = chrono::Utc::now().naive_utc();
    let popup = offer_popup::current_offer_popup(repo, now)
        .map_err(|err| ApiError::service(err, &config))?;

    match viewer.user().filter(|user| user.is_staff()) {
        Some(user) => {
            let popups = offer_popup::list_offer_popups(repo, user)
                .map_err(|err| ApiError::service(err, &config))?;
            Ok(HttpResponse::Ok().json(json!({ "popup": popup, "popups": popups })))
        }
        None => Ok(HttpResponse::Ok().json(json!({ "popup": popup }))),
    }
}

#[post("/api/offer-popup")]
pub async fn post_offer_popup(
    user: AuthenticatedUser,
    form: web::Json<OfferPopupForm>,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let popup = offer_popup::save_offer_popup(repo.get_ref(), &user, form.into_inner())
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Offer popup saved", "popup": popup })))
}

#[delete("/api/offer-popup")]
pub async fn delete_offer_popup(
    params: web::Query<PopupIdQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = params
        .into_inner()
        .id
        .ok_or_else(|| ApiError::bad_request("id is required"))?;
    offer_popup::delete_offer_popup(repo.get_ref(), &user, &id)
        .map_err(|err| ApiError::service(err, &config))?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Offer popup deleted" })))
}
