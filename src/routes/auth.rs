//! Bearer-token extractors.
//!
//! `AuthenticatedUser` requires a valid token. `Viewer` accepts anonymous callers but still
//! rejects a token that is present and invalid.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::config::ServerConfig;
use crate::domain::auth::{AuthenticatedUser, Claims};
use crate::routes::errors::ApiError;

/// Caller of a read endpoint; `None` when no token was sent.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<AuthenticatedUser>);

impl Viewer {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.0.as_ref()
    }
}

/// Verify an HS256 token and turn its claims into the caller identity.
pub fn decode_token(
    token: &str,
    secret: &str,
) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(data.claims.into())
}

fn authenticate(req: &HttpRequest) -> Result<Option<AuthenticatedUser>, ApiError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Malformed authorization header"))?;

    let Some(config) = req.app_data::<web::Data<ServerConfig>>() else {
        log::error!("ServerConfig is not registered as app data");
        return Err(ApiError::internal());
    };

    match decode_token(token, &config.jwt_secret) {
        Ok(user) => Ok(Some(user)),
        Err(err) => {
            log::warn!("Rejected bearer token for {}: {err}", req.path());
            Err(ApiError::unauthorized("Invalid or expired token"))
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| {
            user.ok_or_else(|| ApiError::unauthorized("Authentication required"))
        }))
    }
}

impl FromRequest for Viewer {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Viewer))
    }
}
