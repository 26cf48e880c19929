//! Identity extractors.
//!
//! Sessions arrive as a signed cookie issued by the identity provider;
//! the extractors only validate and decode it.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use std::future::{Ready, ready};

use quill_core::ports::SessionClaims;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Authenticated visitor. Extraction fails with a redirect to the login
/// page carrying the original path as `next`.
///
/// ```ignore
/// async fn gated(user: CurrentUser) -> impl Responder {
///     format!("Hello, {}!", user.0.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionClaims);

fn claims_from_request(req: &HttpRequest) -> Option<SessionClaims> {
    let state = match req.app_data::<web::Data<AppState>>() {
        Some(state) => state,
        None => {
            tracing::error!("AppState not found in app data");
            return None;
        }
    };

    let cookie = req.cookie(SESSION_COOKIE)?;

    match state.sessions.validate(cookie.value()) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session cookie");
            None
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match claims_from_request(req) {
            Some(claims) => ready(Ok(CurrentUser(claims))),
            None => ready(Err(AppError::LoginRequired {
                next: req.path().to_string(),
            })),
        }
    }
}

/// Optional identity extractor - anonymous visitors get `None`.
pub struct MaybeUser(pub Option<SessionClaims>);

impl FromRequest for MaybeUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(claims_from_request(req))))
    }
}
