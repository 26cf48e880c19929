//! Login landing page.
//!
//! Credentials and session issuance live with the external identity
//! provider; this page is only where gated routes send anonymous
//! visitors, keeping the originally requested path as `next`.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_shared::view::Page;

use crate::middleware::error::AppResult;
use crate::state::AppState;

use super::{html, render};

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

pub async fn login_page(
    state: web::Data<AppState>,
    query: web::Query<LoginQuery>,
) -> AppResult<HttpResponse> {
    let body = render(
        &state,
        Page::Login {
            next: query.into_inner().next,
        },
    )
    .await?;
    Ok(html(body))
}
