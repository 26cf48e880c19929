//! Administrative actions.

use actix_web::{HttpResponse, web};

use crate::middleware::auth::CurrentUser;
use crate::middleware::error::AppResult;
use crate::state::AppState;

use super::redirect;

/// Drop every cached page so fresh content is immediately visible.
pub async fn cache_clear(state: web::Data<AppState>, user: CurrentUser) -> AppResult<HttpResponse> {
    state.cache.clear().await?;
    tracing::info!(by = %user.0.username, "Page cache cleared");
    Ok(redirect("/"))
}
