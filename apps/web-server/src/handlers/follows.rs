//! Follow feed and subscription toggles.

use actix_web::{HttpResponse, web};

use quill_core::error::RepoError;
use quill_core::pagination::requested_page;
use quill_shared::view::Page;

use crate::middleware::auth::CurrentUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{PageQuery, html, listing, redirect, render};

/// Posts by every author the visitor follows, newest first.
pub async fn feed(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let author_ids = state.follows.following_ids(user.0.user_id).await?;
    let page = state
        .posts
        .page_by_authors(
            &author_ids,
            requested_page(query.page.as_deref()),
            state.posts_per_page,
        )
        .await?;
    let body = render(
        &state,
        Page::Feed {
            page_name: "Your feed".to_string(),
            listing: listing(&state, page).await?,
        },
    )
    .await?;
    Ok(html(body))
}

/// Start following an author. Following yourself or someone you already
/// follow changes nothing; either way you land back on the profile.
pub async fn profile_follow(
    state: web::Data<AppState>,
    user: CurrentUser,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(AppError::NotFound)?;

    if author.id != user.0.user_id && !state.follows.exists(user.0.user_id, author.id).await? {
        match state.follows.create(user.0.user_id, author.id).await {
            Ok(()) => {
                tracing::info!(
                    follower = %user.0.username,
                    author = %author.username,
                    "Follow created"
                );
            }
            // A concurrent duplicate or a self-edge race is not the
            // visitor's problem.
            Err(RepoError::Constraint(msg)) => {
                tracing::debug!(reason = %msg, "Follow skipped");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(redirect(format!("/profile/{}/", author.username)))
}

/// Stop following an author. Unfollowing someone you never followed is a
/// no-op.
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    user: CurrentUser,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(AppError::NotFound)?;
    state.follows.delete(user.0.user_id, author.id).await?;
    Ok(redirect(format!("/profile/{}/", author.username)))
}
