//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod follows;
mod media;
mod posts;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;

use quill_core::domain::{Comment, Post};
use quill_core::pagination::Paginated;
use quill_shared::view::{
    AuthorRef, CommentView, GroupRef, Listing, Nav, Page, PageWindow, PostView,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/groups/", web::get().to(posts::groups_directory))
        .route("/authors/", web::get().to(posts::authors_directory))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/follow/", web::get().to(follows::feed))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create_submit)),
        )
        .route("/posts/{id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{id}/edit/")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit_submit)),
        )
        .route("/posts/{id}/delete/", web::get().to(posts::delete_post))
        .service(
            web::resource("/posts/{id}/comment/")
                .route(web::post().to(posts::add_comment))
                // Non-POST requests by a signed-in visitor fall through to
                // the post detail page.
                .route(web::route().to(posts::comment_fallback)),
        )
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route(
            "/profile/{username}/follow/",
            web::get().to(follows::profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            web::get().to(follows::profile_unfollow),
        )
        .route("/auth/login/", web::get().to(auth::login_page))
        .route("/admin/cache/clear/", web::post().to(admin::cache_clear))
        .route("/media/{path:.*}", web::get().to(media::serve))
        .default_service(web::route().to(not_found));
}

async fn not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound)
}

/// Raw `?page=` query parameter, resolved by the pagination module.
#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    pub page: Option<String>,
}

/// Timestamp rendering used everywhere posts and comments are shown.
pub(crate) fn format_date(date: &chrono::DateTime<chrono::Utc>) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

/// Navigation context: only groups and authors that actually have posts.
pub(crate) async fn nav(state: &AppState) -> AppResult<Nav> {
    let groups = state
        .groups
        .with_posts()
        .await?
        .into_iter()
        .map(|g| GroupRef {
            title: g.title,
            slug: g.slug,
        })
        .collect();
    let authors = state
        .users
        .with_posts()
        .await?
        .into_iter()
        .map(|u| AuthorRef {
            full_name: u.display_name().to_string(),
            username: u.username,
        })
        .collect();
    Ok(Nav { groups, authors })
}

/// Hydrate domain posts with author and group display data.
pub(crate) async fn post_views(state: &AppState, posts: &[Post]) -> AppResult<Vec<PostView>> {
    let mut author_ids: Vec<i64> = posts.iter().map(|p| p.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let mut group_ids: Vec<i64> = posts.iter().filter_map(|p| p.group_id).collect();
    group_ids.sort_unstable();
    group_ids.dedup();

    let authors: HashMap<i64, _> = state
        .users
        .find_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let groups: HashMap<i64, _> = state
        .groups
        .find_by_ids(&group_ids)
        .await?
        .into_iter()
        .map(|g| (g.id, g))
        .collect();

    Ok(posts
        .iter()
        .map(|post| {
            let author = authors.get(&post.author_id);
            PostView {
                id: post.id,
                title: post.title.clone(),
                text: post.text.clone(),
                author_username: author.map(|a| a.username.clone()).unwrap_or_default(),
                author_name: author
                    .map(|a| a.display_name().to_string())
                    .unwrap_or_default(),
                group: post.group_id.and_then(|id| {
                    groups.get(&id).map(|g| GroupRef {
                        title: g.title.clone(),
                        slug: g.slug.clone(),
                    })
                }),
                image: post.image.clone(),
                pub_date: format_date(&post.pub_date),
            }
        })
        .collect())
}

/// Hydrate comments with their authors' usernames.
pub(crate) async fn comment_views(
    state: &AppState,
    comments: &[Comment],
) -> AppResult<Vec<CommentView>> {
    let mut author_ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors: HashMap<i64, _> = state
        .users
        .find_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(comments
        .iter()
        .map(|comment| CommentView {
            author_username: authors
                .get(&comment.author_id)
                .map(|a| a.username.clone())
                .unwrap_or_default(),
            text: comment.text.clone(),
            created: format_date(&comment.created),
        })
        .collect())
}

/// Turn a repository page into a listing view model.
pub(crate) async fn listing(state: &AppState, page: Paginated<Post>) -> AppResult<Listing> {
    let posts = post_views(state, &page.items).await?;
    Ok(Listing {
        window: PageWindow {
            page: page.page,
            pages: page.pages,
            total: page.total,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
        },
        posts,
    })
}

/// Render a page with the shared navigation context.
pub(crate) async fn render(state: &AppState, page: Page) -> AppResult<String> {
    let nav = nav(state).await?;
    Ok(state.renderer.render(&nav, &page))
}

pub(crate) fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub(crate) fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}
