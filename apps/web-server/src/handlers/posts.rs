//! Post pages: listings, detail, authoring and comments.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_core::domain::{NewComment, NewPost, PostChanges};
use quill_core::pagination::requested_page;
use quill_core::policy::can_modify;
use quill_core::ports::MediaError;
use quill_shared::view::{AuthorRef, FieldError, Page, PostFormState};

use crate::middleware::auth::{CurrentUser, MaybeUser};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{PageQuery, comment_views, html, listing, post_views, redirect, render};

/// Home page. The rendered HTML is cached per requested page number for a
/// short TTL, so brand-new posts may lag behind until the slot expires or
/// the cache is cleared.
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let requested = requested_page(query.page.as_deref());
    let cache_key = format!("home:page={requested}");

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!(key = %cache_key, "Serving home page from cache");
        return Ok(html(cached));
    }

    let page = state
        .posts
        .page_all(requested, state.posts_per_page)
        .await?;
    let strip = state.posts.recent_with_images(3).await?;
    let body = render(
        &state,
        Page::Home {
            page_name: "Latest updates".to_string(),
            listing: listing(&state, page).await?,
            image_strip: post_views(&state, &strip).await?,
        },
    )
    .await?;

    if let Err(e) = state
        .cache
        .set(&cache_key, &body, Some(state.cache_ttl))
        .await
    {
        tracing::warn!(error = %e, "Failed to cache home page");
    }
    Ok(html(body))
}

/// Posts of one group, by slug.
pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound)?;
    let page = state
        .posts
        .page_by_group(group.id, requested_page(query.page.as_deref()), state.posts_per_page)
        .await?;
    let body = render(
        &state,
        Page::GroupPosts {
            title: group.title,
            slug: group.slug,
            description: group.description,
            listing: listing(&state, page).await?,
        },
    )
    .await?;
    Ok(html(body))
}

/// Directory of every group, including empty ones.
pub async fn groups_directory(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let groups = state
        .groups
        .list()
        .await?
        .into_iter()
        .map(|g| quill_shared::view::GroupSummary {
            title: g.title,
            slug: g.slug,
            description: g.description,
        })
        .collect();
    let body = render(&state, Page::Groups { groups }).await?;
    Ok(html(body))
}

/// Directory of every registered author, posts or not.
pub async fn authors_directory(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let authors = state
        .users
        .list()
        .await?
        .into_iter()
        .map(|u| AuthorRef {
            full_name: u.display_name().to_string(),
            username: u.username,
        })
        .collect();
    let body = render(&state, Page::Authors { authors }).await?;
    Ok(html(body))
}

/// An author's profile with their posts. The follow link reflects whether
/// the signed-in visitor already follows them.
pub async fn profile(
    state: web::Data<AppState>,
    username: web::Path<String>,
    viewer: MaybeUser,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(AppError::NotFound)?;
    let following = match &viewer.0 {
        Some(claims) if claims.user_id != author.id => {
            state.follows.exists(claims.user_id, author.id).await?
        }
        _ => false,
    };
    let page = state
        .posts
        .page_by_author(author.id, requested_page(query.page.as_deref()), state.posts_per_page)
        .await?;
    let body = render(
        &state,
        Page::Profile {
            author: AuthorRef {
                full_name: author.display_name().to_string(),
                username: author.username,
            },
            following,
            listing: listing(&state, page).await?,
        },
    )
    .await?;
    Ok(html(body))
}

/// A single post with its comments.
pub async fn post_detail(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(*id)
        .await?
        .ok_or(AppError::NotFound)?;
    let comments = state.comments.for_post(post.id).await?;
    let views = post_views(&state, std::slice::from_ref(&post)).await?;
    let post_view = views.into_iter().next().ok_or(AppError::NotFound)?;
    let body = render(
        &state,
        Page::PostDetail {
            post: post_view,
            comments: comment_views(&state, &comments).await?,
        },
    )
    .await?;
    Ok(html(body))
}

/// Multipart post form: text fields plus an optional image upload.
#[derive(MultipartForm)]
pub struct PostUpload {
    pub title: Option<Text<String>>,
    pub text: Option<Text<String>>,
    pub group: Option<Text<String>>,
    pub image: Option<TempFile>,
}

/// Validated form content, ready to persist.
struct PostInput {
    title: String,
    text: String,
    group_id: Option<i64>,
    /// Path of a freshly stored upload; `None` when no file was sent.
    image: Option<String>,
}

/// Check the submitted form. Field problems come back as a re-renderable
/// form state instead of an error response.
async fn validate_form(
    state: &AppState,
    form: PostUpload,
) -> AppResult<Result<PostInput, PostFormState>> {
    let mut errors = Vec::new();

    let title = form
        .title
        .map(|t| t.into_inner().trim().to_string())
        .unwrap_or_default();
    let text = form
        .text
        .map(|t| t.into_inner().trim().to_string())
        .unwrap_or_default();
    if text.is_empty() {
        errors.push(FieldError {
            field: "text",
            message: "Post text is required".to_string(),
        });
    }

    let raw_group = form
        .group
        .map(|g| g.into_inner().trim().to_string())
        .unwrap_or_default();
    let group_id = if raw_group.is_empty() {
        None
    } else {
        match raw_group.parse::<i64>() {
            Ok(id) if state.groups.find_by_id(id).await?.is_some() => Some(id),
            _ => {
                errors.push(FieldError {
                    field: "group",
                    message: "Choose an existing group".to_string(),
                });
                None
            }
        }
    };

    let mut image = None;
    if let Some(upload) = form.image {
        if upload.size > 0 {
            let name = upload.file_name.as_deref().unwrap_or("upload");
            let bytes = tokio::fs::read(upload.file.path())
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            match state.media.store_image(name, &bytes).await {
                Ok(path) => image = Some(path),
                Err(MediaError::NotAnImage) => errors.push(FieldError {
                    field: "image",
                    message: "Upload a valid image file".to_string(),
                }),
                Err(e) => return Err(e.into()),
            }
        }
    }

    if errors.is_empty() {
        Ok(Ok(PostInput {
            title,
            text,
            group_id,
            image,
        }))
    } else {
        Ok(Err(PostFormState {
            title,
            text,
            group_id,
            errors,
        }))
    }
}

pub async fn create_form(state: web::Data<AppState>, _user: CurrentUser) -> AppResult<HttpResponse> {
    let body = render(
        &state,
        Page::PostForm {
            form: PostFormState::default(),
            editing: None,
        },
    )
    .await?;
    Ok(html(body))
}

/// Create a post. The author always comes from the session, never the
/// form.
pub async fn create_submit(
    state: web::Data<AppState>,
    user: CurrentUser,
    form: MultipartForm<PostUpload>,
) -> AppResult<HttpResponse> {
    let input = match validate_form(&state, form.into_inner()).await? {
        Ok(input) => input,
        Err(form_state) => {
            let body = render(
                &state,
                Page::PostForm {
                    form: form_state,
                    editing: None,
                },
            )
            .await?;
            return Ok(html(body));
        }
    };

    let post = state
        .posts
        .create(NewPost {
            author_id: user.0.user_id,
            group_id: input.group_id,
            title: input.title,
            text: input.text,
            image: input.image,
        })
        .await?;
    tracing::info!(post_id = post.id, author = %user.0.username, "Post created");
    Ok(redirect(format!("/profile/{}/", user.0.username)))
}

pub async fn edit_form(
    state: web::Data<AppState>,
    user: CurrentUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(*id)
        .await?
        .ok_or(AppError::NotFound)?;
    // Someone else's post: silently bounce to the detail page.
    if !can_modify(user.0.user_id, &post) {
        return Ok(redirect(format!("/posts/{}/", post.id)));
    }
    let body = render(
        &state,
        Page::PostForm {
            form: PostFormState {
                title: post.title,
                text: post.text,
                group_id: post.group_id,
                errors: Vec::new(),
            },
            editing: Some(post.id),
        },
    )
    .await?;
    Ok(html(body))
}

pub async fn edit_submit(
    state: web::Data<AppState>,
    user: CurrentUser,
    id: web::Path<i64>,
    form: MultipartForm<PostUpload>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(*id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !can_modify(user.0.user_id, &post) {
        return Ok(redirect(format!("/posts/{}/", post.id)));
    }

    let input = match validate_form(&state, form.into_inner()).await? {
        Ok(input) => input,
        Err(form_state) => {
            let body = render(
                &state,
                Page::PostForm {
                    form: form_state,
                    editing: Some(post.id),
                },
            )
            .await?;
            return Ok(html(body));
        }
    };

    state
        .posts
        .update(
            post.id,
            PostChanges {
                title: input.title,
                text: input.text,
                group_id: input.group_id,
                // Absent upload keeps the stored image.
                image: input.image,
            },
        )
        .await?;
    Ok(redirect(format!("/posts/{}/", post.id)))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(*id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !can_modify(user.0.user_id, &post) {
        return Ok(redirect(format!("/posts/{}/", post.id)));
    }
    state.posts.delete(post.id).await?;
    tracing::info!(post_id = post.id, author = %user.0.username, "Post deleted");
    Ok(redirect(format!("/profile/{}/", user.0.username)))
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

/// Attach a comment and return to the post, whether or not the text
/// passed validation.
pub async fn add_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    id: web::Path<i64>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(*id)
        .await?
        .ok_or(AppError::NotFound)?;
    let text = form.text.trim();
    if !text.is_empty() {
        state
            .comments
            .create(NewComment {
                post_id: post.id,
                author_id: user.0.user_id,
                text: text.to_string(),
            })
            .await?;
    }
    Ok(redirect(format!("/posts/{}/", post.id)))
}

/// Non-POST hit on the comment route: nothing to save, back to the post.
pub async fn comment_fallback(
    state: web::Data<AppState>,
    _user: CurrentUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(*id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(redirect(format!("/posts/{}/", post.id)))
}
