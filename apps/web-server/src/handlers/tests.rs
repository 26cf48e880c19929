//! Handler tests over the in-memory store.

use std::time::Duration;

use actix_web::{App, cookie::Cookie, http::StatusCode, test, web};

use quill_core::domain::{NewPost, User};
use quill_infra::memory::MemoryStore;

use crate::config::AppConfig;
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: None,
        db_max_connections: 1,
        db_min_connections: 1,
        posts_per_page: 10,
        cache_ttl: Duration::from_secs(20),
        media_root: std::env::temp_dir().join(format!("quill-handlers-{}", uuid::Uuid::new_v4())),
    }
}

async fn test_state() -> AppState {
    AppState::with_memory(&MemoryStore::new(), &test_config()).await
}

async fn seed_user(state: &AppState, username: &str) -> User {
    state.users.create(username, "").await.unwrap()
}

async fn seed_post(state: &AppState, author: &User, text: &str) -> quill_core::domain::Post {
    state
        .posts
        .create(NewPost {
            author_id: author.id,
            group_id: None,
            title: String::new(),
            text: text.to_string(),
            image: None,
        })
        .await
        .unwrap()
}

fn session_cookie(state: &AppState, user: &User) -> Cookie<'static> {
    let token = state.sessions.issue(user.id, &user.username).unwrap();
    Cookie::new(SESSION_COOKIE, token)
}

fn location(resp: &actix_web::dev::ServiceResponse) -> &str {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

const BOUNDARY: &str = "----quillformboundary";

/// Build a multipart/form-data body out of plain text fields.
fn multipart_body(fields: &[(&str, &str)]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

fn tiny_png() -> Vec<u8> {
    let img = image::RgbImage::new(1, 1);
    let mut bytes = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// Multipart body with text fields plus one file part named `image`.
fn multipart_body_with_file(
    fields: &[(&str, &str)],
    file_name: &str,
    file_bytes: &[u8],
) -> (String, Vec<u8>) {
    let (_, mut body) = multipart_body(fields);
    // Drop the closing boundary so the file part can be appended.
    body.truncate(body.len() - format!("--{BOUNDARY}--\r\n").len());
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
             filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file_bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(super::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn anonymous_comment_redirects_to_login() {
    let state = test_state().await;
    let author = seed_user(&state, "leo").await;
    let post = seed_post(&state, &author, "hello").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .set_form([("text", "drive-by")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("/auth/login/?next=/posts/{}/comment/", post.id)
    );
    assert!(state.comments.for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn signed_in_comment_is_created_and_redirects_back() {
    let state = test_state().await;
    let author = seed_user(&state, "leo").await;
    let reader = seed_user(&state, "sonya").await;
    let post = seed_post(&state, &author, "hello").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .cookie(session_cookie(&state, &reader))
        .set_form([("text", "Nice one")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    let comments = state.comments.for_post(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author_id, reader.id);
    assert_eq!(comments[0].text, "Nice one");
}

#[actix_web::test]
async fn comment_on_missing_post_is_not_found() {
    let state = test_state().await;
    let reader = seed_user(&state, "sonya").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/posts/9999/comment/")
        .cookie(session_cookie(&state, &reader))
        .set_form([("text", "into the void")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn anonymous_create_redirects_to_login() {
    let state = test_state().await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/create/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/create/");
}

#[actix_web::test]
async fn create_forces_author_from_session() {
    let state = test_state().await;
    let writer = seed_user(&state, "leo").await;
    let app = test_app!(state);

    let (content_type, body) = multipart_body(&[("title", "Day one"), ("text", "First entry")]);
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session_cookie(&state, &writer))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/leo/");
    let page = state.posts.page_by_author(writer.id, 1, 10).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].author_id, writer.id);
    assert_eq!(page.items[0].text, "First entry");
}

#[actix_web::test]
async fn uploaded_image_is_stored_and_served() {
    let state = test_state().await;
    let writer = seed_user(&state, "leo").await;
    let app = test_app!(state);

    let png = tiny_png();
    let (content_type, body) =
        multipart_body_with_file(&[("text", "with picture")], "pic.png", &png);
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session_cookie(&state, &writer))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let page = state.posts.page_by_author(writer.id, 1, 10).await.unwrap();
    let stored = page.items[0].image.clone().expect("image path recorded");
    assert!(stored.starts_with("posts/"));

    let req = test::TestRequest::get()
        .uri(&format!("/media/{stored}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let served = test::read_body(resp).await;
    assert!(!served.is_empty());
}

#[actix_web::test]
async fn non_image_upload_rerenders_the_form() {
    let state = test_state().await;
    let writer = seed_user(&state, "leo").await;
    let app = test_app!(state);

    let (content_type, body) =
        multipart_body_with_file(&[("text", "with junk")], "junk.bin", b"not an image");
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session_cookie(&state, &writer))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Upload a valid image file"));
    assert_eq!(state.posts.page_all(1, 10).await.unwrap().total, 0);
}

#[actix_web::test]
async fn create_without_text_rerenders_the_form() {
    let state = test_state().await;
    let writer = seed_user(&state, "leo").await;
    let app = test_app!(state);

    let (content_type, body) = multipart_body(&[("title", "Empty"), ("text", "   ")]);
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session_cookie(&state, &writer))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Post text is required"));
    assert_eq!(state.posts.page_all(1, 10).await.unwrap().total, 0);
}

#[actix_web::test]
async fn non_owner_edit_is_a_silent_redirect() {
    let state = test_state().await;
    let author = seed_user(&state, "leo").await;
    let intruder = seed_user(&state, "fyodor").await;
    let post = seed_post(&state, &author, "original words").await;
    let app = test_app!(state);

    let (content_type, body) = multipart_body(&[("text", "rewritten")]);
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(session_cookie(&state, &intruder))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    let unchanged = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.text, "original words");
}

#[actix_web::test]
async fn owner_edit_updates_the_post() {
    let state = test_state().await;
    let author = seed_user(&state, "leo").await;
    let post = seed_post(&state, &author, "draft").await;
    let app = test_app!(state);

    let (content_type, body) = multipart_body(&[("title", "Final"), ("text", "polished")]);
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(session_cookie(&state, &author))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    let updated = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.text, "polished");
    assert_eq!(updated.author_id, author.id);
}

#[actix_web::test]
async fn non_owner_delete_leaves_the_post() {
    let state = test_state().await;
    let author = seed_user(&state, "leo").await;
    let intruder = seed_user(&state, "fyodor").await;
    let post = seed_post(&state, &author, "keep me").await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/delete/", post.id))
        .cookie(session_cookie(&state, &intruder))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    assert!(state.posts.find_by_id(post.id).await.unwrap().is_some());
}

#[actix_web::test]
async fn following_yourself_changes_nothing() {
    let state = test_state().await;
    let user = seed_user(&state, "leo").await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/profile/leo/follow/")
        .cookie(session_cookie(&state, &user))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/leo/");
    assert!(state.follows.list_for(user.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn following_twice_keeps_a_single_edge() {
    let state = test_state().await;
    let follower = seed_user(&state, "sonya").await;
    let _author = seed_user(&state, "leo").await;
    let app = test_app!(state);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/profile/leo/follow/")
            .cookie(session_cookie(&state, &follower))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    assert_eq!(state.follows.list_for(follower.id).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn unfollowing_a_stranger_is_a_noop() {
    let state = test_state().await;
    let follower = seed_user(&state, "sonya").await;
    let _author = seed_user(&state, "leo").await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/profile/leo/unfollow/")
        .cookie(session_cookie(&state, &follower))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/leo/");
}

#[actix_web::test]
async fn feed_shows_only_followed_authors() {
    let state = test_state().await;
    let reader = seed_user(&state, "sonya").await;
    let followed = seed_user(&state, "leo").await;
    let stranger = seed_user(&state, "fyodor").await;
    seed_post(&state, &followed, "from leo").await;
    seed_post(&state, &stranger, "from fyodor").await;
    state.follows.create(reader.id, followed.id).await.unwrap();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/follow/")
        .cookie(session_cookie(&state, &reader))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("from leo"));
    assert!(!html.contains("from fyodor"));
}

#[actix_web::test]
async fn page_beyond_last_clamps_to_last() {
    let state = test_state().await;
    let author = seed_user(&state, "leo").await;
    for i in 0..13 {
        seed_post(&state, &author, &format!("entry {i}")).await;
    }
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/?page=99").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("Page 2 of 2"));
}

#[actix_web::test]
async fn home_page_stays_cached_until_cleared() {
    let state = test_state().await;
    let author = seed_user(&state, "leo").await;
    seed_post(&state, &author, "first").await;
    let app = test_app!(state);

    let doomed = seed_post(&state, &author, "second").await;
    let first = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;

    // The deletion hides behind the cached copy until the TTL or an
    // explicit clear.
    state.posts.delete(doomed.id).await.unwrap();
    let stale = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(first, stale);

    let req = test::TestRequest::post()
        .uri("/admin/cache/clear/")
        .cookie(session_cookie(&state, &author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let fresh = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
    let html = String::from_utf8(fresh.to_vec()).unwrap();
    assert!(!html.contains("second"));
    assert!(html.contains("first"));
}

#[actix_web::test]
async fn author_directory_includes_users_without_posts() {
    let state = test_state().await;
    let author = seed_user(&state, "leo").await;
    seed_user(&state, "lurker").await;
    seed_post(&state, &author, "hello").await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/authors/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();

    // The directory lists everyone; the nav menu stays limited to users
    // with posts, so "lurker" appears exactly once.
    assert!(html.contains("/profile/lurker/"));
    assert_eq!(html.matches("/profile/lurker/").count(), 1);
    assert!(html.matches("/profile/leo/").count() >= 2);
}

#[actix_web::test]
async fn unknown_group_and_profile_are_not_found() {
    let state = test_state().await;
    let app = test_app!(state);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/group/nope/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/profile/nobody/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn group_page_lists_only_that_group() {
    let state = test_state().await;
    let author = seed_user(&state, "leo").await;
    let group = state
        .groups
        .create("War", "war", "Long reads")
        .await
        .unwrap();
    state
        .posts
        .create(NewPost {
            author_id: author.id,
            group_id: Some(group.id),
            title: String::new(),
            text: "grouped entry".to_string(),
            image: None,
        })
        .await
        .unwrap();
    seed_post(&state, &author, "loose entry").await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/group/war/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("grouped entry"));
    assert!(!html.contains("loose entry"));
}

#[actix_web::test]
async fn post_detail_shows_comments() {
    let state = test_state().await;
    let author = seed_user(&state, "leo").await;
    let post = seed_post(&state, &author, "discuss").await;
    state
        .comments
        .create(quill_core::domain::NewComment {
            post_id: post.id,
            author_id: author.id,
            text: "first!".to_string(),
        })
        .await
        .unwrap();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("discuss"));
    assert!(html.contains("first!"));
}

#[actix_web::test]
async fn login_page_echoes_next_target() {
    let state = test_state().await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/auth/login/?next=/create/")
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("/create/"));
}
