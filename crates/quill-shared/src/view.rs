//! Page view models.
//!
//! Every handler reduces its result to one `Page` value plus the shared
//! `Nav` context; the renderer is the only consumer. Keeping these plain
//! data types is what lets the rendered home page be cached verbatim.

use serde::Serialize;

/// A post prepared for display.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub author_username: String,
    pub author_name: String,
    pub group: Option<GroupRef>,
    /// Relative media path of the attached image, if any.
    pub image: Option<String>,
    pub pub_date: String,
}

/// A comment prepared for display.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub author_username: String,
    pub text: String,
    pub created: String,
}

/// Minimal group reference for links and menus.
#[derive(Debug, Clone, Serialize)]
pub struct GroupRef {
    pub title: String,
    pub slug: String,
}

/// A group as shown in the directory.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Minimal author reference for links and menus.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorRef {
    pub username: String,
    pub full_name: String,
}

/// Pagination state of a listing page.
#[derive(Debug, Clone, Serialize)]
pub struct PageWindow {
    pub page: u64,
    pub pages: u64,
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

/// A paginated run of posts.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub window: PageWindow,
    pub posts: Vec<PostView>,
}

/// Navigation context attached to every page: only groups and authors
/// that actually have posts appear in the menus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Nav {
    pub groups: Vec<GroupRef>,
    pub authors: Vec<AuthorRef>,
}

/// State of the post form, round-tripped on validation failure so the
/// user keeps what they typed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostFormState {
    pub title: String,
    pub text: String,
    pub group_id: Option<i64>,
    /// Field-level validation messages; empty on first render.
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Everything the presentation layer can be asked to draw.
#[derive(Debug, Clone, Serialize)]
pub enum Page {
    Home {
        page_name: String,
        listing: Listing,
        /// Up to three newest posts that carry an image.
        image_strip: Vec<PostView>,
    },
    GroupPosts {
        title: String,
        slug: String,
        description: String,
        listing: Listing,
    },
    Profile {
        author: AuthorRef,
        following: bool,
        listing: Listing,
    },
    PostDetail {
        post: PostView,
        comments: Vec<CommentView>,
    },
    PostForm {
        form: PostFormState,
        /// `Some(post id)` when editing an existing post.
        editing: Option<i64>,
    },
    Feed {
        page_name: String,
        listing: Listing,
    },
    Groups {
        groups: Vec<GroupSummary>,
    },
    Authors {
        authors: Vec<AuthorRef>,
    },
    Login {
        next: Option<String>,
    },
}
