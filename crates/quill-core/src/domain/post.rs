use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - a published entry on the site.
///
/// `author_id` and `pub_date` are immutable after creation; edits may only
/// touch title, text, group and image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub title: String,
    pub text: String,
    /// Relative media path of the attached image, if any.
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
}

/// A post about to be created. The id is assigned by storage and the
/// publication timestamp is stamped by the caller from the system clock.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
}

impl NewPost {
    /// Materialize the post with a storage-assigned id placeholder.
    pub fn into_post(self, pub_date: DateTime<Utc>) -> Post {
        Post {
            id: 0,
            author_id: self.author_id,
            group_id: self.group_id,
            title: self.title,
            text: self.text,
            image: self.image,
            pub_date,
        }
    }
}

/// The mutable subset of a post. Authorship and publication date are
/// deliberately absent.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub text: String,
    pub group_id: Option<i64>,
    /// `None` leaves the stored image untouched.
    pub image: Option<String>,
}
