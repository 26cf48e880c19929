//! Authorization policy.
//!
//! Edit and delete share this one predicate so the ownership rule cannot
//! drift between the two paths.

use crate::domain::Post;

/// Only a post's author may modify or delete it.
pub fn can_modify(user_id: i64, post: &Post) -> bool {
    post.author_id == user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post_by(author_id: i64) -> Post {
        Post {
            id: 1,
            author_id,
            group_id: None,
            title: String::new(),
            text: "text".to_string(),
            image: None,
            pub_date: Utc::now(),
        }
    }

    #[test]
    fn owner_can_modify() {
        assert!(can_modify(7, &post_by(7)));
    }

    #[test]
    fn non_owner_cannot_modify() {
        assert!(!can_modify(8, &post_by(7)));
    }
}
