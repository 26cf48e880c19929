use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity - an author mirrored from the external identity provider.
///
/// Credentials and login live with the identity provider; this record only
/// carries what the platform itself needs (unique username, display name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name, falling back to the username when no full name is set.
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}
