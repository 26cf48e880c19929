use serde::{Deserialize, Serialize};

/// Group entity - a named collection posts can be filed under.
///
/// Groups are managed out-of-band (migrations/seeding); end users only
/// reference them. The slug is the unique URL key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}
