use serde::{Deserialize, Serialize};

/// Follow edge - `user_id` follows `author_id`.
///
/// Invariants enforced both in storage (unique pair, no self edge) and at
/// the handler boundary: duplicates and self-follows are silent no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}
