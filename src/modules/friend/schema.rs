use serde::Serialize;
use sqlx::prelude::FromRow;

/// One directed edge between two users. `status` is false while the request is
/// pending and true once it has been accepted.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FriendshipEntity {
    pub id: i64,
    pub from_id: i64,
    pub to_id: i64,
    pub status: bool,
    pub updated: chrono::DateTime<chrono::Utc>,
}

impl FriendshipEntity {
    /// The user on the far side of the edge from `viewer`.
    pub fn other(&self, viewer: i64) -> i64 {
        if self.from_id == viewer { self.to_id } else { self.from_id }
    }
}
