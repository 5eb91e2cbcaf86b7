use serde::Serialize;
use sqlx::prelude::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ChatEntity {
    pub id: i64,
    pub message: String,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
