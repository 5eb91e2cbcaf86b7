use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::chat::schema::ChatEntity;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendChatModel {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1 to 4000 characters long"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InsertChat {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<ChatEntity>,
    pub cursor: Option<String>,
}
