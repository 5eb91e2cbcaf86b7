use crate::api::error;
use crate::modules::chat::{model::InsertChat, schema::ChatEntity};

#[async_trait::async_trait]
pub trait ChatRepository {
    async fn create(&self, chat: &InsertChat) -> Result<ChatEntity, error::SystemError>;

    /// Messages exchanged between the two users in either direction, newest
    /// first by `(timestamp, id)`, strictly before the `before` key when given.
    async fn find_between(
        &self,
        user_id: i64,
        other_id: i64,
        before: Option<(chrono::DateTime<chrono::Utc>, i64)>,
        limit: i64,
    ) -> Result<Vec<ChatEntity>, error::SystemError>;
}
