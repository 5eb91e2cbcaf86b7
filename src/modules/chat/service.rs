use std::sync::Arc;

use crate::api::error;
use crate::constants::MAX_HISTORY_PAGE;
use crate::modules::chat::{model::InsertChat, repository::ChatRepository, schema::ChatEntity};
use crate::modules::friend::{
    model::RelationStatus, repository::FriendshipRepository, service::FriendService,
};
use crate::modules::user::repository::UserRepository;

const DEFAULT_HISTORY_PAGE: i64 = 30;

/// Direct messages between friends.
pub struct ChatService<C, R, U>
where
    C: ChatRepository + Send + Sync,
    R: FriendshipRepository,
    U: UserRepository + Send + Sync,
{
    chat_repo: Arc<C>,
    friends: FriendService<R, U>,
}

impl<C, R, U> Clone for ChatService<C, R, U>
where
    C: ChatRepository + Send + Sync,
    R: FriendshipRepository,
    U: UserRepository + Send + Sync,
{
    fn clone(&self) -> Self {
        ChatService { chat_repo: self.chat_repo.clone(), friends: self.friends.clone() }
    }
}

impl<C, R, U> ChatService<C, R, U>
where
    C: ChatRepository + Send + Sync,
    R: FriendshipRepository,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(chat_repo: Arc<C>, friends: FriendService<R, U>) -> Self {
        log::info!("ChatService initialized with dependencies");
        ChatService { chat_repo, friends }
    }

    pub async fn send_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        message: String,
    ) -> Result<ChatEntity, error::SystemError> {
        if message.trim().is_empty() {
            return Err(error::SystemError::bad_request("Message cannot be empty"));
        }

        if self.friends.user_status(sender_id, receiver_id).await? != RelationStatus::Friends {
            return Err(error::SystemError::forbidden("You can only message your friends"));
        }

        self.chat_repo.create(&InsertChat { sender_id, receiver_id, message }).await
    }

    /// One page of the conversation, oldest message first, plus the cursor of
    /// the next (older) page when there is one.
    pub async fn history(
        &self,
        user_id: i64,
        other_id: i64,
        limit: Option<i64>,
        cursor: Option<String>,
    ) -> Result<(Vec<ChatEntity>, Option<String>), error::SystemError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_PAGE).clamp(1, MAX_HISTORY_PAGE);

        let before = cursor.as_deref().map(decode_cursor).transpose()?;

        let mut messages =
            self.chat_repo.find_between(user_id, other_id, before, limit + 1).await?;

        let next_cursor = if messages.len() > limit as usize {
            messages.pop();
            messages.last().map(encode_cursor)
        } else {
            None
        };

        messages.reverse();
        Ok((messages, next_cursor))
    }
}

/// `<RFC 3339 timestamp>_<message id>` of the oldest message already returned.
fn encode_cursor(message: &ChatEntity) -> String {
    format!(
        "{}_{}",
        message.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        message.id
    )
}

fn decode_cursor(cursor: &str) -> Result<(chrono::DateTime<chrono::Utc>, i64), error::SystemError> {
    let invalid = || error::SystemError::bad_request("Invalid cursor format");

    let (timestamp, id) = cursor.rsplit_once('_').ok_or_else(invalid)?;
    let timestamp = chrono::DateTime::parse_from_rfc3339(timestamp).map_err(|_| invalid())?;
    let id = id.parse::<i64>().map_err(|_| invalid())?;

    Ok((timestamp.with_timezone(&chrono::Utc), id))
}
