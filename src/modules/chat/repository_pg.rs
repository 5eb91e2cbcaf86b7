use crate::{
    api::error,
    modules::chat::{model::InsertChat, repository::ChatRepository, schema::ChatEntity},
};

#[derive(Clone)]
pub struct ChatRepositoryPg {
    pool: sqlx::PgPool,
}

impl ChatRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ChatRepository for ChatRepositoryPg {
    async fn create(&self, chat: &InsertChat) -> Result<ChatEntity, error::SystemError> {
        let chat = sqlx::query_as::<_, ChatEntity>(
            r#"
            INSERT INTO chats (message, sender_id, receiver_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&chat.message)
        .bind(chat.sender_id)
        .bind(chat.receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(chat)
    }

    async fn find_between(
        &self,
        user_id: i64,
        other_id: i64,
        before: Option<(chrono::DateTime<chrono::Utc>, i64)>,
        limit: i64,
    ) -> Result<Vec<ChatEntity>, error::SystemError> {
        let chats = sqlx::query_as::<_, ChatEntity>(
            r#"
            SELECT * FROM chats
            WHERE LEAST(sender_id, receiver_id) = LEAST($1::bigint, $2::bigint)
              AND GREATEST(sender_id, receiver_id) = GREATEST($1::bigint, $2::bigint)
              AND ($3::timestamptz IS NULL OR (timestamp, id) < ($3, $4::bigint))
            ORDER BY timestamp DESC, id DESC
            LIMIT $5
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .bind(before.map(|(timestamp, _)| timestamp))
        .bind(before.map(|(_, id)| id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(chats)
    }
}
