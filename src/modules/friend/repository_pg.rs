use sqlx::{Postgres, Transaction};

use crate::{
    api::error,
    modules::friend::{repository::FriendshipRepository, schema::FriendshipEntity},
};

const SELECT_RELATION: &str = r#"
    SELECT * FROM friendships
    WHERE (from_id = $1 AND to_id = $2)
       OR (from_id = $2 AND to_id = $1)
    ORDER BY (from_id = $1) DESC
    LIMIT 1
"#;

#[derive(Clone)]
pub struct FriendshipRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendshipRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendshipRepository for FriendshipRepositoryPg {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, error::SystemError> {
        Ok(self.pool.begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), error::SystemError> {
        tx.commit().await?;
        Ok(())
    }

    async fn find_relation(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let relation = sqlx::query_as::<_, FriendshipEntity>(SELECT_RELATION)
            .bind(user_id)
            .bind(other_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(relation)
    }

    async fn lock_relation(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        other_id: i64,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let query = format!("{SELECT_RELATION} FOR UPDATE");
        let relation = sqlx::query_as::<_, FriendshipEntity>(&query)
            .bind(user_id)
            .bind(other_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(relation)
    }

    async fn insert_request(
        &self,
        tx: &mut Self::Tx,
        from_id: i64,
        to_id: i64,
    ) -> Result<FriendshipEntity, error::SystemError> {
        let relation = sqlx::query_as::<_, FriendshipEntity>(
            r#"
            INSERT INTO friendships (from_id, to_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(from_id)
        .bind(to_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(relation)
    }

    async fn mark_accepted(
        &self,
        tx: &mut Self::Tx,
        id: i64,
    ) -> Result<FriendshipEntity, error::SystemError> {
        let relation = sqlx::query_as::<_, FriendshipEntity>(
            r#"
            UPDATE friendships
            SET status = TRUE, updated = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        Ok(relation)
    }

    async fn delete_relation(
        &self,
        tx: &mut Self::Tx,
        id: i64,
    ) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM friendships WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn find_accepted(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendshipEntity>, error::SystemError> {
        let relations = sqlx::query_as::<_, FriendshipEntity>(
            r#"
            SELECT * FROM friendships
            WHERE (from_id = $1 OR to_id = $1) AND status
            ORDER BY updated DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(relations)
    }

    async fn find_pending_to(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendshipEntity>, error::SystemError> {
        let relations = sqlx::query_as::<_, FriendshipEntity>(
            "SELECT * FROM friendships WHERE to_id = $1 AND NOT status ORDER BY updated DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(relations)
    }

    async fn find_pending_from(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendshipEntity>, error::SystemError> {
        let relations = sqlx::query_as::<_, FriendshipEntity>(
            "SELECT * FROM friendships WHERE from_id = $1 AND NOT status ORDER BY updated DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(relations)
    }
}
