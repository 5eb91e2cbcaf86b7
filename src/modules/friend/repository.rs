use crate::api::error;
use crate::modules::friend::schema::FriendshipEntity;

/// Storage for friendship rows. Mutations run inside a transaction scope taken
/// from [`FriendshipRepository::begin`]; dropping the scope without
/// [`FriendshipRepository::commit`] discards every change made through it.
#[async_trait::async_trait]
pub trait FriendshipRepository: Send + Sync {
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, error::SystemError>;

    async fn commit(&self, tx: Self::Tx) -> Result<(), error::SystemError>;

    /// The row joining the two users, preferring `(user_id, other_id)` over the reverse.
    async fn find_relation(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<Option<FriendshipEntity>, error::SystemError>;

    /// Same lookup as [`find_relation`](Self::find_relation), holding the row
    /// until the transaction ends.
    async fn lock_relation(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        other_id: i64,
    ) -> Result<Option<FriendshipEntity>, error::SystemError>;

    async fn insert_request(
        &self,
        tx: &mut Self::Tx,
        from_id: i64,
        to_id: i64,
    ) -> Result<FriendshipEntity, error::SystemError>;

    async fn mark_accepted(
        &self,
        tx: &mut Self::Tx,
        id: i64,
    ) -> Result<FriendshipEntity, error::SystemError>;

    async fn delete_relation(&self, tx: &mut Self::Tx, id: i64)
    -> Result<bool, error::SystemError>;

    /// Accepted rows touching `user_id` in either direction, newest first.
    async fn find_accepted(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendshipEntity>, error::SystemError>;

    /// Pending rows addressed to `user_id`, newest first.
    async fn find_pending_to(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendshipEntity>, error::SystemError>;

    /// Pending rows sent by `user_id`, newest first.
    async fn find_pending_from(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendshipEntity>, error::SystemError>;
}
