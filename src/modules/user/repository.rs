use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateUser},
        schema::UserEntity,
    },
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError>;

    /// Users for the given ids, in no particular order. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<UserEntity>, error::SystemError>;

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError>;

    async fn create(&self, user: &InsertUser) -> Result<i64, error::SystemError>;

    async fn update(&self, id: i64, user: &UpdateUser) -> Result<UserEntity, error::SystemError>;

    async fn set_verified(&self, id: i64) -> Result<bool, error::SystemError>;

    async fn set_password_hash(&self, id: i64, hash: &str) -> Result<bool, error::SystemError>;

    async fn touch_last_seen(&self, id: i64) -> Result<(), error::SystemError>;
}
