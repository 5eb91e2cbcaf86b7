//! In-memory stand-ins for the Postgres repositories and the Redis cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::{
    api::error::{DbErrorMeta, SystemError},
    configs::CacheStore,
    constants::AuthSettings,
    modules::{
        chat::{model::InsertChat, repository::ChatRepository, schema::ChatEntity},
        friend::{repository::FriendshipRepository, schema::FriendshipEntity},
        user::{
            model::{InsertUser, UpdateUser},
            repository::UserRepository,
            schema::{Gender, UserEntity},
        },
    },
};

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "test-secret".into(),
        access_token_expiration: 900,
        email_token_expiration: 1800,
        require_verified_email: false,
    }
}

fn unique_violation(constraint: &str) -> SystemError {
    SystemError::Conflict(Some(DbErrorMeta {
        code: Some("23505".into()),
        constraint: Some(constraint.into()),
        message: format!("duplicate key value violates unique constraint \"{constraint}\""),
    }))
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<UserEntity>>,
}

impl MemoryUserRepository {
    /// Creates verified users named `user1`, `user2`, ... and returns their ids.
    pub async fn seed(&self, count: usize) -> Vec<i64> {
        let mut ids = Vec::with_capacity(count);
        for n in 1..=count {
            let id = self
                .create(&InsertUser {
                    username: format!("user{n}"),
                    email: format!("user{n}@example.com"),
                    password_hash: "not-a-real-hash".into(),
                    gender: if n % 2 == 0 { Gender::Female } else { Gender::Male },
                    about_me: None,
                })
                .await
                .unwrap();
            self.set_verified(id).await.unwrap();
            ids.push(id);
        }
        ids
    }

    fn with_user<T>(&self, id: i64, f: impl FnOnce(&mut UserEntity) -> T) -> Option<T> {
        let mut users = self.users.lock().unwrap();
        users.iter_mut().find(|u| u.id == id).map(f)
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, SystemError> {
        Ok(self.with_user(id, |u| u.clone()))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<UserEntity>, SystemError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserEntity>, SystemError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, SystemError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn create(&self, user: &InsertUser) -> Result<i64, SystemError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(unique_violation("users_unique_username"));
        }
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(unique_violation("users_unique_email"));
        }

        let id = users.len() as i64 + 1;
        let now = chrono::Utc::now();
        users.push(UserEntity {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            gender: user.gender,
            about_me: user.about_me.clone(),
            verified: false,
            last_seen: now,
            created_at: now,
        });
        Ok(id)
    }

    async fn update(&self, id: i64, user: &UpdateUser) -> Result<UserEntity, SystemError> {
        self.with_user(id, |u| {
            if let Some(gender) = user.gender {
                u.gender = gender;
            }
            if let Some(about_me) = &user.about_me {
                u.about_me = about_me.clone();
            }
            u.clone()
        })
        .ok_or_else(|| SystemError::not_found("User not found"))
    }

    async fn set_verified(&self, id: i64) -> Result<bool, SystemError> {
        Ok(self.with_user(id, |u| u.verified = true).is_some())
    }

    async fn set_password_hash(&self, id: i64, hash: &str) -> Result<bool, SystemError> {
        Ok(self.with_user(id, |u| u.password_hash = hash.to_string()).is_some())
    }

    async fn touch_last_seen(&self, id: i64) -> Result<(), SystemError> {
        self.with_user(id, |u| u.last_seen = chrono::Utc::now());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FriendshipTable {
    rows: Vec<FriendshipEntity>,
    next_id: i64,
}

/// Failure injected into the next commit.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    UniqueViolation,
    ConnectionLost,
}

/// Friendship rows behind a single lock. A transaction owns the lock until it
/// commits or is dropped, so transactions are serial, and works on a copy that
/// only replaces the table on commit.
#[derive(Default)]
pub struct MemoryFriendshipRepository {
    table: Arc<AsyncMutex<FriendshipTable>>,
    fault: Mutex<Option<Fault>>,
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<FriendshipTable>,
    staged: FriendshipTable,
}

impl MemoryFriendshipRepository {
    pub fn fail_next_commit(&self, fault: Fault) {
        *self.fault.lock().unwrap() = Some(fault);
    }

    pub async fn rows(&self) -> Vec<FriendshipEntity> {
        self.table.lock().await.rows.clone()
    }

    pub async fn rows_between(&self, a: i64, b: i64) -> usize {
        self.table.lock().await.rows.iter().filter(|r| connects(r, a, b)).count()
    }
}

fn connects(row: &FriendshipEntity, a: i64, b: i64) -> bool {
    (row.from_id == a && row.to_id == b) || (row.from_id == b && row.to_id == a)
}

fn relation_between(table: &FriendshipTable, user_id: i64, other_id: i64) -> Option<FriendshipEntity> {
    table
        .rows
        .iter()
        .find(|r| r.from_id == user_id && r.to_id == other_id)
        .or_else(|| table.rows.iter().find(|r| r.from_id == other_id && r.to_id == user_id))
        .cloned()
}

fn newest_first(mut rows: Vec<FriendshipEntity>) -> Vec<FriendshipEntity> {
    rows.sort_by(|a, b| b.updated.cmp(&a.updated).then(b.id.cmp(&a.id)));
    rows
}

#[async_trait::async_trait]
impl FriendshipRepository for MemoryFriendshipRepository {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, SystemError> {
        let guard = self.table.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTx { guard, staged })
    }

    async fn commit(&self, mut tx: MemoryTx) -> Result<(), SystemError> {
        match self.fault.lock().unwrap().take() {
            Some(Fault::UniqueViolation) => return Err(unique_violation("friendships_relation")),
            Some(Fault::ConnectionLost) => {
                return Err(SystemError::DatabaseError("connection reset by peer".into()));
            }
            None => {}
        }
        *tx.guard = tx.staged;
        Ok(())
    }

    async fn find_relation(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<Option<FriendshipEntity>, SystemError> {
        Ok(relation_between(&*self.table.lock().await, user_id, other_id))
    }

    async fn lock_relation(
        &self,
        tx: &mut MemoryTx,
        user_id: i64,
        other_id: i64,
    ) -> Result<Option<FriendshipEntity>, SystemError> {
        Ok(relation_between(&tx.staged, user_id, other_id))
    }

    async fn insert_request(
        &self,
        tx: &mut MemoryTx,
        from_id: i64,
        to_id: i64,
    ) -> Result<FriendshipEntity, SystemError> {
        if tx.staged.rows.iter().any(|r| connects(r, from_id, to_id)) {
            return Err(unique_violation("friendships_relation"));
        }

        tx.staged.next_id += 1;
        let row = FriendshipEntity {
            id: tx.staged.next_id,
            from_id,
            to_id,
            status: false,
            updated: chrono::Utc::now(),
        };
        tx.staged.rows.push(row.clone());
        Ok(row)
    }

    async fn mark_accepted(
        &self,
        tx: &mut MemoryTx,
        id: i64,
    ) -> Result<FriendshipEntity, SystemError> {
        let row = tx
            .staged
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SystemError::not_found("Friend request not found"))?;
        row.status = true;
        row.updated = chrono::Utc::now();
        Ok(row.clone())
    }

    async fn delete_relation(&self, tx: &mut MemoryTx, id: i64) -> Result<bool, SystemError> {
        let before = tx.staged.rows.len();
        tx.staged.rows.retain(|r| r.id != id);
        Ok(tx.staged.rows.len() < before)
    }

    async fn find_accepted(&self, user_id: i64) -> Result<Vec<FriendshipEntity>, SystemError> {
        let table = self.table.lock().await;
        Ok(newest_first(
            table
                .rows
                .iter()
                .filter(|r| r.status && (r.from_id == user_id || r.to_id == user_id))
                .cloned()
                .collect(),
        ))
    }

    async fn find_pending_to(&self, user_id: i64) -> Result<Vec<FriendshipEntity>, SystemError> {
        let table = self.table.lock().await;
        Ok(newest_first(
            table.rows.iter().filter(|r| !r.status && r.to_id == user_id).cloned().collect(),
        ))
    }

    async fn find_pending_from(&self, user_id: i64) -> Result<Vec<FriendshipEntity>, SystemError> {
        let table = self.table.lock().await;
        Ok(newest_first(
            table.rows.iter().filter(|r| !r.status && r.from_id == user_id).cloned().collect(),
        ))
    }
}

#[derive(Default)]
pub struct MemoryChatRepository {
    chats: Mutex<Vec<ChatEntity>>,
    fixed_clock: Option<chrono::DateTime<chrono::Utc>>,
}

impl MemoryChatRepository {
    /// Every message gets the same timestamp.
    pub fn with_fixed_clock() -> Self {
        MemoryChatRepository { chats: Mutex::default(), fixed_clock: Some(chrono::Utc::now()) }
    }
}

#[async_trait::async_trait]
impl ChatRepository for MemoryChatRepository {
    async fn create(&self, chat: &InsertChat) -> Result<ChatEntity, SystemError> {
        let mut chats = self.chats.lock().unwrap();
        // strictly increasing timestamps keep paging deterministic
        let timestamp = match (self.fixed_clock, chats.last()) {
            (Some(now), _) => now,
            (None, Some(last)) => last.timestamp + chrono::Duration::milliseconds(1),
            (None, None) => chrono::Utc::now(),
        };
        let row = ChatEntity {
            id: chats.len() as i64 + 1,
            message: chat.message.clone(),
            sender_id: chat.sender_id,
            receiver_id: chat.receiver_id,
            timestamp,
        };
        chats.push(row.clone());
        Ok(row)
    }

    async fn find_between(
        &self,
        user_id: i64,
        other_id: i64,
        before: Option<(chrono::DateTime<chrono::Utc>, i64)>,
        limit: i64,
    ) -> Result<Vec<ChatEntity>, SystemError> {
        let chats = self.chats.lock().unwrap();
        Ok(chats
            .iter()
            .rev()
            .filter(|c| {
                (c.sender_id == user_id && c.receiver_id == other_id)
                    || (c.sender_id == other_id && c.receiver_id == user_id)
            })
            .filter(|c| before.map_or(true, |key| (c.timestamp, c.id) < key))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, SystemError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        _expiration: usize,
    ) -> Result<(), SystemError> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SystemError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
