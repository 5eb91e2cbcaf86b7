use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        friend::{
            model::{
                FriendRequestResponse, FriendRequestsResponse, FriendResponse, FriendshipOutcome,
                RelationStatus, NOTHING_TO_REMOVE, SEND_REQUEST_FIRST,
            },
            repository::FriendshipRepository,
            schema::FriendshipEntity,
        },
        user::{model::PublicUserResponse, repository::UserRepository},
    },
};

/// Friend-request state machine. Per unordered pair of users there is at most
/// one row; [`FriendService::user_status`] is the authority on its state.
pub struct FriendService<R, U>
where
    R: FriendshipRepository,
    U: UserRepository + Send + Sync,
{
    friend_repo: Arc<R>,
    user_repo: Arc<U>,
}

impl<R, U> Clone for FriendService<R, U>
where
    R: FriendshipRepository,
    U: UserRepository + Send + Sync,
{
    fn clone(&self) -> Self {
        FriendService { friend_repo: self.friend_repo.clone(), user_repo: self.user_repo.clone() }
    }
}

impl<R, U> FriendService<R, U>
where
    R: FriendshipRepository,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(friend_repo: Arc<R>, user_repo: Arc<U>) -> Self {
        log::info!("FriendService initialized with dependencies");
        FriendService { friend_repo, user_repo }
    }

    pub async fn check_relation(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        self.friend_repo.find_relation(user_id, other_id).await
    }

    pub async fn user_status(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<RelationStatus, error::SystemError> {
        let relation = self.check_relation(user_id, other_id).await?;
        Ok(RelationStatus::from_viewer(relation.as_ref(), user_id))
    }

    pub async fn send_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendshipOutcome, error::SystemError> {
        if sender_id == receiver_id {
            return Err(error::SystemError::bad_request("Cannot send friend request to yourself"));
        }

        if self.user_repo.find_by_id(receiver_id).await?.is_none() {
            return Err(error::SystemError::not_found("Receiver user not found"));
        }

        let mut tx = self.friend_repo.begin().await?;

        let relation = self.friend_repo.lock_relation(&mut tx, sender_id, receiver_id).await?;
        match RelationStatus::from_viewer(relation.as_ref(), sender_id) {
            RelationStatus::None => {}
            RelationStatus::Friends => return Ok(FriendshipOutcome::already_friends()),
            RelationStatus::PendingOutgoing | RelationStatus::PendingIncoming => {
                return Ok(FriendshipOutcome::request_pending());
            }
        }

        let created = match self.friend_repo.insert_request(&mut tx, sender_id, receiver_id).await {
            Err(e) if e.is_conflict() => return Ok(lost_race(sender_id, receiver_id)),
            other => other?,
        };

        match self.friend_repo.commit(tx).await {
            Err(e) if e.is_conflict() => Ok(lost_race(sender_id, receiver_id)),
            other => {
                other?;
                log::info!("User {} sent a friend request to {}", sender_id, receiver_id);
                Ok(FriendshipOutcome::ok(Some(created)))
            }
        }
    }

    /// Accepts the pending request between the two users, whichever side sent it.
    pub async fn accept_request(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<FriendshipOutcome, error::SystemError> {
        let mut tx = self.friend_repo.begin().await?;

        let Some(relation) = self.friend_repo.lock_relation(&mut tx, user_id, other_id).await?
        else {
            return Ok(FriendshipOutcome::no_request_found(SEND_REQUEST_FIRST));
        };

        match RelationStatus::from_viewer(Some(&relation), user_id) {
            RelationStatus::Friends => return Ok(FriendshipOutcome::already_friends()),
            RelationStatus::PendingOutgoing
            | RelationStatus::PendingIncoming
            | RelationStatus::None => {}
        }

        let accepted = self.friend_repo.mark_accepted(&mut tx, relation.id).await?;

        match self.friend_repo.commit(tx).await {
            Err(e) if e.is_conflict() => Ok(lost_race(user_id, other_id)),
            other => {
                other?;
                log::info!("User {} accepted the friend request from {}", user_id, other_id);
                Ok(FriendshipOutcome::ok(Some(accepted)))
            }
        }
    }

    /// Removes the relation in whatever state it is: cancels or declines a
    /// pending request, or ends a friendship.
    pub async fn unfriend(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<FriendshipOutcome, error::SystemError> {
        let mut tx = self.friend_repo.begin().await?;

        let Some(relation) = self.friend_repo.lock_relation(&mut tx, user_id, other_id).await?
        else {
            return Ok(FriendshipOutcome::no_request_found(NOTHING_TO_REMOVE));
        };

        if !self.friend_repo.delete_relation(&mut tx, relation.id).await? {
            return Ok(FriendshipOutcome::no_request_found(NOTHING_TO_REMOVE));
        }

        match self.friend_repo.commit(tx).await {
            Err(e) if e.is_conflict() => Ok(lost_race(user_id, other_id)),
            other => {
                other?;
                log::info!("User {} removed the relation with {}", user_id, other_id);
                Ok(FriendshipOutcome::ok(None))
            }
        }
    }

    pub async fn all_friends(&self, user_id: i64) -> Result<Vec<FriendResponse>, error::SystemError> {
        let relations = self.friend_repo.find_accepted(user_id).await?;
        let users = self.resolve_users(user_id, &relations).await?;

        Ok(relations
            .iter()
            .filter_map(|r| {
                users
                    .get(&r.other(user_id))
                    .map(|u| FriendResponse { user: u.clone(), since: r.updated })
            })
            .collect())
    }

    pub async fn friend_requests(
        &self,
        user_id: i64,
    ) -> Result<FriendRequestsResponse, error::SystemError> {
        let (received, sent) = tokio::try_join!(
            self.friend_repo.find_pending_to(user_id),
            self.friend_repo.find_pending_from(user_id),
        )?;

        Ok(FriendRequestsResponse {
            received: self.to_request_responses(user_id, &received).await?,
            sent: self.to_request_responses(user_id, &sent).await?,
        })
    }

    async fn to_request_responses(
        &self,
        user_id: i64,
        relations: &[FriendshipEntity],
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let users = self.resolve_users(user_id, relations).await?;

        Ok(relations
            .iter()
            .filter_map(|r| {
                users.get(&r.other(user_id)).map(|u| FriendRequestResponse {
                    id: r.id,
                    user: u.clone(),
                    updated: r.updated,
                })
            })
            .collect())
    }

    async fn resolve_users(
        &self,
        user_id: i64,
        relations: &[FriendshipEntity],
    ) -> Result<HashMap<i64, PublicUserResponse>, error::SystemError> {
        let ids: Vec<i64> = relations.iter().map(|r| r.other(user_id)).collect();
        let users = self.user_repo.find_by_ids(&ids).await?;

        Ok(users.into_iter().map(|u| (u.id, PublicUserResponse::from(u))).collect())
    }
}

fn lost_race(user_id: i64, other_id: i64) -> FriendshipOutcome {
    log::warn!("Concurrent change on the relation between {} and {}", user_id, other_id);
    FriendshipOutcome::conflict()
}
