use actix_web::{http::StatusCode, HttpResponse, Responder};
use serde::Serialize;
use std::borrow::Cow;

use crate::api::error::SystemError;
use crate::modules::friend::schema::FriendshipEntity;
use crate::modules::user::model::PublicUserResponse;

pub const ALREADY_FRIENDS: &str = "Already friends.";
pub const REQUEST_PENDING: &str = "Request is pending.";
pub const SEND_REQUEST_FIRST: &str = "Please send a request first!";
pub const NOTHING_TO_REMOVE: &str = "There is no friend request or friendship to remove.";
pub const CONCURRENT_CHANGE: &str = "The relation was changed by another request, please retry.";

/// Relation between two users as seen from one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationStatus {
    None = 0,
    PendingOutgoing = 1,
    PendingIncoming = 2,
    Friends = 3,
}

impl RelationStatus {
    pub fn from_viewer(relation: Option<&FriendshipEntity>, viewer: i64) -> Self {
        match relation {
            None => RelationStatus::None,
            Some(r) if r.status => RelationStatus::Friends,
            Some(r) if r.from_id == viewer => RelationStatus::PendingOutgoing,
            Some(_) => RelationStatus::PendingIncoming,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeKind {
    Ok,
    AlreadyFriends,
    RequestPending,
    NoRequestFound,
    Conflict,
    PersistenceError,
}

/// Result of a friendship operation. Refusals are outcomes, not errors.
#[derive(Debug, Clone, Serialize)]
pub struct FriendshipOutcome {
    pub kind: OutcomeKind,
    pub detail: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<FriendshipEntity>,
}

impl FriendshipOutcome {
    fn new(kind: OutcomeKind, detail: impl Into<Cow<'static, str>>) -> Self {
        Self { kind, detail: Some(detail.into()), relation: None }
    }

    pub fn ok(relation: Option<FriendshipEntity>) -> Self {
        Self { kind: OutcomeKind::Ok, detail: None, relation }
    }

    pub fn already_friends() -> Self {
        Self::new(OutcomeKind::AlreadyFriends, ALREADY_FRIENDS)
    }

    pub fn request_pending() -> Self {
        Self::new(OutcomeKind::RequestPending, REQUEST_PENDING)
    }

    pub fn no_request_found(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::new(OutcomeKind::NoRequestFound, detail)
    }

    pub fn conflict() -> Self {
        Self::new(OutcomeKind::Conflict, CONCURRENT_CHANGE)
    }

    /// Renders a failure that escaped the state machine. The cause itself stays in the logs.
    pub fn persistence_error(err: &SystemError) -> Self {
        if err.is_conflict() {
            return Self::conflict();
        }
        log::error!("Friendship operation failed: {:?}", err);
        Self::new(OutcomeKind::PersistenceError, "Something unexpected occurred")
    }

    pub fn is_ok(&self) -> bool {
        self.kind == OutcomeKind::Ok
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            OutcomeKind::Ok => StatusCode::OK,
            OutcomeKind::AlreadyFriends | OutcomeKind::RequestPending | OutcomeKind::Conflict => {
                StatusCode::CONFLICT
            }
            OutcomeKind::NoRequestFound => StatusCode::NOT_FOUND,
            OutcomeKind::PersistenceError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Responder for FriendshipOutcome {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &actix_web::HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::build(self.status_code()).json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationStatusResponse {
    pub user_id: i64,
    pub status: u8,
    pub state: RelationStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendResponse {
    #[serde(flatten)]
    pub user: PublicUserResponse,
    pub since: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestResponse {
    pub id: i64,
    #[serde(flatten)]
    pub user: PublicUserResponse,
    pub updated: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestsResponse {
    pub received: Vec<FriendRequestResponse>,
    pub sent: Vec<FriendRequestResponse>,
}
