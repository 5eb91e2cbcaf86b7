use actix_web::{delete, get, post, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::{
            model::{FriendRequestsResponse, FriendResponse, FriendshipOutcome, RelationStatusResponse},
            repository_pg::FriendshipRepositoryPg,
            service::FriendService,
        },
        user::repository_pg::UserRepositoryPg,
    },
};

pub type FriendSvc = FriendService<FriendshipRepositoryPg, UserRepositoryPg>;

/// Caller mistakes stay HTTP errors; storage failures are reported as a
/// `PersistenceError` outcome so every friendship endpoint answers with the same body.
fn settle(
    result: Result<FriendshipOutcome, error::SystemError>,
) -> Result<FriendshipOutcome, error::Error> {
    match result {
        Ok(outcome) => {
            if !outcome.is_ok() {
                log::debug!("Friendship operation refused: {:?}", outcome.kind);
            }
            Ok(outcome)
        }
        Err(
            e @ (error::SystemError::BadRequest(_)
            | error::SystemError::NotFound(_)
            | error::SystemError::Unauthorized(_)
            | error::SystemError::Forbidden(_)),
        ) => Err(e.into()),
        Err(e) => Ok(FriendshipOutcome::persistence_error(&e)),
    }
}

#[get("/")]
pub async fn list_friends(
    friend_service: web::Data<FriendSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let friends = friend_service.all_friends(user_id).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[get("/requests")]
pub async fn list_friend_requests(
    friend_service: web::Data<FriendSvc>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestsResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.friend_requests(user_id).await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[get("/{user_id}/status")]
pub async fn relation_status(
    friend_service: web::Data<FriendSvc>,
    other_id: web::Path<i64>,
    req: HttpRequest,
) -> Result<success::Success<RelationStatusResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let state = friend_service.user_status(user_id, *other_id).await?;

    Ok(success::Success::ok(Some(RelationStatusResponse {
        user_id: *other_id,
        status: state.code(),
        state,
    })))
}

#[post("/{user_id}/request")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendSvc>,
    other_id: web::Path<i64>,
    req: HttpRequest,
) -> Result<FriendshipOutcome, error::Error> {
    let user_id = get_claims(&req)?.sub;
    settle(friend_service.send_request(user_id, *other_id).await)
}

#[post("/{user_id}/accept")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendSvc>,
    other_id: web::Path<i64>,
    req: HttpRequest,
) -> Result<FriendshipOutcome, error::Error> {
    let user_id = get_claims(&req)?.sub;
    settle(friend_service.accept_request(user_id, *other_id).await)
}

#[delete("/{user_id}")]
pub async fn remove_friend(
    friend_service: web::Data<FriendSvc>,
    other_id: web::Path<i64>,
    req: HttpRequest,
) -> Result<FriendshipOutcome, error::Error> {
    let user_id = get_claims(&req)?.sub;
    settle(friend_service.unfriend(user_id, *other_id).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::friend::{model::OutcomeKind, schema::FriendshipEntity};
    use actix_web::{http::StatusCode, Responder, ResponseError};

    #[test]
    fn storage_failures_become_a_persistence_outcome() {
        let outcome =
            settle(Err(error::SystemError::DatabaseError("connection reset".into()))).unwrap();
        assert_eq!(outcome.kind, OutcomeKind::PersistenceError);
        assert_eq!(outcome.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let outcome = settle(Err(error::SystemError::Conflict(None))).unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Conflict);
        assert_eq!(outcome.status_code(), StatusCode::CONFLICT);
    }

    async fn render(outcome: FriendshipOutcome) -> (StatusCode, serde_json::Value) {
        let req = actix_web::test::TestRequest::default().to_http_request();
        let resp = outcome.respond_to(&req);
        let status = resp.status();
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[actix_web::test]
    async fn outcome_body_carries_kind_detail_and_relation() {
        let updated = chrono::DateTime::parse_from_rfc3339("2024-05-01T10:20:30Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let relation = FriendshipEntity { id: 7, from_id: 1, to_id: 2, status: false, updated };

        let (status, body) = render(FriendshipOutcome::ok(Some(relation))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "kind": "Ok",
                "detail": null,
                "relation": {
                    "id": 7,
                    "from_id": 1,
                    "to_id": 2,
                    "status": false,
                    "updated": "2024-05-01T10:20:30Z",
                },
            })
        );

        let (status, body) = render(FriendshipOutcome::already_friends()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, serde_json::json!({ "kind": "AlreadyFriends", "detail": "Already friends." }));

        let failed = settle(Err(error::SystemError::DatabaseError("connection reset".into()))).unwrap();
        let (status, body) = render(failed).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "PersistenceError");
        assert!(body.get("relation").is_none());
    }

    #[test]
    fn caller_mistakes_stay_http_errors() {
        let err = settle(Err(error::SystemError::not_found("Receiver user not found"))).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = settle(Err(error::SystemError::bad_request("Cannot send friend request to yourself")))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
