use actix_web::{get, post, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        chat::{
            model::{HistoryQuery, HistoryResponse, SendChatModel},
            repository_pg::ChatRepositoryPg,
            schema::ChatEntity,
            service::ChatService,
        },
        friend::repository_pg::FriendshipRepositoryPg,
        user::repository_pg::UserRepositoryPg,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type ChatSvc = ChatService<ChatRepositoryPg, FriendshipRepositoryPg, UserRepositoryPg>;

#[get("/{user_id}")]
pub async fn get_history(
    chat_service: web::Data<ChatSvc>,
    other_id: web::Path<i64>,
    query: ValidatedQuery<HistoryQuery>,
    req: HttpRequest,
) -> Result<success::Success<HistoryResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let HistoryQuery { limit, cursor } = query.0;

    let (messages, cursor) = chat_service.history(user_id, *other_id, limit, cursor).await?;

    Ok(success::Success::ok(Some(HistoryResponse { messages, cursor }))
        .message("Successfully retrieved messages"))
}

#[post("/{user_id}")]
pub async fn send_message(
    chat_service: web::Data<ChatSvc>,
    other_id: web::Path<i64>,
    body: ValidatedJson<SendChatModel>,
    req: HttpRequest,
) -> Result<success::Success<ChatEntity>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let message = chat_service.send_message(user_id, *other_id, body.0.message).await?;

    Ok(success::Success::created(Some(message)).message("Message sent successfully"))
}
