use crate::modules::friend::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/friends")
            .service(list_friends)
            .service(list_friend_requests)
            .service(relation_status)
            .service(send_friend_request)
            .service(accept_friend_request)
            .service(remove_friend),
    );
}
