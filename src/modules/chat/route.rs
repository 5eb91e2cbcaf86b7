use crate::modules::chat::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/chats").service(get_history).service(send_message));
}
