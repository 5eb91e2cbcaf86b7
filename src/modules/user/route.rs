use crate::modules::user::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/auth")
            .service(sign_up)
            .service(sign_in)
            .service(verify_email)
            .service(request_password_reset)
            .service(reset_password),
    );
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/users")
            .service(get_profile)
            .service(update_profile)
            .service(request_verification)
            .service(get_user),
    );
}
