use actix_web::{get, patch, post, web, HttpRequest};

use crate::api::{error, success};
use crate::middlewares::get_claims;
use crate::modules::user::{model, service::UserService};
use crate::utils::ValidatedJson;

#[get("/profile")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.get_by_id(id).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}

#[patch("/profile")]
pub async fn update_profile(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::UpdateProfileModel>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.update_profile(id, user_data.0).await?;
    Ok(success::Success::ok(Some(user)).message("Profile updated successfully"))
}

#[post("/verification")]
pub async fn request_verification(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let id = get_claims(&req)?.sub;
    user_service.request_verification(id).await?;
    Ok(success::Success::ok(None).message("A verification link has been sent to your email"))
}

#[get("/{id:[0-9]+}")]
pub async fn get_user(
    user_service: web::Data<UserService>,
    user_id: web::Path<i64>,
) -> Result<success::Success<model::PublicUserResponse>, error::Error> {
    let user = user_service.get_public(user_id.into_inner()).await?;
    Ok(success::Success::ok(Some(user)).message("User retrieved successfully"))
}

#[post("/signup")]
pub async fn sign_up(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignUpModel>,
) -> Result<success::Success<model::SignUpResponse>, error::Error> {
    let user_id = user_service.sign_up(user_data.0).await?;
    Ok(success::Success::created(Some(model::SignUpResponse { id: user_id }))
        .message("Signup successful, please check your email to verify your account"))
}

#[post("/signin")]
pub async fn sign_in(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignInModel>,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let access_token = user_service.sign_in(user_data.0).await?;
    Ok(success::Success::ok(Some(model::SignInResponse { access_token }))
        .message("Signin successful"))
}

#[post("/verify/{token}")]
pub async fn verify_email(
    user_service: web::Data<UserService>,
    token: web::Path<String>,
) -> Result<success::Success<()>, error::Error> {
    user_service.verify_email(&token).await?;
    Ok(success::Success::ok(None).message("Email verified successfully"))
}

#[post("/password-reset")]
pub async fn request_password_reset(
    user_service: web::Data<UserService>,
    body: ValidatedJson<model::PasswordResetRequestModel>,
) -> Result<success::Success<()>, error::Error> {
    user_service.request_password_reset(&body.0.email).await?;
    Ok(success::Success::ok(None)
        .message("If the address is registered, a reset link has been sent to it"))
}

#[post("/password-reset/{token}")]
pub async fn reset_password(
    user_service: web::Data<UserService>,
    token: web::Path<String>,
    body: ValidatedJson<model::ResetPasswordModel>,
) -> Result<success::Success<()>, error::Error> {
    user_service.reset_password(&token, &body.0.password).await?;
    Ok(success::Success::ok(None).message("Password changed successfully"))
}
