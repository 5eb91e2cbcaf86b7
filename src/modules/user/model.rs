use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::{Gender, UserEntity};
use crate::utils::double_option;

#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(length(min = 1, max = 32, message = "Username must be 1 to 32 characters long"))]
    pub username: String,
    #[validate(
        email(message = "Invalid email address"),
        length(max = 80, message = "Email must be at most 80 characters long")
    )]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    pub gender: Gender,
    #[validate(length(max = 128, message = "About me must be at most 128 characters long"))]
    pub about_me: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    #[validate(length(min = 1, message = "This username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "This password is required"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateProfileModel {
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 128, message = "About me must be at most 128 characters long"))]
    pub about_me: Option<Option<String>>,
    pub gender: Option<Gender>,
}

#[derive(Deserialize, Validate)]
pub struct PasswordResetRequestModel {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Deserialize, Validate)]
pub struct ResetPasswordModel {
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

pub struct InsertUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub gender: Gender,
    pub about_me: Option<String>,
}

pub struct UpdateUser {
    pub about_me: Option<Option<String>>,
    pub gender: Option<Gender>,
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub id: i64,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub access_token: String,
}

/// The account as its owner sees it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub gender: Gender,
    pub about_me: Option<String>,
    pub verified: bool,
    pub last_seen: chrono::DateTime<chrono::Utc>,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            gender: entity.gender,
            about_me: entity.about_me,
            verified: entity.verified,
            last_seen: entity.last_seen,
        }
    }
}

/// The account as other users see it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PublicUserResponse {
    pub id: i64,
    pub username: String,
    pub gender: Gender,
    pub about_me: Option<String>,
    pub last_seen: chrono::DateTime<chrono::Utc>,
}

impl From<UserResponse> for PublicUserResponse {
    fn from(user: UserResponse) -> Self {
        PublicUserResponse {
            id: user.id,
            username: user.username,
            gender: user.gender,
            about_me: user.about_me,
            last_seen: user.last_seen,
        }
    }
}

impl From<UserEntity> for PublicUserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse::from(entity).into()
    }
}
