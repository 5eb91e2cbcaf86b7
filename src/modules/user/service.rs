use log::info;
use std::sync::Arc;

use crate::api::error;
use crate::configs::CacheStore;
use crate::constants::{AuthSettings, PROFILE_CACHE_TTL};
use crate::modules::user::model::{
    InsertUser, PublicUserResponse, SignInModel, SignUpModel, UpdateProfileModel, UpdateUser,
    UserResponse,
};
use crate::modules::user::{repository::UserRepository, schema::UserEntity};
use crate::utils::{hash_password, issue_token, verify_password, verify_token, TokenPurpose};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Arc<dyn CacheStore>,
    auth: AuthSettings,
}

fn cache_key(id: i64) -> String {
    format!("user:{}", id)
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Arc<dyn CacheStore>,
        auth: AuthSettings,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache, auth }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<UserResponse, error::SystemError> {
        let key = cache_key(id);
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            info!("User {} found in cache", id);
            return Ok(cached_user);
        }
        let user_entity = self.repo.find_by_id(id).await?;
        if let Some(entity) = user_entity {
            self.cache.set(&key, &UserResponse::from(entity.clone()), PROFILE_CACHE_TTL).await?;
            info!("User {} cached", id);
            Ok(UserResponse::from(entity))
        } else {
            Err(error::SystemError::not_found("User not found"))
        }
    }

    pub async fn get_public(&self, id: i64) -> Result<PublicUserResponse, error::SystemError> {
        self.get_by_id(id).await.map(PublicUserResponse::from)
    }

    pub async fn update_profile(
        &self,
        id: i64,
        user: UpdateProfileModel,
    ) -> Result<UserResponse, error::SystemError> {
        if user.about_me.is_none() && user.gender.is_none() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let update_user = UpdateUser { about_me: user.about_me, gender: user.gender };
        let updated = self.repo.update(id, &update_user).await?;

        self.cache.delete(&cache_key(id)).await?;
        Ok(UserResponse::from(updated))
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<i64, error::SystemError> {
        let password_hash = hash_password(&user.password)?;

        let new_user = InsertUser {
            username: user.username,
            email: user.email,
            password_hash,
            gender: user.gender,
            about_me: user.about_me.filter(|s| !s.trim().is_empty()),
        };

        let user_id = self.repo.create(&new_user).await?;
        info!("User {} signed up", user_id);

        self.dispatch_token(user_id, &new_user.email, TokenPurpose::EmailVerification)?;
        Ok(user_id)
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<String, error::SystemError> {
        let user_entity = self
            .repo
            .find_by_username(&user.username)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid username or password"))?;

        let valid = verify_password(&user_entity.password_hash, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid username or password"));
        }

        if self.auth.require_verified_email && !user_entity.verified {
            return Err(error::SystemError::forbidden("Please verify your email address first"));
        }

        self.touch_last_seen(user_entity.id).await?;

        issue_token(
            user_entity.id,
            TokenPurpose::AccessToken,
            self.auth.access_token_expiration,
            self.auth.jwt_secret.as_ref(),
        )
    }

    pub async fn touch_last_seen(&self, id: i64) -> Result<(), error::SystemError> {
        self.repo.touch_last_seen(id).await?;
        self.cache.delete(&cache_key(id)).await
    }

    /// Issues a fresh verification token for an unverified account.
    pub async fn request_verification(&self, id: i64) -> Result<String, error::SystemError> {
        let user = self.find_entity(id).await?;
        if user.verified {
            return Err(error::SystemError::bad_request("Email already verified"));
        }
        self.dispatch_token(user.id, &user.email, TokenPurpose::EmailVerification)
    }

    pub async fn verify_email(&self, token: &str) -> Result<(), error::SystemError> {
        let id = self.redeem(token, TokenPurpose::EmailVerification)?;
        if !self.repo.set_verified(id).await? {
            return Err(error::SystemError::not_found("User not found"));
        }
        info!("User {} verified their email", id);
        self.cache.delete(&cache_key(id)).await
    }

    /// Returns the reset token when the address belongs to an account. Unknown
    /// addresses are not reported to the caller.
    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<String>, error::SystemError> {
        let Some(user) = self.repo.find_by_email(email).await? else {
            info!("Password reset requested for unknown address");
            return Ok(None);
        };
        self.dispatch_token(user.id, &user.email, TokenPurpose::PasswordReset).map(Some)
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), error::SystemError> {
        let id = self.redeem(token, TokenPurpose::PasswordReset)?;
        let hash = hash_password(new_password)?;
        if !self.repo.set_password_hash(id, &hash).await? {
            return Err(error::SystemError::not_found("User not found"));
        }
        info!("User {} reset their password", id);
        Ok(())
    }

    async fn find_entity(&self, id: i64) -> Result<UserEntity, error::SystemError> {
        self.repo.find_by_id(id).await?.ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    fn redeem(&self, token: &str, purpose: TokenPurpose) -> Result<i64, error::SystemError> {
        verify_token(token, purpose, self.auth.jwt_secret.as_ref())
            .ok_or_else(|| error::SystemError::unauthorized("The link is invalid or has expired"))
    }

    // Mail transport is not wired in; the token is logged for the operator instead.
    fn dispatch_token(
        &self,
        id: i64,
        email: &str,
        purpose: TokenPurpose,
    ) -> Result<String, error::SystemError> {
        let token = issue_token(
            id,
            purpose,
            self.auth.email_token_expiration,
            self.auth.jwt_secret.as_ref(),
        )?;
        info!("{:?} token for user {} <{}>: {}", purpose, id, email, token);
        Ok(token)
    }
}
