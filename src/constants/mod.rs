pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub email_token_expiration: u64,
    pub require_verified_email: bool,
    pub database_url: String,
    pub redis_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let access_token_expiration = std::env::var("ACCESS_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .expect("ACCESS_TOKEN_EXPIRATION must be a valid u64 integer");
        let email_token_expiration = std::env::var("EMAIL_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "1800".to_string())
            .parse::<u64>()
            .expect("EMAIL_TOKEN_EXPIRATION must be a valid u64 integer");
        let require_verified_email = std::env::var("REQUIRE_VERIFIED_EMAIL")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .expect("REQUIRE_VERIFIED_EMAIL must be true or false");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        Env {
            jwt_secret,
            access_token_expiration,
            email_token_expiration,
            require_verified_email,
            database_url,
            redis_url,
            frontend_url,
            ip,
            port,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

/// How long a cached user profile stays in Redis, in seconds.
pub const PROFILE_CACHE_TTL: usize = 3600;

pub const MAX_HISTORY_PAGE: i64 = 100;

/// Token settings handed to the services so they never read the process environment.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub email_token_expiration: u64,
    pub require_verified_email: bool,
}

impl Env {
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            jwt_secret: self.jwt_secret.clone(),
            access_token_expiration: self.access_token_expiration,
            email_token_expiration: self.email_token_expiration,
            require_verified_email: self.require_verified_email,
        }
    }
}
