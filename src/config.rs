use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";
const MIN_JWT_SECRET_LEN: usize = 32;
const MIN_PRODUCTION_BCRYPT_COST: u32 = 12;

/// Cheapest cost bcrypt accepts; keeps hashing fast in tests.
#[cfg(any(test, feature = "test-support"))]
pub const TEST_BCRYPT_COST: u32 = 4;

#[derive(Clone, Debug)]
pub struct Config {
    pub app_env: String,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub users_collection: String,
    pub profiles_collection: String,
    pub quizzes_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub media_base_url: String,
    pub media_api_key: SecretString,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            app_env: var_or("APP_ENV", "development"),
            mongo_conn_string: var_or("MONGO_CONN_STRING", "mongodb://localhost:27017"),
            mongo_db_name: var_or("MONGO_DB_NAME", "quizzy-local"),
            users_collection: var_or("USERS_COLLECTION", "users"),
            profiles_collection: var_or("PROFILES_COLLECTION", "profiles"),
            quizzes_collection: var_or("QUIZZES_COLLECTION", "quizzes"),
            web_server_host: var_or("WEB_SERVER_HOST", "localhost"),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_allowed_origin: var_or("CORS_ALLOWED_ORIGIN", "http://localhost:3000"),
            jwt_secret: SecretString::from(var_or("JWT_SECRET", DEFAULT_JWT_SECRET)),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
            media_base_url: var_or("MEDIA_BASE_URL", "http://localhost:9000"),
            media_api_key: SecretString::from(var_or("MEDIA_API_KEY", "")),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Rejects development defaults that must never reach production.
    pub fn validate_for_production(&self) -> AppResult<()> {
        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEFAULT_JWT_SECRET {
            return Err(AppError::InternalError(
                "JWT_SECRET is using the default value; set it to a secure random string"
                    .to_string(),
            ));
        }

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AppError::InternalError(format!(
                "JWT_SECRET is too short ({}); it must be at least {} characters",
                jwt_secret.len(),
                MIN_JWT_SECRET_LEN
            )));
        }

        if self.bcrypt_cost < MIN_PRODUCTION_BCRYPT_COST {
            return Err(AppError::InternalError(format!(
                "BCRYPT_COST is {}; production requires at least {}",
                self.bcrypt_cost, MIN_PRODUCTION_BCRYPT_COST
            )));
        }

        Ok(())
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn test_config() -> Self {
        Self {
            app_env: "test".to_string(),
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quizzy-test".to_string(),
            users_collection: "users".to_string(),
            profiles_collection: "profiles".to_string(),
            quizzes_collection: "quizzes".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: "http://localhost:3000".to_string(),
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            bcrypt_cost: TEST_BCRYPT_COST,
            media_base_url: "http://localhost:9000".to_string(),
            media_api_key: SecretString::from("test_media_key".to_string()),
        }
    }
}
