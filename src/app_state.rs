use std::sync::Arc;

use chrono::Duration;

use crate::{
    auth::{JwtService, PasswordHasher},
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoProfileRepository, MongoQuizRepository, MongoUserRepository, ProfileRepository,
        QuizRepository, UserRepository,
    },
    services::{
        account_service::AccountService,
        media_service::{HttpMediaHost, MediaHost},
        quiz_service::QuizService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService>,
    pub quiz_service: Arc<QuizService>,
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users = MongoUserRepository::new(&db, &config.users_collection);
        users.ensure_indexes().await?;

        let profiles = MongoProfileRepository::new(&db, &config.profiles_collection);
        profiles.ensure_indexes().await?;

        let quizzes = MongoQuizRepository::new(&db, &config.quizzes_collection);
        quizzes.ensure_indexes().await?;

        let media = HttpMediaHost::new(&config.media_base_url, config.media_api_key.clone());

        Ok(Self::from_parts(
            &config,
            Arc::new(users),
            Arc::new(profiles),
            Arc::new(quizzes),
            Arc::new(media),
        ))
    }

    /// Wires the services over already constructed storage and media backends.
    pub fn from_parts(
        config: &Config,
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
        quizzes: Arc<dyn QuizRepository>,
        media: Arc<dyn MediaHost>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            Duration::hours(config.jwt_expiration_hours),
        ));

        let account_service = Arc::new(AccountService::new(
            users,
            profiles,
            Arc::clone(&quizzes),
            Arc::clone(&media),
            PasswordHasher::new(config.bcrypt_cost),
            Arc::clone(&jwt_service),
        ));
        let quiz_service = Arc::new(QuizService::new(quizzes, media));

        Self {
            account_service,
            quiz_service,
            jwt_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::Identity, test_utils::fixtures::test_app_state};

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_token_service_uses_configured_secret() {
        let state = test_app_state();
        let token = state
            .jwt_service
            .issue(&Identity::new("u1", "alice"))
            .unwrap();

        let same_secret = JwtService::new(&Config::test_config().jwt_secret, Duration::hours(1));
        assert_eq!(same_secret.verify(&token).unwrap().sub, "u1");
    }
}
