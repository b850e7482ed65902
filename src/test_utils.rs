//! In-memory collaborators for exercising services, the schema and the HTTP
//! surface without MongoDB or a media host.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult, EMAIL_TAKEN, USERNAME_TAKEN},
    models::domain::{Profile, Quiz, User, UserChanges},
    repositories::{ProfileRepository, QuizRepository, UserRepository},
    services::media_service::MediaHost,
};

/// Mirrors the unique indexes of the Mongo users collection.
fn unique_against(
    users: &[User],
    id: &str,
    username: Option<&str>,
    email: Option<&str>,
) -> AppResult<()> {
    let others = || users.iter().filter(|u| u.id != id);
    if let Some(username) = username {
        if others().any(|u| u.username == username) {
            return Err(AppError::conflict("username", USERNAME_TAKEN));
        }
    }
    if let Some(email) = email {
        if others().any(|u| u.email == email) {
            return Err(AppError::conflict("email", EMAIL_TAKEN));
        }
    }
    Ok(())
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        unique_against(&users, &user.id, Some(&user.username), Some(&user.email))?;
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_fields(&self, id: &str, changes: &UserChanges) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        unique_against(&users, id, changes.username.as_deref(), changes.email.as_deref())?;
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.apply(changes);
            user.clone()
        }))
    }

    async fn delete(&self, id: &str) -> AppResult<u64> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok((before - users.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<Vec<Profile>>,
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: Profile) -> AppResult<Profile> {
        self.profiles.write().await.push(profile.clone());
        Ok(profile)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<Profile>> {
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn delete_by_user(&self, user_id: &str) -> AppResult<u64> {
        let mut profiles = self.profiles.write().await;
        let before = profiles.len();
        profiles.retain(|p| p.user_id != user_id);
        Ok((before - profiles.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: RwLock<Vec<Quiz>>,
}

impl InMemoryQuizRepository {
    async fn newest_first(&self, keep: impl Fn(&Quiz) -> bool) -> Vec<Quiz> {
        let mut quizzes: Vec<Quiz> = self
            .quizzes
            .read()
            .await
            .iter()
            .filter(|q| keep(q))
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        quizzes
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        Ok(self
            .quizzes
            .read()
            .await
            .iter()
            .find(|q| q.id == id)
            .cloned())
    }

    async fn list_quizzes(&self) -> AppResult<Vec<Quiz>> {
        Ok(self.newest_first(|_| true).await)
    }

    async fn list_quizzes_by_author(&self, author_id: &str) -> AppResult<Vec<Quiz>> {
        Ok(self.newest_first(|q| q.author == author_id).await)
    }

    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.quizzes.write().await.push(quiz.clone());
        Ok(quiz)
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        let stored = quizzes
            .iter_mut()
            .find(|q| q.id == quiz.id)
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz.id)))?;
        *stored = quiz.clone();
        Ok(quiz)
    }

    async fn delete(&self, id: &str) -> AppResult<u64> {
        let mut quizzes = self.quizzes.write().await;
        let before = quizzes.len();
        quizzes.retain(|q| q.id != id);
        Ok((before - quizzes.len()) as u64)
    }

    async fn delete_by_author(&self, author_id: &str) -> AppResult<u64> {
        let mut quizzes = self.quizzes.write().await;
        let before = quizzes.len();
        quizzes.retain(|q| q.author != author_id);
        Ok((before - quizzes.len()) as u64)
    }
}

/// Hands out `https://media.test/<n>` references and remembers every call.
#[derive(Default)]
pub struct RecordingMediaHost {
    next_id: AtomicUsize,
    fail_deletes: AtomicBool,
    uploads: RwLock<Vec<String>>,
    deletes: RwLock<Vec<String>>,
}

impl RecordingMediaHost {
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub async fn uploads(&self) -> Vec<String> {
        self.uploads.read().await.clone()
    }

    pub async fn deletes(&self) -> Vec<String> {
        self.deletes.read().await.clone()
    }
}

#[async_trait]
impl MediaHost for RecordingMediaHost {
    async fn upload(&self, payload: &str) -> AppResult<String> {
        self.uploads.write().await.push(payload.to_string());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://media.test/{}", id))
    }

    async fn delete(&self, reference: &str) -> AppResult<()> {
        self.deletes.write().await.push(reference.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::UpstreamFailure("media host unavailable".to_string()));
        }
        Ok(())
    }
}

pub mod fixtures {
    use super::*;
    use crate::{
        app_state::AppState,
        config::Config,
        models::dto::request::{QuizInput, RegisterInput},
    };

    /// Application state plus handles on its in-memory backends.
    pub struct TestContext {
        pub state: AppState,
        pub users: Arc<InMemoryUserRepository>,
        pub profiles: Arc<InMemoryProfileRepository>,
        pub quizzes: Arc<InMemoryQuizRepository>,
        pub media: Arc<RecordingMediaHost>,
    }

    pub fn test_context() -> TestContext {
        let users = Arc::new(InMemoryUserRepository::default());
        let profiles = Arc::new(InMemoryProfileRepository::default());
        let quizzes = Arc::new(InMemoryQuizRepository::default());
        let media = Arc::new(RecordingMediaHost::default());

        let state = AppState::from_parts(
            &Config::test_config(),
            users.clone(),
            profiles.clone(),
            quizzes.clone(),
            media.clone(),
        );

        TestContext {
            state,
            users,
            profiles,
            quizzes,
            media,
        }
    }

    pub fn test_app_state() -> AppState {
        test_context().state
    }

    pub fn register_input(username: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
        }
    }

    pub fn quiz_input(title: &str) -> QuizInput {
        QuizInput {
            title: title.to_string(),
            description: String::new(),
            questions: vec![],
            image: None,
        }
    }
}
