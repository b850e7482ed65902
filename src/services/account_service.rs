use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{Identity, JwtService, PasswordHasher},
    errors::{AppError, AppResult, FieldErrors, EMAIL_TAKEN, USERNAME_TAKEN},
    models::{
        domain::{Profile, User, UserChanges},
        dto::{
            request::{LoginInput, RegisterInput, UpdateAccountInput},
            response::{AuthPayload, UserDto},
        },
    },
    repositories::{ProfileRepository, QuizRepository, UserRepository},
    services::media_service::{discard_best_effort, MediaHost},
};

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    quizzes: Arc<dyn QuizRepository>,
    media: Arc<dyn MediaHost>,
    hasher: PasswordHasher,
    jwt_service: Arc<JwtService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
        quizzes: Arc<dyn QuizRepository>,
        media: Arc<dyn MediaHost>,
        hasher: PasswordHasher,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            users,
            profiles,
            quizzes,
            media,
            hasher,
            jwt_service,
        }
    }

    pub async fn find_user(&self, id: &str) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    pub async fn current_user(&self, identity: &Identity) -> AppResult<User> {
        self.find_user(&identity.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", identity.id)))
    }

    pub async fn get_profile(&self, user_id: &str) -> AppResult<Profile> {
        self.profiles
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile for user '{}' not found", user_id)))
    }

    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthPayload> {
        input.validate()?;
        self.ensure_available(Some(&input.username), Some(&input.email))
            .await?;

        let password_hash = self.hasher.hash(&input.password).await?;
        let user = self
            .users
            .create(User::new(&input.username, &input.email, &password_hash))
            .await?;
        self.profiles.create(Profile::for_user(&user.id)).await?;

        log::info!("Registered user {} ({})", user.username, user.id);
        self.authenticated(user)
    }

    pub async fn login(&self, input: LoginInput) -> AppResult<AuthPayload> {
        input.validate()?;

        let user = self
            .users
            .find_by_username(&input.username)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !self.hasher.verify(&input.password, &user.password_hash).await {
            log::debug!("Rejected login for {}: wrong password", user.username);
            return Err(AppError::InvalidCredentials);
        }

        self.authenticated(user)
    }

    /// Values equal to the stored ones count as "not supplied", so resubmitting
    /// the current username or email never conflicts with the caller's own
    /// record.
    pub async fn update_account(
        &self,
        identity: &Identity,
        mut input: UpdateAccountInput,
    ) -> AppResult<User> {
        let current = self.current_user(identity).await?;

        input.username = input.username.filter(|u| *u != current.username);
        input.email = input.email.filter(|e| *e != current.email);
        input.validate()?;

        self.ensure_available(input.username.as_deref(), input.email.as_deref())
            .await?;

        let mut changes = UserChanges {
            username: input.username,
            email: input.email,
            ..UserChanges::default()
        };

        if let (Some(password), Some(_)) = (&input.password, &input.confirm_password) {
            changes.password_hash = Some(self.hasher.hash(password).await?);
        }
        if let Some(avatar) = non_empty(input.avatar.as_deref()) {
            changes.avatar = Some(self.media.upload(avatar).await?);
        }
        if let Some(cover) = non_empty(input.cover.as_deref()) {
            match self.media.upload(cover).await {
                Ok(reference) => changes.cover = Some(reference),
                Err(e) => {
                    self.discard_uploads(&changes).await;
                    return Err(e);
                }
            }
        }

        if changes.is_empty() {
            return Ok(current);
        }

        self.persist_changes(&current.id, &changes).await
    }

    pub async fn add_avatar(&self, identity: &Identity, picture: &str) -> AppResult<User> {
        let picture = non_empty(Some(picture))
            .ok_or_else(|| AppError::validation("picture", "Picture must not be empty"))?;

        let changes = UserChanges {
            avatar: Some(self.media.upload(picture).await?),
            ..UserChanges::default()
        };

        self.persist_changes(&identity.id, &changes).await
    }

    /// Each step is idempotent, so a partially failed deletion can simply be
    /// retried.
    pub async fn delete_account(&self, identity: &Identity) -> AppResult<()> {
        let quizzes = self.quizzes.delete_by_author(&identity.id).await?;
        let profiles = self.profiles.delete_by_user(&identity.id).await?;
        let users = self.users.delete(&identity.id).await?;

        log::info!(
            "Deleted account {}: {} quizzes, {} profiles, {} users",
            identity.id,
            quizzes,
            profiles,
            users
        );
        Ok(())
    }

    /// Media uploaded for `changes` is discarded again if the write does not
    /// land, since no document will reference it.
    async fn persist_changes(&self, user_id: &str, changes: &UserChanges) -> AppResult<User> {
        let error = match self.users.update_fields(user_id, changes).await {
            Ok(Some(user)) => return Ok(user),
            Ok(None) => AppError::NotFound(format!("User with id '{}' not found", user_id)),
            Err(e) => e,
        };

        self.discard_uploads(changes).await;
        Err(error)
    }

    async fn discard_uploads(&self, changes: &UserChanges) {
        for reference in [&changes.avatar, &changes.cover].into_iter().flatten() {
            discard_best_effort(self.media.as_ref(), reference).await;
        }
    }

    async fn ensure_available(&self, username: Option<&str>, email: Option<&str>) -> AppResult<()> {
        let mut conflicts = FieldErrors::new();

        if let Some(username) = username {
            if self.users.find_by_username(username).await?.is_some() {
                conflicts.insert("username".to_string(), USERNAME_TAKEN.to_string());
            }
        }
        if let Some(email) = email {
            if self.users.find_by_email(email).await?.is_some() {
                conflicts.insert("email".to_string(), EMAIL_TAKEN.to_string());
            }
        }

        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(AppError::Conflict(conflicts))
        }
    }

    fn authenticated(&self, user: User) -> AppResult<AuthPayload> {
        let token = self.jwt_service.issue(&Identity::from(&user))?;
        Ok(AuthPayload {
            user: UserDto::from(user),
            token,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
