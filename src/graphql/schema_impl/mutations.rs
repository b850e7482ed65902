use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::{
    auth::require_identity,
    graphql::helpers::app_state,
    models::{
        domain::Quiz,
        dto::{
            request::{LoginInput, QuizInput, RegisterInput, UpdateAccountInput},
            response::{AuthPayload, UserDto},
        },
    },
};

pub const QUIZ_DELETED: &str = "Quiz successfully deleted";
pub const ACCOUNT_DELETED: &str = "Account successfully deleted";

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn register(
        &self,
        ctx: &Context<'_>,
        register_input: RegisterInput,
    ) -> Result<AuthPayload> {
        let state = app_state(ctx).extend()?;
        state.account_service.register(register_input).await.extend()
    }

    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<AuthPayload> {
        let state = app_state(ctx).extend()?;
        state
            .account_service
            .login(LoginInput { username, password })
            .await
            .extend()
    }

    async fn update_account(
        &self,
        ctx: &Context<'_>,
        update_account_input: UpdateAccountInput,
    ) -> Result<UserDto> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        let user = state
            .account_service
            .update_account(&identity, update_account_input)
            .await
            .extend()?;
        Ok(UserDto::from(user))
    }

    /// Removes the caller's quizzes, profile and user record.
    async fn delete_user_data(&self, ctx: &Context<'_>) -> Result<String> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        state.account_service.delete_account(&identity).await.extend()?;
        Ok(ACCOUNT_DELETED.to_string())
    }

    async fn add_avatar(&self, ctx: &Context<'_>, picture: String) -> Result<UserDto> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        let user = state
            .account_service
            .add_avatar(&identity, &picture)
            .await
            .extend()?;
        Ok(UserDto::from(user))
    }

    async fn create_quiz(&self, ctx: &Context<'_>, quiz_input: QuizInput) -> Result<Quiz> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        state
            .quiz_service
            .create_quiz(&identity, quiz_input)
            .await
            .extend()
    }

    async fn update_quiz(
        &self,
        ctx: &Context<'_>,
        quiz_id: ID,
        quiz_input: QuizInput,
    ) -> Result<Quiz> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        state
            .quiz_service
            .update_quiz(&identity, &quiz_id, quiz_input)
            .await
            .extend()
    }

    async fn delete_quiz(&self, ctx: &Context<'_>, quiz_id: ID) -> Result<String> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        state
            .quiz_service
            .delete_quiz(&identity, &quiz_id)
            .await
            .extend()?;
        Ok(QUIZ_DELETED.to_string())
    }

    async fn toggle_like_quiz(&self, ctx: &Context<'_>, quiz_id: ID) -> Result<Quiz> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        state
            .quiz_service
            .toggle_like(&identity, &quiz_id)
            .await
            .extend()
    }

    async fn create_comment(
        &self,
        ctx: &Context<'_>,
        quiz_id: ID,
        body: String,
    ) -> Result<Quiz> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        state
            .quiz_service
            .add_comment(&identity, &quiz_id, body)
            .await
            .extend()
    }

    async fn delete_comment(
        &self,
        ctx: &Context<'_>,
        quiz_id: ID,
        comment_id: ID,
    ) -> Result<Quiz> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        state
            .quiz_service
            .delete_comment(&identity, &quiz_id, &comment_id)
            .await
            .extend()
    }
}
