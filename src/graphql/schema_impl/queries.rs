use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::{
    auth::require_identity,
    graphql::helpers::app_state,
    models::{
        domain::{Profile, Quiz},
        dto::response::UserDto,
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All quizzes, newest first.
    async fn get_quizzes(&self, ctx: &Context<'_>) -> Result<Vec<Quiz>> {
        let state = app_state(ctx).extend()?;
        state.quiz_service.list_quizzes().await.extend()
    }

    async fn get_quiz(&self, ctx: &Context<'_>, quiz_id: ID) -> Result<Quiz> {
        let state = app_state(ctx).extend()?;
        state.quiz_service.get_quiz(&quiz_id).await.extend()
    }

    /// Quizzes written by the caller.
    async fn get_user_quizzes(&self, ctx: &Context<'_>) -> Result<Vec<Quiz>> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        state
            .quiz_service
            .list_quizzes_by_author(&identity.id)
            .await
            .extend()
    }

    async fn get_others_quizzes(&self, ctx: &Context<'_>, user_id: ID) -> Result<Vec<Quiz>> {
        let state = app_state(ctx).extend()?;
        state
            .quiz_service
            .list_quizzes_by_author(&user_id)
            .await
            .extend()
    }

    async fn current_user(&self, ctx: &Context<'_>) -> Result<UserDto> {
        let state = app_state(ctx).extend()?;
        let identity = require_identity(ctx).extend()?;

        let user = state.account_service.current_user(&identity).await.extend()?;
        Ok(UserDto::from(user))
    }

    async fn get_profile(&self, ctx: &Context<'_>, user_id: ID) -> Result<Profile> {
        let state = app_state(ctx).extend()?;
        state.account_service.get_profile(&user_id).await.extend()
    }
}
