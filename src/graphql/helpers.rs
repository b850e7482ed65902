use async_graphql::Context;

use crate::{
    app_state::AppState,
    errors::AppResult,
    models::dto::response::UserDto,
};

pub fn app_state<'a>(ctx: &Context<'a>) -> AppResult<&'a AppState> {
    Ok(ctx.data::<AppState>()?)
}

/// Looks up the public view of a user; `None` once the account is deleted.
pub async fn resolve_user(ctx: &Context<'_>, user_id: &str) -> AppResult<Option<UserDto>> {
    let state = app_state(ctx)?;
    let user = state.account_service.find_user(user_id).await?;
    Ok(user.map(UserDto::from))
}
