use async_graphql::Context;

use crate::{
    auth::Identity,
    errors::{AppError, AppResult},
};

/// Allows the action only when the caller owns the resource.
pub fn require_owner(identity: &Identity, owner_id: &str) -> AppResult<()> {
    if identity.id != owner_id {
        return Err(AppError::Forbidden("Action not allowed".to_string()));
    }
    Ok(())
}

pub fn require_identity(ctx: &Context<'_>) -> AppResult<Identity> {
    ctx.data_opt::<Identity>()
        .cloned()
        .ok_or(AppError::NotAuthenticated)
}
