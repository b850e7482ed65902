use async_graphql::{ComplexObject, Context, Result, ResultExt, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{graphql::helpers::resolve_user, models::dto::response::UserDto};

/// Companion document created alongside every user.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
#[graphql(complex)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn for_user(user_id: &str) -> Self {
        Profile {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[ComplexObject]
impl Profile {
    async fn user_data(&self, ctx: &Context<'_>) -> Result<Option<UserDto>> {
        resolve_user(ctx, &self.user_id).await.extend()
    }
}
