use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::Profile};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, profile: Profile) -> AppResult<Profile>;
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<Profile>>;
    async fn delete_by_user(&self, user_id: &str) -> AppResult<u64>;
}

pub struct MongoProfileRepository {
    collection: Collection<Profile>,
}

impl MongoProfileRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(model).await?;
        log::info!("Created unique index on profiles.user_id");

        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MongoProfileRepository {
    async fn create(&self, profile: Profile) -> AppResult<Profile> {
        self.collection.insert_one(&profile).await?;
        Ok(profile)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<Profile>> {
        let profile = self
            .collection
            .find_one(doc! { "user_id": user_id })
            .await?;
        Ok(profile)
    }

    async fn delete_by_user(&self, user_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_one(doc! { "user_id": user_id })
            .await?;
        Ok(result.deleted_count)
    }
}
