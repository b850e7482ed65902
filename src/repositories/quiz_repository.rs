use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Quiz,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>>;
    /// Newest first.
    async fn list_quizzes(&self) -> AppResult<Vec<Quiz>>;
    /// Newest first.
    async fn list_quizzes_by_author(&self, author_id: &str) -> AppResult<Vec<Quiz>>;
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz>;
    /// Replaces the stored document wholesale (last writer wins).
    async fn update(&self, quiz: Quiz) -> AppResult<Quiz>;
    async fn delete(&self, id: &str) -> AppResult<u64>;
    async fn delete_by_author(&self, author_id: &str) -> AppResult<u64>;
}

pub struct MongoQuizRepository {
    collection: Collection<Quiz>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let author_index = IndexModel::builder()
            .keys(doc! { "author": 1, "created_at": -1 })
            .options(IndexOptions::builder().name("author_created".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(author_index).await?;

        log::info!("Successfully created indexes for quizzes collection");
        Ok(())
    }

    async fn find_newest_first(&self, filter: Document) -> AppResult<Vec<Quiz>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self.collection.find(filter).with_options(find_options).await?;
        let items: Vec<Quiz> = cursor.try_collect().await?;

        Ok(items)
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quiz = self.collection.find_one(doc! { "id": id }).await?;
        Ok(quiz)
    }

    async fn list_quizzes(&self) -> AppResult<Vec<Quiz>> {
        self.find_newest_first(doc! {}).await
    }

    async fn list_quizzes_by_author(&self, author_id: &str) -> AppResult<Vec<Quiz>> {
        self.find_newest_first(doc! { "author": author_id }).await
    }

    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.collection.insert_one(&quiz).await?;
        Ok(quiz)
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        let result = self
            .collection
            .replace_one(doc! { "id": &quiz.id }, &quiz)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Quiz with id '{}' not found",
                quiz.id
            )));
        }

        Ok(quiz)
    }

    async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count)
    }

    async fn delete_by_author(&self, author_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "author": author_id })
            .await?;
        Ok(result.deleted_count)
    }
}
