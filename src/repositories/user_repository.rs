use async_trait::async_trait;
use mongodb::{
    bson::{doc, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult, EMAIL_TAKEN, USERNAME_TAKEN},
    models::domain::{User, UserChanges},
};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Writes only the fields present in `changes`; `None` when the user is gone.
    async fn update_fields(&self, id: &str, changes: &UserChanges) -> AppResult<Option<User>>;
    /// Returns the number of removed documents; deleting twice is not an error.
    async fn delete(&self, id: &str) -> AppResult<u64>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for users collection");

        for (field, name) in [
            ("id", "id_unique"),
            ("username", "username_unique"),
            ("email", "email_unique"),
        ] {
            let model = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name(name.to_string())
                        .build(),
                )
                .build();
            self.collection.create_index(model).await?;
        }

        log::info!("Successfully created indexes for users collection");
        Ok(())
    }
}

/// Server message of a unique-index violation, if that is what `err` is.
fn duplicate_key_message(err: &MongoError) -> Option<&str> {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE => {
            Some(e.message.as_str())
        }
        ErrorKind::Command(e) if e.code == DUPLICATE_KEY_CODE => Some(e.message.as_str()),
        _ => None,
    }
}

/// Maps a violation of `username_unique` / `email_unique` to the same conflict
/// the availability check reports. Lets two racing registrations fail cleanly.
fn conflict_from_duplicate_key(message: &str) -> Option<AppError> {
    if message.contains("username_unique") {
        Some(AppError::conflict("username", USERNAME_TAKEN))
    } else if message.contains("email_unique") {
        Some(AppError::conflict("email", EMAIL_TAKEN))
    } else {
        None
    }
}

fn map_write_error(err: MongoError) -> AppError {
    duplicate_key_message(&err)
        .and_then(conflict_from_duplicate_key)
        .unwrap_or_else(|| AppError::from(err))
}

fn set_document(changes: &UserChanges) -> Document {
    let mut set = Document::new();
    if let Some(username) = &changes.username {
        set.insert("username", username.as_str());
    }
    if let Some(email) = &changes.email {
        set.insert("email", email.as_str());
    }
    if let Some(password_hash) = &changes.password_hash {
        set.insert("password_hash", password_hash.as_str());
    }
    if let Some(avatar) = &changes.avatar {
        set.insert("avatar", avatar.as_str());
    }
    if let Some(cover) = &changes.cover {
        set.insert("cover", cover.as_str());
    }
    set
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        self.collection
            .insert_one(&user)
            .await
            .map_err(map_write_error)?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn update_fields(&self, id: &str, changes: &UserChanges) -> AppResult<Option<User>> {
        let set = set_document(changes);
        if set.is_empty() {
            return self.find_by_id(id).await;
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let user = self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set })
            .with_options(options)
            .await
            .map_err(map_write_error)?;
        Ok(user)
    }

    async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count)
    }
}
