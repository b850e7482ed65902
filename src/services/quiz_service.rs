use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_owner, Identity},
    errors::{AppError, AppResult},
    models::{
        domain::{Quiz, QuizContent},
        dto::request::QuizInput,
    },
    repositories::QuizRepository,
    services::media_service::{discard_best_effort, MediaHost},
};

/// Every mutation re-reads the quiz, applies the change to that snapshot and
/// writes the whole document back. Concurrent writers race; last one wins.
pub struct QuizService {
    repository: Arc<dyn QuizRepository>,
    media: Arc<dyn MediaHost>,
}

impl QuizService {
    pub fn new(repository: Arc<dyn QuizRepository>, media: Arc<dyn MediaHost>) -> Self {
        Self { repository, media }
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<Quiz> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    pub async fn list_quizzes(&self) -> AppResult<Vec<Quiz>> {
        self.repository.list_quizzes().await
    }

    pub async fn list_quizzes_by_author(&self, author_id: &str) -> AppResult<Vec<Quiz>> {
        self.repository.list_quizzes_by_author(author_id).await
    }

    pub async fn create_quiz(&self, identity: &Identity, input: QuizInput) -> AppResult<Quiz> {
        input.validate()?;

        let content = self.content_from_input(input).await?;
        let quiz = self
            .repository
            .create(Quiz::new(&identity.id, content))
            .await?;

        log::info!("User {} created quiz {}", identity.id, quiz.id);
        Ok(quiz)
    }

    /// Only the author may edit a quiz.
    pub async fn update_quiz(
        &self,
        identity: &Identity,
        quiz_id: &str,
        input: QuizInput,
    ) -> AppResult<Quiz> {
        input.validate()?;

        let mut quiz = self.get_quiz(quiz_id).await?;
        require_owner(identity, &quiz.author)?;

        let content = self.content_from_input(input).await?;
        let uploaded_image = content.image.clone();
        let replaced_image = quiz.apply_update(content);

        let quiz = match self.repository.update(quiz).await {
            Ok(quiz) => quiz,
            Err(e) => {
                // Nothing references the fresh upload now.
                if let Some(image) = uploaded_image {
                    self.discard_image(&image).await;
                }
                return Err(e);
            }
        };

        if let Some(image) = replaced_image {
            self.discard_image(&image).await;
        }

        Ok(quiz)
    }

    pub async fn delete_quiz(&self, identity: &Identity, quiz_id: &str) -> AppResult<()> {
        let quiz = self.get_quiz(quiz_id).await?;
        require_owner(identity, &quiz.author)?;

        // The image goes only once the document is gone, so a failed delete
        // never leaves a quiz pointing at missing media.
        self.repository.delete(&quiz.id).await?;
        if let Some(image) = &quiz.image {
            self.discard_image(image).await;
        }

        log::info!("User {} deleted quiz {}", identity.id, quiz.id);
        Ok(())
    }

    /// Any authenticated user may like any quiz, including their own.
    pub async fn toggle_like(&self, identity: &Identity, quiz_id: &str) -> AppResult<Quiz> {
        let mut quiz = self.get_quiz(quiz_id).await?;
        quiz.toggle_like(identity);
        self.repository.update(quiz).await
    }

    pub async fn add_comment(
        &self,
        identity: &Identity,
        quiz_id: &str,
        body: String,
    ) -> AppResult<Quiz> {
        let mut quiz = self.get_quiz(quiz_id).await?;
        quiz.add_comment(&identity.id, body);
        self.repository.update(quiz).await
    }

    pub async fn delete_comment(
        &self,
        identity: &Identity,
        quiz_id: &str,
        comment_id: &str,
    ) -> AppResult<Quiz> {
        let mut quiz = self.get_quiz(quiz_id).await?;
        quiz.remove_comment(identity, comment_id)?;
        self.repository.update(quiz).await
    }

    async fn content_from_input(&self, input: QuizInput) -> AppResult<QuizContent> {
        let image = match input.image.as_deref().filter(|payload| !payload.is_empty()) {
            Some(payload) => Some(self.media.upload(payload).await?),
            None => None,
        };

        Ok(QuizContent {
            title: input.title,
            description: input.description,
            questions: input.questions.into_iter().map(Into::into).collect(),
            image,
        })
    }

    async fn discard_image(&self, reference: &str) {
        discard_best_effort(self.media.as_ref(), reference).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repositories::quiz_repository::MockQuizRepository,
        services::media_service::MockMediaHost,
    };
    use mockall::predicate::eq;

    fn alice() -> Identity {
        Identity::new("u1", "alice")
    }

    fn bob() -> Identity {
        Identity::new("u2", "bob")
    }

    fn stored_quiz(image: Option<&str>) -> Quiz {
        Quiz::new(
            "u1",
            QuizContent {
                title: "Rust basics".to_string(),
                description: "Ownership and borrowing".to_string(),
                questions: vec![],
                image: image.map(str::to_string),
            },
        )
    }

    fn input(title: &str, image: Option<&str>) -> QuizInput {
        QuizInput {
            title: title.to_string(),
            description: String::new(),
            questions: vec![],
            image: image.map(str::to_string),
        }
    }

    fn repo_returning(quiz: Quiz) -> MockQuizRepository {
        let mut repo = MockQuizRepository::new();
        let id = quiz.id.clone();
        repo.expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(quiz.clone())));
        repo
    }

    #[tokio::test]
    async fn test_create_uploads_image_and_sets_author() {
        let mut repo = MockQuizRepository::new();
        repo.expect_create().times(1).returning(Ok);

        let mut media = MockMediaHost::new();
        media
            .expect_upload()
            .with(eq("data:image/png;base64,AAAA"))
            .times(1)
            .returning(|_| Ok("https://media/quiz.png".to_string()));

        let service = QuizService::new(Arc::new(repo), Arc::new(media));
        let quiz = service
            .create_quiz(&alice(), input("Rust", Some("data:image/png;base64,AAAA")))
            .await
            .unwrap();

        assert_eq!(quiz.author, "u1");
        assert_eq!(quiz.image.as_deref(), Some("https://media/quiz.png"));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_before_upload() {
        let service = QuizService::new(
            Arc::new(MockQuizRepository::new()),
            Arc::new(MockMediaHost::new()),
        );

        let result = service
            .create_quiz(&alice(), input("", Some("data:image/png;base64,AAAA")))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let quiz = stored_quiz(Some("https://media/quiz.png"));
        let quiz_id = quiz.id.clone();
        let mut repo = repo_returning(quiz);
        repo.expect_delete().never();

        let mut media = MockMediaHost::new();
        media.expect_delete().never();

        let service = QuizService::new(Arc::new(repo), Arc::new(media));
        let result = service.delete_quiz(&bob(), &quiz_id).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_media_host_fails() {
        let quiz = stored_quiz(Some("https://media/quiz.png"));
        let quiz_id = quiz.id.clone();
        let mut repo = repo_returning(quiz);
        repo.expect_delete()
            .with(eq(quiz_id.clone()))
            .times(1)
            .returning(|_| Ok(1));

        let mut media = MockMediaHost::new();
        media
            .expect_delete()
            .with(eq("https://media/quiz.png"))
            .times(1)
            .returning(|_| Err(AppError::UpstreamFailure("media host down".to_string())));

        let service = QuizService::new(Arc::new(repo), Arc::new(media));
        assert!(service.delete_quiz(&alice(), &quiz_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_the_image() {
        let quiz = stored_quiz(Some("https://media/quiz.png"));
        let quiz_id = quiz.id.clone();
        let mut repo = repo_returning(quiz);
        repo.expect_delete()
            .times(1)
            .returning(|_| Err(AppError::DatabaseError("write timeout".to_string())));

        let mut media = MockMediaHost::new();
        media.expect_delete().never();

        let service = QuizService::new(Arc::new(repo), Arc::new(media));
        let result = service.delete_quiz(&alice(), &quiz_id).await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden() {
        let quiz = stored_quiz(None);
        let quiz_id = quiz.id.clone();
        let mut repo = repo_returning(quiz);
        repo.expect_update().never();

        let service = QuizService::new(Arc::new(repo), Arc::new(MockMediaHost::new()));
        let result = service
            .update_quiz(&bob(), &quiz_id, input("Hijacked", None))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_discards_replaced_image() {
        let quiz = stored_quiz(Some("https://media/old.png"));
        let quiz_id = quiz.id.clone();
        let mut repo = repo_returning(quiz);
        repo.expect_update().times(1).returning(Ok);

        let mut media = MockMediaHost::new();
        media
            .expect_upload()
            .returning(|_| Ok("https://media/new.png".to_string()));
        media
            .expect_delete()
            .with(eq("https://media/old.png"))
            .times(1)
            .returning(|_| Ok(()));

        let service = QuizService::new(Arc::new(repo), Arc::new(media));
        let quiz = service
            .update_quiz(&alice(), &quiz_id, input("Rust 2", Some("payload")))
            .await
            .unwrap();

        assert_eq!(quiz.author, "u1");
        assert_eq!(quiz.image.as_deref(), Some("https://media/new.png"));
    }

    #[tokio::test]
    async fn test_failed_update_discards_new_upload_and_keeps_old_image() {
        let quiz = stored_quiz(Some("https://media/old.png"));
        let quiz_id = quiz.id.clone();
        let mut repo = repo_returning(quiz);
        repo.expect_update()
            .times(1)
            .returning(|_| Err(AppError::DatabaseError("write timeout".to_string())));

        let mut media = MockMediaHost::new();
        media
            .expect_upload()
            .returning(|_| Ok("https://media/new.png".to_string()));
        media
            .expect_delete()
            .with(eq("https://media/new.png"))
            .times(1)
            .returning(|_| Ok(()));
        media
            .expect_delete()
            .with(eq("https://media/old.png"))
            .never();

        let service = QuizService::new(Arc::new(repo), Arc::new(media));
        let result = service
            .update_quiz(&alice(), &quiz_id, input("Rust 2", Some("payload")))
            .await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_toggle_like_on_missing_quiz_is_not_found() {
        let mut repo = MockQuizRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let service = QuizService::new(Arc::new(repo), Arc::new(MockMediaHost::new()));
        let result = service.toggle_like(&alice(), "missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_comment_does_not_write() {
        let quiz = stored_quiz(None);
        let quiz_id = quiz.id.clone();
        let mut repo = repo_returning(quiz);
        repo.expect_update().never();

        let service = QuizService::new(Arc::new(repo), Arc::new(MockMediaHost::new()));
        let result = service.delete_comment(&alice(), &quiz_id, "nope").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
