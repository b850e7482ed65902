use async_graphql::{ComplexObject, Context, Result, ResultExt, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{require_owner, Identity},
    errors::{AppError, AppResult},
    graphql::helpers::resolve_user,
    models::{domain::quiz_question::QuizQuestion, dto::response::UserDto},
};

pub const EMPTY_DESCRIPTION_PLACEHOLDER: &str = "There is no description about this quiz";

/// A quiz document with its embedded likes and comments, persisted as a unit.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
#[graphql(complex)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[graphql(name = "authorId")]
    pub author: String, // Set on create, never rewritten
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
    #[serde(default)]
    pub likes: Vec<Like>, // Newest first, at most one per user
    #[serde(default)]
    pub comments: Vec<Comment>, // Insertion order
    pub created_at: DateTime<Utc>,
}

/// Author-editable part of a quiz.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuizContent {
    pub title: String,
    pub description: String,
    pub questions: Vec<QuizQuestion>,
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
#[graphql(complex)]
pub struct Like {
    pub user_id: String,
    #[graphql(skip)]
    pub username: String, // Snapshot taken when the like was created
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
#[graphql(complex)]
pub struct Comment {
    pub id: String,
    pub body: String,
    #[graphql(name = "authorId")]
    pub author: String,
    pub created_at: DateTime<Utc>,
}

fn normalize_description(description: String) -> String {
    if description.trim().is_empty() {
        EMPTY_DESCRIPTION_PLACEHOLDER.to_string()
    } else {
        description
    }
}

impl Quiz {
    pub fn new(author_id: &str, content: QuizContent) -> Self {
        Quiz {
            id: Uuid::new_v4().to_string(),
            title: content.title,
            description: normalize_description(content.description),
            image: content.image,
            author: author_id.to_string(),
            questions: content.questions,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Rewrites the editable fields. The author is not part of `QuizContent`
    /// and therefore cannot change here.
    ///
    /// Returns the image reference that was replaced, if any.
    pub fn apply_update(&mut self, content: QuizContent) -> Option<String> {
        self.title = content.title;
        self.description = normalize_description(content.description);
        self.questions = content.questions;

        match content.image {
            Some(image) => self.image.replace(image),
            None => None,
        }
    }

    /// Flips the caller's like. Returns `true` when the quiz is now liked.
    pub fn toggle_like(&mut self, identity: &Identity) -> bool {
        let before = self.likes.len();
        self.likes.retain(|like| like.user_id != identity.id);

        if self.likes.len() != before {
            return false;
        }

        self.likes.insert(
            0,
            Like {
                user_id: identity.id.clone(),
                username: identity.username.clone(),
                created_at: Utc::now(),
            },
        );
        true
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|like| like.user_id == user_id)
    }

    pub fn add_comment(&mut self, author_id: &str, body: String) -> &Comment {
        self.comments.push(Comment {
            id: Uuid::new_v4().to_string(),
            body,
            author: author_id.to_string(),
            created_at: Utc::now(),
        });
        &self.comments[self.comments.len() - 1]
    }

    /// Removes a comment written by the caller.
    pub fn remove_comment(&mut self, identity: &Identity, comment_id: &str) -> AppResult<Comment> {
        let index = self
            .comments
            .iter()
            .position(|comment| comment.id == comment_id)
            .ok_or_else(|| AppError::NotFound(format!("Comment '{}' not found", comment_id)))?;

        require_owner(identity, &self.comments[index].author)?;

        Ok(self.comments.remove(index))
    }
}

fn count(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

#[ComplexObject]
impl Quiz {
    async fn like_count(&self) -> i32 {
        count(self.likes.len())
    }

    async fn comment_count(&self) -> i32 {
        count(self.comments.len())
    }

    async fn question_count(&self) -> i32 {
        count(self.questions.len())
    }

    /// The author's current user record; null once the account is deleted.
    #[graphql(name = "author")]
    async fn author_user(&self, ctx: &Context<'_>) -> Result<Option<UserDto>> {
        resolve_user(ctx, &self.author).await.extend()
    }
}

#[ComplexObject]
impl Like {
    /// Current username of the liker, or the snapshot if the account is gone.
    #[graphql(name = "username")]
    async fn display_name(&self, ctx: &Context<'_>) -> Result<String> {
        let user = resolve_user(ctx, &self.user_id).await.extend()?;
        Ok(user
            .map(|user| user.username)
            .unwrap_or_else(|| self.username.clone()))
    }
}

#[ComplexObject]
impl Comment {
    #[graphql(name = "author")]
    async fn author_user(&self, ctx: &Context<'_>) -> Result<Option<UserDto>> {
        resolve_user(ctx, &self.author).await.extend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::quiz_question::{QuizQuestionOption, QuizQuestionType};

    fn alice() -> Identity {
        Identity::new("u1", "alice")
    }

    fn bob() -> Identity {
        Identity::new("u2", "bob")
    }

    fn content(title: &str, description: &str) -> QuizContent {
        QuizContent {
            title: title.to_string(),
            description: description.to_string(),
            questions: vec![QuizQuestion {
                id: "q-1".to_string(),
                title: "2 + 2?".to_string(),
                question_type: QuizQuestionType::Single,
                options: vec![
                    QuizQuestionOption {
                        text: "4".to_string(),
                        correct: true,
                    },
                    QuizQuestionOption {
                        text: "5".to_string(),
                        correct: false,
                    },
                ],
            }],
            image: None,
        }
    }

    #[test]
    fn test_new_quiz_sets_author_and_normalizes_description() {
        let quiz = Quiz::new("u1", content("Maths", "   "));

        assert_eq!(quiz.author, "u1");
        assert_eq!(quiz.description, EMPTY_DESCRIPTION_PLACEHOLDER);
        assert!(quiz.likes.is_empty());
        assert!(quiz.comments.is_empty());
    }

    #[test]
    fn test_update_keeps_author_and_reports_replaced_image() {
        let mut quiz = Quiz::new(
            "u1",
            QuizContent {
                image: Some("https://media/old.png".to_string()),
                ..content("Maths", "Sums")
            },
        );

        let replaced = quiz.apply_update(QuizContent {
            image: Some("https://media/new.png".to_string()),
            ..content("Algebra", "")
        });

        assert_eq!(quiz.author, "u1");
        assert_eq!(quiz.title, "Algebra");
        assert_eq!(quiz.description, EMPTY_DESCRIPTION_PLACEHOLDER);
        assert_eq!(quiz.image.as_deref(), Some("https://media/new.png"));
        assert_eq!(replaced.as_deref(), Some("https://media/old.png"));
    }

    #[test]
    fn test_update_without_image_keeps_existing_one() {
        let mut quiz = Quiz::new(
            "u1",
            QuizContent {
                image: Some("https://media/old.png".to_string()),
                ..content("Maths", "Sums")
            },
        );

        assert_eq!(quiz.apply_update(content("Maths", "More sums")), None);
        assert_eq!(quiz.image.as_deref(), Some("https://media/old.png"));
    }

    #[test]
    fn test_toggle_like_twice_restores_likes() {
        let mut quiz = Quiz::new("u1", content("Maths", "Sums"));
        quiz.toggle_like(&bob());
        let original = quiz.likes.clone();

        assert!(quiz.toggle_like(&alice()));
        assert!(quiz.is_liked_by("u1"));
        assert!(!quiz.toggle_like(&alice()));

        assert_eq!(quiz.likes, original);
    }

    #[test]
    fn test_toggle_like_prepends_newest() {
        let mut quiz = Quiz::new("u1", content("Maths", "Sums"));
        quiz.toggle_like(&alice());
        quiz.toggle_like(&bob());

        assert_eq!(quiz.likes.len(), 2);
        assert_eq!(quiz.likes[0].user_id, "u2");
        assert_eq!(quiz.likes[1].user_id, "u1");
    }

    #[test]
    fn test_like_is_keyed_by_user_id_not_username() {
        let mut quiz = Quiz::new("u1", content("Maths", "Sums"));
        quiz.toggle_like(&alice());

        // Same account after a rename still un-likes.
        assert!(!quiz.toggle_like(&Identity::new("u1", "alice_renamed")));
        assert!(quiz.likes.is_empty());
    }

    #[test]
    fn test_add_comment_appends_in_order() {
        let mut quiz = Quiz::new("u1", content("Maths", "Sums"));
        quiz.add_comment("u2", "first".to_string());
        let second_id = quiz.add_comment("u1", "second".to_string()).id.clone();

        assert_eq!(quiz.comments.len(), 2);
        assert_eq!(quiz.comments[0].body, "first");
        assert_eq!(quiz.comments[1].id, second_id);
        assert_eq!(quiz.comments[1].author, "u1");
    }

    #[test]
    fn test_add_comment_accepts_empty_body() {
        let mut quiz = Quiz::new("u1", content("Maths", "Sums"));
        quiz.add_comment("u2", String::new());
        assert_eq!(quiz.comments[0].body, "");
    }

    #[test]
    fn test_remove_missing_comment_is_not_found() {
        let mut quiz = Quiz::new("u1", content("Maths", "Sums"));

        assert!(matches!(
            quiz.remove_comment(&alice(), "missing"),
            Err(AppError::NotFound(_))
        ));

        quiz.add_comment("u1", "hello".to_string());
        let before = quiz.comments.clone();

        assert!(matches!(
            quiz.remove_comment(&alice(), "missing"),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(quiz.comments, before);
    }

    #[test]
    fn test_remove_comment_by_stranger_is_forbidden() {
        let mut quiz = Quiz::new("u1", content("Maths", "Sums"));
        let comment_id = quiz.add_comment("u1", "mine".to_string()).id.clone();

        assert!(matches!(
            quiz.remove_comment(&bob(), &comment_id),
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(quiz.comments.len(), 1);
    }

    #[test]
    fn test_remove_comment_by_author() {
        let mut quiz = Quiz::new("u1", content("Maths", "Sums"));
        quiz.add_comment("u2", "keep".to_string());
        let comment_id = quiz.add_comment("u1", "drop".to_string()).id.clone();
        quiz.add_comment("u2", "keep too".to_string());

        let removed = quiz.remove_comment(&alice(), &comment_id).unwrap();

        assert_eq!(removed.body, "drop");
        let bodies: Vec<_> = quiz.comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["keep", "keep too"]);
    }
}
