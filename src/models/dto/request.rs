use async_graphql::InputObject;
use once_cell::sync::Lazy;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::domain::quiz_question::QuizQuestionType;

static USERNAME_REGEX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^[A-Za-z0-9_.-]+$").expect("USERNAME_REGEX is a valid regex pattern")
});

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits, '.', '_' and '-'"
        )
    )]
    pub username: String,

    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Every field is optional; only the supplied ones are validated and stored.
#[derive(Debug, Clone, Default, Deserialize, Validate, InputObject)]
#[serde(rename_all = "camelCase")]
#[validate(schema(
    function = "validate_password_confirmation",
    skip_on_field_errors = false
))]
pub struct UpdateAccountInput {
    pub avatar: Option<String>,

    pub cover: Option<String>,

    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,

    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits, '.', '_' and '-'"
        )
    )]
    pub username: Option<String>,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,

    pub confirm_password: Option<String>,
}

/// A new password only counts together with an identical confirmation. The
/// error code names the field it is reported under.
fn validate_password_confirmation(input: &UpdateAccountInput) -> Result<(), ValidationError> {
    if input.password.is_some() && input.password != input.confirm_password {
        return Err(
            ValidationError::new("confirm_password").with_message("Passwords must match".into()),
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct QuizInput {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[graphql(default)]
    #[serde(default)]
    pub description: String,

    #[graphql(default)]
    #[serde(default)]
    pub questions: Vec<QuestionInput>,

    /// Image payload handed to the media host.
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    pub id: Option<String>,
    pub title: String,
    pub question_type: QuizQuestionType,
    pub options: Vec<QuestionOptionInput>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
pub struct QuestionOptionInput {
    pub text: String,
    pub correct: bool,
}
