use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::dto::request::{QuestionInput, QuestionOptionInput};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct QuizQuestion {
    pub id: String,
    pub title: String,
    pub question_type: QuizQuestionType,
    pub options: Vec<QuizQuestionOption>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct QuizQuestionOption {
    pub text: String,
    pub correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Enum, Copy)]
pub enum QuizQuestionType {
    Single, // Only one correct option
    Multi,  // Multiple correct options
    Bool,   // True/False question
}

impl From<QuestionOptionInput> for QuizQuestionOption {
    fn from(input: QuestionOptionInput) -> Self {
        QuizQuestionOption {
            text: input.text,
            correct: input.correct,
        }
    }
}

impl From<QuestionInput> for QuizQuestion {
    fn from(input: QuestionInput) -> Self {
        QuizQuestion {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: input.title,
            question_type: input.question_type,
            options: input.options.into_iter().map(Into::into).collect(),
        }
    }
}
