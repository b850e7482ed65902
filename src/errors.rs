use std::collections::BTreeMap;

use async_graphql::{ErrorExtensions, Value};
use thiserror::Error;

/// Field name -> user facing message, ordered by field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Key under which `validator` files struct-level (schema) errors.
const SCHEMA_ERRORS_KEY: &str = "__all__";

pub const USERNAME_TAKEN: &str = "This username is already taken";
pub const EMAIL_TAKEN: &str = "This email is already taken";

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Validation error: {}", describe(.0))]
    ValidationError(FieldErrors),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {}", describe(.0))]
    Conflict(FieldErrors),

    #[error("User not found")]
    UserNotFound,

    #[error("Wrong credentials")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        AppError::ValidationError(FieldErrors::from([(field.to_string(), message.to_string())]))
    }

    pub fn conflict(field: &str, message: &str) -> Self {
        AppError::Conflict(FieldErrors::from([(field.to_string(), message.to_string())]))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotAuthenticated => "NOT_AUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::DatabaseError(_)
            | AppError::UpstreamFailure(_)
            | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Field map surfaced to the client alongside the error code.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            AppError::ValidationError(fields) | AppError::Conflict(fields) => Some(fields.clone()),
            AppError::UserNotFound | AppError::InvalidCredentials => Some(FieldErrors::from([(
                "general".to_string(),
                self.to_string(),
            )])),
            _ => None,
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(_) | AppError::UpstreamFailure(_) | AppError::InternalError(_)
        )
    }
}

fn describe(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::UpstreamFailure(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::InternalError(format!("Password hashing failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields = err
            .field_errors()
            .into_iter()
            .filter_map(|(field, errors)| {
                errors.first().map(|error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    // Struct-level rules name their target field in the code.
                    let field = if field == SCHEMA_ERRORS_KEY {
                        error.code.to_string()
                    } else {
                        field.to_string()
                    };
                    (to_camel_case(&field), message)
                })
            })
            .collect();
        AppError::ValidationError(fields)
    }
}

impl From<async_graphql::Error> for AppError {
    fn from(err: async_graphql::Error) -> Self {
        AppError::InternalError(err.message)
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let message = if self.is_internal() {
            log::error!("{}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        async_graphql::Error::new(message).extend_with(|_err, e| {
            e.set("code", self.error_code());
            if let Some(errors) = self
                .field_errors()
                .and_then(|fields| serde_json::to_value(fields).ok())
                .and_then(|json| Value::from_json(json).ok())
            {
                e.set("errors", errors);
            }
        })
    }
}

pub type AppResult<T> = Result<T, AppError>;
