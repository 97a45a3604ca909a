use thiserror::Error;

use crate::auth::errors::AuthError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    /// Message safe to return to a caller; internal failures stay generic.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Validation(m)
            | ServiceError::Unauthorized(m)
            | ServiceError::Forbidden(m)
            | ServiceError::NotFound(m) => m.clone(),
            ServiceError::Model(models::errors::ModelError::Validation(m)) => m.clone(),
            _ => "Internal Server Error".to_string(),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { ServiceError::Db(e.to_string()) }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(m) => ServiceError::Validation(m),
            AuthError::Conflict => ServiceError::Validation("Email is already in use".into()),
            AuthError::Unauthorized => {
                ServiceError::Unauthorized("Incorrect email or password".into())
            }
            AuthError::InvalidToken => ServiceError::Unauthorized("Invalid or expired token".into()),
            AuthError::HashError(m) | AuthError::TokenError(m) => ServiceError::Storage(m),
            AuthError::Repository(m) => ServiceError::Db(m),
        }
    }
}
