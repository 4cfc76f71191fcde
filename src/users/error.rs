use thiserror::Error;

/// Failures of the user service and its storage adapter.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user already exists")]
    UserExists,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no valid fields requested")]
    InvalidFields,
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("{op}: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl UserError {
    pub(crate) fn storage(op: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Storage { op, source }
    }
}

pub type UserResult<T> = Result<T, UserError>;
