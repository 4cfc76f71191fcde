use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::users::error::UserError;

/// RPC status codes exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    InvalidArgument,
    AlreadyExists,
    NotFound,
    Internal,
}

impl Code {
    pub fn http_status(self) -> StatusCode {
        match self {
            Code::InvalidArgument => StatusCode::BAD_REQUEST,
            Code::AlreadyExists => StatusCode::CONFLICT,
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body returned by every RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcStatus {
    pub code: Code,
    pub message: String,
}

impl RpcStatus {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn internal() -> Self {
        Self::new(Code::Internal, "internal error")
    }
}

impl From<UserError> for RpcStatus {
    fn from(err: UserError) -> Self {
        match err {
            UserError::UserExists => Self::new(Code::AlreadyExists, "user already exists"),
            UserError::UserNotFound => Self::new(Code::NotFound, "user not found"),
            UserError::InvalidArgument(msg) => Self::invalid_argument(msg),
            UserError::InvalidFields => Self::invalid_argument("no valid fields requested"),
            UserError::InvalidParameter(p) => {
                Self::invalid_argument(format!("invalid parameter '{p}'"))
            }
            UserError::Storage { op, source } => {
                // Details stay in the logs.
                error!(op, error = %source, "internal error returned to caller");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for RpcStatus {
    fn into_response(self) -> Response {
        (self.code.http_status(), Json(self)).into_response()
    }
}
