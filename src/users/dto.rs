use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo_types::{MatchValue, UserRow};

/// Request message for `CreateUser`. Presence is checked by the handler.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub id: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteUserRequest {
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub success: bool,
}

/// `ids` is a list, or a single string for substring search by username.
#[derive(Debug, Default, Deserialize)]
pub struct GetUsersRequest {
    pub fields: Option<Vec<String>>,
    pub ids: Option<MatchValue>,
    pub parameter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetUsersResponse {
    pub users: Vec<UserEntity>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetUserByEmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetUserByEmailResponse {
    pub user: UserEntity,
}

/// Transfer record. Fields not requested are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub last_seen: Option<OffsetDateTime>,
}

impl From<UserRow> for UserEntity {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            username: r.username,
            name: r.name,
            bio: r.bio,
            avatar_url: r.avatar_url,
            last_seen: r.last_seen,
        }
    }
}
