use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    state::AppState,
    users::{
        dto::{
            CreateUserRequest, CreateUserResponse, DeleteUserRequest, DeleteUserResponse,
            GetUserByEmailRequest, GetUserByEmailResponse, GetUsersRequest, GetUsersResponse,
        },
        services::CreateUser,
        status::RpcStatus,
    },
};

type RpcResult<T> = Result<Json<T>, RpcStatus>;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/CreateUser", post(create_user))
        .route("/user/DeleteUser", post(delete_user))
        .route("/user/GetUsers", post(get_users))
        .route("/user/GetUserByEmail", post(get_user_by_email))
}

fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RpcStatus> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(error = %rejection, "undecodable request");
        RpcStatus::invalid_argument("invalid request body")
    })
}

fn present(value: Option<String>, what: &str) -> Result<String, RpcStatus> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => {
            warn!(field = what, "missing required field");
            Err(RpcStatus::invalid_argument(format!("{what} is required")))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> RpcResult<CreateUserResponse> {
    let req = decode(payload)?;
    let email = present(req.email, "email")?;
    let username = present(req.username, "username")?;
    let id = present(req.id, "id")?;

    let id = state
        .users
        .create_user(CreateUser {
            id,
            username,
            name: req.name,
            email,
            avatar_url: req.avatar_url,
        })
        .await?;

    info!(user_id = %id, "CreateUser ok");
    Ok(Json(CreateUserResponse { id }))
}

#[instrument(skip(state, payload))]
pub async fn delete_user(
    State(state): State<AppState>,
    payload: Result<Json<DeleteUserRequest>, JsonRejection>,
) -> RpcResult<DeleteUserResponse> {
    let req = decode(payload)?;
    let id = present(req.id, "id")?;

    state.users.delete_user(&id).await?;

    info!(user_id = %id, "DeleteUser ok");
    Ok(Json(DeleteUserResponse { success: true }))
}

#[instrument(skip(state, payload))]
pub async fn get_users(
    State(state): State<AppState>,
    payload: Result<Json<GetUsersRequest>, JsonRejection>,
) -> RpcResult<GetUsersResponse> {
    let req = decode(payload)?;
    let fields = req
        .fields
        .ok_or_else(|| RpcStatus::invalid_argument("fields is required"))?;
    let ids = req
        .ids
        .ok_or_else(|| RpcStatus::invalid_argument("ids is required"))?;
    let parameter = present(req.parameter, "parameter")?;

    let users = state.users.users(&fields, ids, &parameter).await?;

    Ok(Json(GetUsersResponse { users }))
}

#[instrument(skip(state, payload))]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    payload: Result<Json<GetUserByEmailRequest>, JsonRejection>,
) -> RpcResult<GetUserByEmailResponse> {
    let req = decode(payload)?;
    let email = present(req.email, "email")?;

    let user = state.users.user_by_email(&email).await?;

    Ok(Json(GetUserByEmailResponse { user }))
}
