use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    error::AppError,
    state::AppState,
    users::{
        dto::{CreateUserRequest, UserFilter, UserResponse},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "rejected create user body");
        AppError::Validation(e.body_text())
    })?;
    let user = services::create_user(state.users.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<UserFilter>, QueryRejection>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let Query(filter) = query.map_err(|e| {
        warn!(error = %e, "rejected users query");
        AppError::Validation(e.body_text())
    })?;
    let users = services::list_users(
        state.users.as_ref(),
        &filter,
        state.config.empty_list_is_error,
    )
    .await?;
    Ok(Json(users))
}
