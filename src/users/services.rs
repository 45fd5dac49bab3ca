use anyhow::Context;
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    users::{
        dto::{CreateUserRequest, UserFilter, UserResponse},
        password::hash_password,
        repo::UserStore,
        repo_types::{DateRange, NewUser},
    },
    validation::{missing_fields, parse_date, validate_email},
};

#[instrument(skip(store, req))]
pub async fn create_user(
    store: &dyn UserStore,
    req: CreateUserRequest,
) -> Result<UserResponse, AppError> {
    let missing = missing_fields(&req);
    if !missing.is_empty() {
        warn!(?missing, "create user with missing fields");
        return Err(AppError::Validation(format!(
            "Please include all fields: {}",
            missing.join(", ")
        )));
    }

    let email = req.email.trim().to_lowercase();
    validate_email(&email).map_err(AppError::Validation)?;
    let date_of_birth = parse_date(&req.date_of_birth).map_err(AppError::Validation)?;

    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict);
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("join password hasher")??;

    // The store re-checks uniqueness, covering a create that raced past the lookup.
    let user = store
        .create(NewUser {
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            email,
            phone_number: req.phone_number.trim().to_string(),
            password_hash,
            date_of_birth,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(user.into())
}

/// Turns the optional query bounds into a [`DateRange`]; blank means open.
pub fn date_range(filter: &UserFilter) -> Result<DateRange, AppError> {
    let bound = |raw: &Option<String>| -> Result<_, AppError> {
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => parse_date(v).map(Some).map_err(AppError::Validation),
        }
    };
    Ok(DateRange {
        from: bound(&filter.from_date)?,
        to: bound(&filter.to_date)?,
    })
}

#[instrument(skip(store))]
pub async fn list_users(
    store: &dyn UserStore,
    filter: &UserFilter,
    empty_is_error: bool,
) -> Result<Vec<UserResponse>, AppError> {
    let range = date_range(filter)?;
    let users = store.list(range).await?;
    if users.is_empty() && empty_is_error {
        return Err(AppError::EmptyResult);
    }
    info!(count = users.len(), "users listed");
    Ok(users.into_iter().map(UserResponse::from).collect())
}
