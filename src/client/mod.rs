//! Frontend side of the registry: a typed HTTP client and the two screens
//! (create form, filterable listing) that drive it.

pub mod api;
pub mod screens;

pub use api::{HttpUserApi, UserApi};
pub use screens::{CreateUserScreen, Notification, Severity, ViewUsersScreen};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx reply; `message` is the server's `{message}` verbatim.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
