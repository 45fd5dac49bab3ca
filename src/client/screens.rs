use tracing::warn;

use super::{api::UserApi, ClientError};
use crate::{
    users::dto::{CreateUserRequest, UserResponse},
    validation::{check_date_range, validate_email, validate_password},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Notification {
    fn success(summary: &str, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            summary: summary.to_string(),
            detail: detail.into(),
        }
    }

    fn error(summary: &str, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.to_string(),
            detail: detail.into(),
        }
    }
}

fn error_detail(err: &ClientError) -> String {
    match err {
        ClientError::Api { message, .. } => message.clone(),
        ClientError::Transport(e) => e.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The creation form.
#[derive(Debug, Default)]
pub struct CreateUserScreen {
    pub form: CreateUserRequest,
    pub errors: FormErrors,
    pub is_loading: bool,
    pub notifications: Vec<Notification>,
}

impl CreateUserScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the local email and password checks, recording per-field errors.
    pub fn validate(&mut self) -> bool {
        self.errors.email = validate_email(&self.form.email).err();
        self.errors.password = validate_password(&self.form.password).err();
        self.errors.email.is_none() && self.errors.password.is_none()
    }

    pub fn clear_error(&mut self, field: Field) {
        match field {
            Field::Email => self.errors.email = None,
            Field::Password => self.errors.password = None,
        }
    }

    pub fn reset(&mut self) {
        self.form = CreateUserRequest::default();
        self.errors = FormErrors::default();
    }

    /// Validates and submits the form. Nothing is sent when validation fails.
    pub async fn submit(&mut self, api: &dyn UserApi) -> Option<UserResponse> {
        if !self.validate() {
            return None;
        }

        self.is_loading = true;
        let res = api.create_user(&self.form).await;
        self.is_loading = false;

        match res {
            Ok(user) => {
                self.notifications.push(Notification::success(
                    "Success",
                    format!("User with email {} successfully created!", user.email),
                ));
                self.reset();
                Some(user)
            }
            Err(e) => {
                warn!(error = %e, "create user failed");
                self.notifications
                    .push(Notification::error("Cannot create user", error_detail(&e)));
                None
            }
        }
    }
}

/// The listing with its date-of-birth filter.
#[derive(Debug, Default)]
pub struct ViewUsersScreen {
    pub date_from: String,
    pub date_to: String,
    pub users: Vec<UserResponse>,
    pub is_loading: bool,
    pub notifications: Vec<Notification>,
}

impl ViewUsersScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches every user.
    pub async fn load(&mut self, api: &dyn UserApi) {
        self.fetch(api, "", "").await;
    }

    /// Fetches users within the filter bounds. An inverted range is reported
    /// locally and the displayed set is kept.
    pub async fn filter(&mut self, api: &dyn UserApi) {
        if let Err(detail) = check_date_range(&self.date_from, &self.date_to) {
            self.notifications
                .push(Notification::error("Date Error", detail));
            return;
        }
        let (from, to) = (self.date_from.clone(), self.date_to.clone());
        self.fetch(api, from.trim(), to.trim()).await;
    }

    async fn fetch(&mut self, api: &dyn UserApi, from: &str, to: &str) {
        self.is_loading = true;
        match api.get_users(from, to).await {
            Ok(users) => self.users = users,
            Err(e) => {
                warn!(error = %e, "fetch users failed");
                self.notifications
                    .push(Notification::error("Cannot get users", error_detail(&e)));
            }
        }
        self.is_loading = false;
    }
}
