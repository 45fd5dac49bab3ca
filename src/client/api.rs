use async_trait::async_trait;
use reqwest::{header, Response};
use tracing::{debug, instrument};

use super::ClientError;
use crate::{
    error::ErrorBody,
    users::dto::{CreateUserRequest, UserResponse},
};

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn create_user(&self, user: &CreateUserRequest) -> Result<UserResponse, ClientError>;

    /// Blank bounds are sent as empty strings and mean "unbounded".
    async fn get_users(&self, from_date: &str, to_date: &str)
        -> Result<Vec<UserResponse>, ClientError>;
}

#[derive(Clone)]
pub struct HttpUserApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpUserApi {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }
}

async fn api_error(resp: Response) -> ClientError {
    let status = resp.status();
    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: &CreateUserRequest) -> Result<UserResponse, ClientError> {
        let resp = self
            .http
            .post(self.users_url())
            .header(header::ACCEPT, "application/json")
            .json(user)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let created = resp.json::<UserResponse>().await?;
        debug!(user_id = %created.id, "user created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_users(
        &self,
        from_date: &str,
        to_date: &str,
    ) -> Result<Vec<UserResponse>, ClientError> {
        let resp = self
            .http
            .get(self.users_url())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .query(&[("fromDate", from_date), ("toDate", to_date)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let users = resp.json::<Vec<UserResponse>>().await?;
        debug!(count = users.len(), "users fetched");
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let api = HttpUserApi::new("http://localhost:8080/api/");
        assert_eq!(api.users_url(), "http://localhost:8080/api/users");
    }

    #[tokio::test]
    async fn list_request_sends_json_headers_and_both_bounds() {
        use std::sync::{Arc, Mutex};

        use axum::{extract::RawQuery, http::HeaderMap, routing::get, Json, Router};

        type Seen = Arc<Mutex<Option<(HeaderMap, Option<String>)>>>;
        let seen: Seen = Arc::default();
        let app = Router::new().route(
            "/api/users",
            get({
                let seen = seen.clone();
                move |headers: HeaderMap, RawQuery(query): RawQuery| {
                    let seen = seen.clone();
                    async move {
                        *seen.lock().unwrap() = Some((headers, query));
                        Json(Vec::<UserResponse>::new())
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let api = HttpUserApi::new(format!("http://{addr}/api"));
        assert!(api.get_users("1990-01-01", "").await.unwrap().is_empty());

        let (headers, query) = seen.lock().unwrap().take().unwrap();
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::ACCEPT], "application/json");
        assert_eq!(query.as_deref(), Some("fromDate=1990-01-01&toDate="));
    }

    #[tokio::test]
    async fn talks_to_the_real_router() {
        use crate::{app::build_app, state::AppState};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_app(AppState::fake())).await.unwrap();
        });

        let api = HttpUserApi::new(format!("http://{addr}/api"));
        let req = CreateUserRequest {
            first_name: "Edsger".into(),
            last_name: "Dijkstra".into(),
            email: "edsger@example.com".into(),
            phone_number: "020-000".into(),
            password: "Abcdef1!".into(),
            date_of_birth: "1930-05-11".into(),
        };
        let created = api.create_user(&req).await.unwrap();
        assert_eq!(created.email, "edsger@example.com");

        let err = api.create_user(&req).await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "A user with that email already exists");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let users = api.get_users("1930-01-01", "").await.unwrap();
        assert_eq!(users, vec![created]);
        assert!(api.get_users("1931-01-01", "").await.unwrap().is_empty());
    }
}
