//! Test doubles and request helpers shared by the HTTP tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use crate::app::build_app;
use crate::state::AppState;
use crate::users::repo::RepoError;
use crate::users::{NewUser, User, UserRepository};

/// Maximum body size read back from responses.
const MAX_BODY_SIZE: usize = 4096;

/// Repository keeping users in memory, assigning ids like a sequence.
#[derive(Default)]
pub(crate) struct InMemoryUsers {
    next_id: AtomicI64,
    rows: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    pub(crate) fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, user: &NewUser) -> Result<i64, RepoError> {
        let user_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::task::yield_now().await;
        self.rows.lock().unwrap().push(User {
            user_id,
            username: user.username.clone(),
            email: user.email.clone(),
        });
        Ok(user_id)
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn close(&self) {}
}

/// Repository whose every statement fails with a fixed message.
pub(crate) struct FailingUsers(pub(crate) String);

#[async_trait]
impl UserRepository for FailingUsers {
    async fn create(&self, _user: &NewUser) -> Result<i64, RepoError> {
        Err(RepoError(self.0.clone()))
    }

    async fn find_by_id(&self, _user_id: i64) -> Result<Option<User>, RepoError> {
        Err(RepoError(self.0.clone()))
    }

    async fn close(&self) {}
}

#[derive(Clone)]
pub(crate) struct TestContext {
    pub(crate) users: Arc<InMemoryUsers>,
    app: Router,
}

impl TestContext {
    pub(crate) fn setup() -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let app = build_app(AppState::from_parts(users.clone()));
        Self { users, app }
    }

    /// Context whose repository fails with `message`; `users` stays empty.
    pub(crate) fn failing(message: &str) -> Self {
        let app = build_app(AppState::from_parts(Arc::new(FailingUsers(message.to_owned()))));
        Self {
            users: Arc::new(InMemoryUsers::default()),
            app,
        }
    }

    pub(crate) async fn send_empty(
        &self,
        (method, uri): (Method, String),
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        send(self.app.clone(), request).await
    }

    pub(crate) async fn send_json(
        &self,
        route: (Method, String),
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.send_raw_json(route, &body.to_string()).await
    }

    pub(crate) async fn send_raw_json(
        &self,
        (method, uri): (Method, String),
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap();
        send(self.app.clone(), request).await
    }
}

/// Sends `request` through `app` and decodes the JSON response.
pub(crate) async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_SIZE)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| panic!("body is not JSON: {}", String::from_utf8_lossy(&bytes)));
    (status, body)
}
