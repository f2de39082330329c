//! Mapping of every failure the service can report to an HTTP response.

use std::any::Any;

use axum::{
    extract::Request,
    http::{header, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Errors visible to the client.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request violates an input contract; the message names the constraint.
    #[error("{0}")]
    Validation(String),

    /// A well-formed request referenced an entity that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The storage layer failed. The message is passed to the client as is.
    #[error("{0}")]
    Database(String),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

/// Uniform error body.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorBody {
        match self {
            ApiError::Validation(detail) => ErrorBody {
                error: "Bad Request".into(),
                detail: Some(detail),
            },
            ApiError::NotFound(what) => ErrorBody {
                error: what,
                detail: None,
            },
            ApiError::Database(detail) => ErrorBody {
                error: "Database error".into(),
                detail: Some(detail),
            },
            ApiError::Internal(detail) => ErrorBody {
                error: "Internal Server Error".into(),
                detail: Some(detail),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Response for requests that match no route.
pub async fn route_not_found(method: Method, uri: Uri) -> Response {
    let body = ErrorBody {
        error: "Not Found".into(),
        detail: Some(format!("{} {}", method, uri.path())),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Gives the router's bare 405 for a known path the uniform error body,
/// keeping its `Allow` header.
pub async fn method_not_allowed(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let body = ErrorBody {
        error: "Method Not Allowed".into(),
        detail: Some(format!("{} {}", method, path)),
    };
    let mut rewritten = (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response();
    if let Some(allow) = response.headers().get(header::ALLOW) {
        rewritten.headers_mut().insert(header::ALLOW, allow.clone());
    }
    rewritten
}

/// Turns a handler panic into the generic 500 body.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!(%detail, "handler panicked");
    ApiError::Internal(detail).into_response()
}
