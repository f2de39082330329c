use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::warn;

use crate::error::ApiError;
use crate::validation::ValidationError;

/// Extracts the `:id` path segment as a numeric user id.
#[derive(Debug)]
pub struct UserIdPath(pub i64);

impl UserIdPath {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        raw.parse::<i64>().map(UserIdPath).map_err(|_| {
            ValidationError::new("id", format!("expected a numeric value, got '{}'", raw))
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        UserIdPath::parse(&raw).map_err(|e| {
            warn!(error = %e, "invalid user id");
            e.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers() {
        assert_eq!(UserIdPath::parse("42").unwrap().0, 42);
        assert_eq!(UserIdPath::parse("-3").unwrap().0, -3);
    }

    #[test]
    fn rejects_non_numeric() {
        for raw in ["abc", "", "1.5", "12abc", "99999999999999999999", " 5", "1e3", "0x10"] {
            let err = UserIdPath::parse(raw).unwrap_err();
            assert_eq!(err.field, "id");
            assert!(err.message.contains(raw));
        }
    }
}
