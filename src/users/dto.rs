use serde::{Deserialize, Serialize};

use crate::users::{NewUser, User};
use crate::validation::{email_format, min_length, Validate, ValidationError};

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        min_length("username", &self.username, 1)?;
        email_format("email", &self.email)?;
        Ok(())
    }
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            username: req.username,
            email: req.email,
        }
    }
}

/// Response returned after a user is inserted.
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub message: &'static str,
    pub user_id: i64,
}

/// Public representation of a stored user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            user_id: narrow_id(user.user_id),
            username: user.username,
            email: user.email,
        }
    }
}

/// Largest integer a double-precision number holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Narrows a database identifier to the double-precision number domain that
/// JSON clients decode into. Identifiers beyond `MAX_SAFE_INTEGER` lose
/// precision; that is reported but not prevented.
pub fn narrow_id(id: i64) -> i64 {
    let narrowed = id as f64 as i64;
    if id.unsigned_abs() > MAX_SAFE_INTEGER as u64 {
        tracing::warn!(user_id = id, narrowed, "user id exceeds the safe integer range");
    }
    narrowed
}
