use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument};

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{narrow_id, CreateUserRequest, CreatedUserResponse, UserResponse},
        extractors::UserIdPath,
        NewUser,
    },
    validation::ValidJson,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), ApiError> {
    let new_user = NewUser::from(payload);
    let user_id = match state.users.create(&new_user).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(ApiError::Database(e.to_string()));
        }
    };

    info!(user_id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            message: "User created successfully",
            user_id: narrow_id(user_id),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> Result<Json<UserResponse>, ApiError> {
    match state.users.find_by_id(user_id).await {
        Ok(Some(user)) => Ok(Json(UserResponse::from(user))),
        Ok(None) => Err(ApiError::NotFound("User not found".into())),
        Err(e) => {
            error!(error = %e, user_id, "get user failed");
            Err(ApiError::Database(e.to_string()))
        }
    }
}
