//! User management endpoints (access token required)
//!
//! Any valid access token may manage any user, privileged fields included.
//! Role checks belong to whatever sits in front of these routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use tracing::debug;

use crate::api::middleware::RequireAccessToken;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, UsersResponse};
use crate::domain::user::{User, UserId};
use crate::infrastructure::user::{CreateUserRequest, UpdateUserRequest};

/// Create the users router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<i64>()
        .ok()
        .and_then(|id| UserId::new(id).ok())
        .ok_or_else(|| {
            ApiError::bad_request(format!("Invalid user ID '{}'", raw))
                .with_param("id")
                .with_code("invalid_id")
        })
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAccessToken(_): RequireAccessToken,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.credential_service.list_all().await?;

    Ok(Json(UsersResponse::new(users)))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAccessToken(claims): RequireAccessToken,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    debug!(actor = %claims.sub, username = %request.username, "Creating user");

    let user = state.credential_service.create(request).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAccessToken(_): RequireAccessToken,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state.credential_service.get(parse_user_id(&id)?).await?;

    Ok(Json(user))
}

/// PATCH /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAccessToken(claims): RequireAccessToken,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let id = parse_user_id(&id)?;
    debug!(actor = %claims.sub, user_id = %id, "Updating user");

    let user = state.credential_service.update(id, request).await?;

    Ok(Json(user))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAccessToken(claims): RequireAccessToken,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_user_id(&id)?;
    debug!(actor = %claims.sub, user_id = %id, "Deleting user");

    state.credential_service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("42").unwrap().value(), 42);

        for raw in ["0", "-1", "abc", ""] {
            let err = parse_user_id(raw).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.response.error.param.as_deref(), Some("id"));
        }
    }
}
