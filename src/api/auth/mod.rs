//! Account endpoints: signup, login, token refresh and logout
//!
//! Login and refresh return the pair in the body and as HttpOnly cookies.

pub mod cookies;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, info, warn};

use self::cookies::{token_from_jar, REFRESH_TOKEN_COOKIE};
use crate::api::middleware::RequireAccessToken;
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, Json, LoginRequest, LoginResponse, MessageResponse, RefreshRequest, SignupRequest,
};
use crate::domain::token::TokenPair;
use crate::domain::user::User;
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_auth_event, AuthEvent};

/// Create the accounts router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", delete(logout))
}

fn record<T>(event: AuthEvent, result: &Result<T, DomainError>) {
    record_auth_event(event, result.is_ok());
}

/// POST /accounts/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    debug!(username = %request.username, "Signing up user");

    let result = state.credential_service.create(request.into()).await;
    record(AuthEvent::Signup, &result);

    let user = result?;
    info!(user_id = %user.id(), "User signed up");

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /accounts/login
///
/// Unknown usernames and wrong passwords are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let result = authenticate(&state, &request).await;
    record(AuthEvent::Login, &result);

    match result {
        Ok(response) => {
            info!(user_id = %response.user.id(), "User logged in");
            let jar = state.token_cookies.attach(jar, &response.tokens);
            Ok((jar, Json(response)))
        }
        Err(DomainError::NotFound { .. } | DomainError::CredentialMismatch) => {
            warn!(username = %request.username, "Rejected login");
            Err(ApiError::unauthorized("Invalid username or password")
                .with_code("credential_mismatch"))
        }
        Err(e) => Err(e.into()),
    }
}

async fn authenticate(
    state: &AppState,
    request: &LoginRequest,
) -> Result<LoginResponse, DomainError> {
    let user = state
        .credential_service
        .login(&request.username, &request.password)
        .await?;
    let tokens = state.credential_service.issue_tokens(&user)?;

    Ok(LoginResponse { tokens, user })
}

/// POST /accounts/refresh
///
/// The refresh token comes from the body, or from the `refresh_token` cookie
/// when the body does not carry one.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<TokenPair>), ApiError> {
    let refresh_token = body
        .and_then(|Json(request)| request.refresh)
        .filter(|token| !token.is_empty())
        .or_else(|| token_from_jar(&jar, REFRESH_TOKEN_COOKIE))
        .ok_or_else(|| {
            ApiError::unauthorized(
                "Refresh token required in the request body or the refresh_token cookie",
            )
            .with_code("missing_token")
        })?;

    let result = state.credential_service.refresh_tokens(&refresh_token).await;
    record(AuthEvent::Refresh, &result);

    let tokens = result?;
    let jar = state.token_cookies.attach(jar, &tokens);

    Ok((jar, Json(tokens)))
}

/// DELETE /accounts/logout
///
/// Expires the token cookies. Tokens are not revoked server-side, so a
/// bearer client must also discard its copy.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    RequireAccessToken(claims): RequireAccessToken,
) -> (CookieJar, Json<MessageResponse>) {
    debug!(user_id = %claims.sub, "User logged out");

    (
        state.token_cookies.clear(jar),
        Json(MessageResponse::new("Logged out successfully")),
    )
}
