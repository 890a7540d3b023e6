use crate::auth::AuthSettings;
use crate::http::error::ApiError;
use crate::http::extract::CurrentUser;
use crate::http::models::{
    ChangePasswordRequest, ListUsersResponse, LoginRequest, RegisterRequest, TokenResponse,
    UpdateProfileRequest, UserInfoResponse, UserSummary,
};
use crate::DeckEngine;
use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderName},
    response::AppendHeaders,
    Json,
};
use std::sync::Arc;

/// `Set-Cookie` header pair attached to token-issuing responses.
type SessionHeaders = AppendHeaders<[(HeaderName, String); 1]>;

/// Mirrors the issued token into an `access_token` cookie so browser
/// clients that cannot hold the bearer token still authenticate.
fn session_cookie(settings: &AuthSettings, token: &str) -> SessionHeaders {
    let max_age = settings.token_ttl_minutes * 60;
    AppendHeaders([(
        SET_COOKIE,
        format!("access_token={token}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax"),
    )])
}

fn clear_session_cookie() -> SessionHeaders {
    AppendHeaders([(
        SET_COOKIE,
        "access_token=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax".to_string(),
    )])
}

/// Handler for POST /auth/register - Create an account
#[tracing::instrument(
    name = "handler_register",
    skip(engine, request),
    fields(datadeck.user_id = tracing::field::Empty)
)]
pub async fn register_handler(
    State(engine): State<Arc<DeckEngine>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(SessionHeaders, Json<TokenResponse>), ApiError> {
    let (user, token) = engine
        .identity()
        .register(request.name.as_deref(), &request.email, &request.password)
        .await?;

    tracing::Span::current().record("datadeck.user_id", &user.id);

    let cookie = session_cookie(engine.identity().settings(), &token);
    Ok((cookie, Json(TokenResponse::bearer(token))))
}

/// Handler for POST /auth/login - Verify credentials and issue a token
#[tracing::instrument(
    name = "handler_login",
    skip(engine, request),
    fields(datadeck.user_id = tracing::field::Empty)
)]
pub async fn login_handler(
    State(engine): State<Arc<DeckEngine>>,
    Json(request): Json<LoginRequest>,
) -> Result<(SessionHeaders, Json<TokenResponse>), ApiError> {
    let (user, token) = engine
        .identity()
        .authenticate(&request.email, &request.password)
        .await?;

    tracing::Span::current().record("datadeck.user_id", &user.id);

    let cookie = session_cookie(engine.identity().settings(), &token);
    Ok((cookie, Json(TokenResponse::bearer(token))))
}

/// Handler for POST /auth/logout - Drop the session cookie
pub async fn logout_handler() -> (SessionHeaders, Json<serde_json::Value>) {
    (
        clear_session_cookie(),
        Json(serde_json::json!({ "detail": "Logged out successfully" })),
    )
}

/// Handler for GET /auth/me - The authenticated account
pub async fn me_handler(CurrentUser(user): CurrentUser) -> Json<UserInfoResponse> {
    Json(UserInfoResponse::from(user))
}

/// Handler for PUT /auth/me - Update name and/or email
#[tracing::instrument(
    name = "handler_update_me",
    skip(engine, request),
    fields(datadeck.user_id = %user.id)
)]
pub async fn update_me_handler(
    State(engine): State<Arc<DeckEngine>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserInfoResponse>, ApiError> {
    if request.name.is_none() && request.email.is_none() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    let updated = engine
        .identity()
        .update_profile(&user.id, request.name.as_deref(), request.email.as_deref())
        .await?;

    Ok(Json(UserInfoResponse::from(updated)))
}

/// Handler for POST /auth/change-password - Rotate the password
#[tracing::instrument(
    name = "handler_change_password",
    skip(engine, request),
    fields(datadeck.user_id = %user.id)
)]
pub async fn change_password_handler(
    State(engine): State<Arc<DeckEngine>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    engine
        .identity()
        .change_password(&user.id, &request.old_password, &request.new_password)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Password updated successfully"
    })))
}

/// Handler for GET /auth/users - List all accounts (admin only)
#[tracing::instrument(
    name = "handler_list_users",
    skip(engine),
    fields(
        datadeck.user_id = %user.id,
        datadeck.user_count = tracing::field::Empty,
    )
)]
pub async fn list_users_handler(
    State(engine): State<Arc<DeckEngine>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let users = engine.identity().list_users(&user).await?;

    tracing::Span::current().record("datadeck.user_count", users.len());

    let users = users
        .into_iter()
        .map(|u| UserSummary {
            id: u.id,
            name: u.name,
            email: u.email,
        })
        .collect();

    Ok(Json(ListUsersResponse { users }))
}
