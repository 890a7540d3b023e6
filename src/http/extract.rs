//! Request extractors shared by the controllers.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::catalog::UserRecord;
use crate::http::error::ApiError;
use crate::DeckEngine;

/// The authenticated account behind a request.
///
/// Resolved from the `Authorization: Bearer` header, falling back to the
/// `access_token` cookie that login sets for browser clients. Rejects with
/// 401 when neither carries a valid token.
pub struct CurrentUser(pub UserRecord);

#[axum::async_trait]
impl FromRequestParts<Arc<DeckEngine>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        engine: &Arc<DeckEngine>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;

        let user = engine.identity().current_user(&token).await?;
        Ok(CurrentUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "access_token" && !value.is_empty()).then(|| value.to_string())
    })
}
