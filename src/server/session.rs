use super::state::ServerState;
use crate::library::Requester;
use crate::user::AuthTokenValue;

use super::STORE_RETRY_AFTER_SEC;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};

#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
}

impl Session {
    pub fn requester(&self) -> Requester {
        Requester::User(self.user_id)
    }
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

#[derive(Debug)]
pub enum SessionExtractionError {
    AccessDenied,
    /// The token could not be checked, the request may be retried.
    StoreUnavailable,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::AccessDenied => StatusCode::FORBIDDEN.into_response(),
            SessionExtractionError::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::RETRY_AFTER, STORE_RETRY_AFTER_SEC)],
                "Session store unavailable",
            )
                .into_response(),
        }
    }
}

fn extract_session_token_from_cookies(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(|cookie| cookie.value().to_string())
}

/// Accepts both a raw token and the `Bearer <token>` form.
fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(HEADER_SESSION_TOKEN_KEY)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Ok(None) when the request carries no token or an unknown one.
fn extract_session_from_request_parts(
    parts: &Parts,
    ctx: &ServerState,
) -> Result<Option<Session>, SessionExtractionError> {
    let token = match extract_session_token_from_cookies(parts)
        .or_else(|| extract_session_token_from_headers(parts))
    {
        None => {
            debug!("No token in cookies nor headers.");
            return Ok(None);
        }
        Some(x) => x,
    };

    let auth_token_value = AuthTokenValue(token);
    let auth_token = match ctx.user_store.get_user_auth_token(&auth_token_value) {
        Ok(Some(token)) => token,
        Ok(None) => {
            debug!("Auth token not found in database");
            return Ok(None);
        }
        Err(e) => {
            error!("Failed to get auth token from database: {:#}", e);
            return Err(SessionExtractionError::StoreUnavailable);
        }
    };
    debug!("Found auth token for user_id={}", auth_token.user_id);

    if let Err(e) = ctx
        .user_store
        .update_user_auth_token_last_used_timestamp(&auth_token_value)
    {
        debug!("Failed to update auth token last_used timestamp: {:#}", e);
    }

    Ok(Some(Session {
        user_id: auth_token.user_id,
    }))
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)?.ok_or(SessionExtractionError::AccessDenied)
    }
}

impl OptionalFromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)
    }
}

/// The requester behind an optional session.
pub fn requester_of(session: &Option<Session>) -> Requester {
    session
        .as_ref()
        .map(Session::requester)
        .unwrap_or(Requester::Anonymous)
}
