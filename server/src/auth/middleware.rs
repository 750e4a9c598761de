//! Authentication middleware.
//!
//! The bearer token is taken as the caller's user id. Tokens are not
//! verified; `AUTH_SECRET` only decides whether a token is required.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use spacesync_engine::UserId;

use crate::error::AppError;
use crate::AppState;

/// User id assumed for requests without credentials when auth is off.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Authenticated user extracted from request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| AppError::Unauthorized("Invalid authorization header"))?,
            ),
            None => None,
        };

        match auth_header {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) if !token.trim().is_empty() => Ok(AuthUser {
                    user_id: token.trim().to_string(),
                }),
                Some(_) => Err(AppError::Unauthorized("Empty bearer token")),
                None => Err(AppError::Unauthorized(
                    "Invalid authorization header format",
                )),
            },
            None if state.config.auth_secret.is_none() => Ok(AuthUser {
                user_id: ANONYMOUS_USER.to_string(),
            }),
            None => Err(AppError::Unauthorized("Missing authorization header")),
        }
    }
}
