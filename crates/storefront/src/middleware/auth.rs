//! Auth token storage in the session, plus an extractor for handlers.
//!
//! The identity layer signs visitors in by calling [`set_auth_token`]; the
//! route guard and [`OptionalAuth`] read the token back. A token that fails
//! to deserialize (unknown role, wrong shape) is treated as absent.

use axum::{extract::FromRequestParts, http::request::Parts};
use emporium_core::AuthToken;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};

/// Session key holding the visitor's [`AuthToken`].
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Read the auth token from `session`, if a valid one is stored.
pub async fn current_token(session: &Session) -> Option<AuthToken> {
    session
        .get::<AuthToken>(AUTH_TOKEN_KEY)
        .await
        .ok()
        .flatten()
}

/// Extractor that optionally gets the signed-in visitor's token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(token): OptionalAuth) -> impl IntoResponse {
///     match token {
///         Some(t) => format!("Signed in as {}", t.role),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<AuthToken>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = match parts.extensions.get::<Session>() {
            Some(session) => current_token(session).await,
            None => None,
        };

        Ok(Self(token))
    }
}

/// Store `token` in the session (sign-in).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_token(
    session: &Session,
    token: &AuthToken,
) -> Result<(), tower_sessions::session::Error> {
    // Rotate the session id on privilege change
    session.cycle_id().await?;
    session.insert(AUTH_TOKEN_KEY, token).await?;
    set_sentry_user(
        token.subject.as_ref().map(emporium_core::UserId::as_str),
        token.email.as_deref(),
    );
    Ok(())
}

/// Remove the auth token from the session (sign-out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_token(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(AUTH_TOKEN_KEY).await?;
    clear_sentry_user();
    Ok(())
}
