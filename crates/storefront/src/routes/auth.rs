//! Sign-out handler.
//!
//! Signing in belongs to the identity layer, which stores a token with
//! [`set_auth_token`](crate::middleware::set_auth_token).

use axum::extract::State;
use axum::response::Redirect;
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::clear_auth_token;
use crate::state::AppState;

/// Clear the session token and redirect home.
#[tracing::instrument(skip_all)]
pub async fn sign_out(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    clear_auth_token(&session).await?;
    tracing::info!("visitor signed out");
    Ok(Redirect::to(state.access().home_path()))
}
