//! Route guard middleware.
//!
//! Runs before every handler. The request path is classified by the
//! [`AccessPolicy`](emporium_core::AccessPolicy) in [`AppState`] and the
//! visitor's session token decides whether the request proceeds or is
//! redirected to the sign-in or home page.
//!
//! The authorization predicate is checked first: a request it denies is
//! never let through, whatever the decision table says.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use emporium_core::Decision;
use tower_sessions::Session;

use super::auth::current_token;
use crate::error::add_breadcrumb;
use crate::state::AppState;

/// Apply the access policy to the request.
///
/// Mount with `axum::middleware::from_fn_with_state`, inside the session layer.
/// Without a session the visitor is anonymous.
pub async fn route_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = match request.extensions().get::<Session>() {
        Some(session) => current_token(session).await,
        None => None,
    };

    let policy = state.access();
    let path = request.uri().path();
    let category = policy.classify(path);
    let authorized = policy.is_authorized(path, token.as_ref());
    let decision = gate(authorized, policy.decide(path, token.as_ref()));

    tracing::debug!(
        path,
        category = category.as_str(),
        decision = decision.as_str(),
        authorized,
        "route guard"
    );

    match policy.redirect_target(decision) {
        Some(target) => {
            add_breadcrumb(
                "navigation",
                "Redirected by route guard",
                &[("path", path), ("to", target)],
            );
            Redirect::to(target).into_response()
        }
        None => next.run(request).await,
    }
}

/// Combine the predicate with the table decision.
///
/// A denied request the table would allow is sent to sign-in.
const fn gate(authorized: bool, decision: Decision) -> Decision {
    debug_assert!(
        authorized || !decision.is_allow(),
        "authorization predicate denied a request the decision table allows"
    );
    if authorized || !decision.is_allow() {
        decision
    } else {
        Decision::RedirectToSignIn
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::StatusCode, http::header::LOCATION, routing::get};
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    fn app() -> Router {
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "STOREFRONT_BASE_URL").then(|| "http://localhost:3000".to_string())
        })
        .unwrap();
        let state = AppState::new(config);

        Router::new()
            .route("/products", get(|| async { "products" }))
            .route("/auth/signin", get(|| async { "sign in" }))
            .route("/admin/orders", get(|| async { "orders" }))
            .layer(axum::middleware::from_fn_with_state(state.clone(), route_guard))
            .with_state(state)
    }

    async fn get_path(path: &str) -> Response {
        app()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[test]
    fn test_gate_keeps_table_decision_when_authorized() {
        for decision in [
            Decision::Allow,
            Decision::RedirectToSignIn,
            Decision::RedirectToHome,
        ] {
            assert_eq!(gate(true, decision), decision);
        }
    }

    #[test]
    fn test_gate_keeps_table_redirect_when_denied() {
        assert_eq!(gate(false, Decision::RedirectToHome), Decision::RedirectToHome);
        assert_eq!(gate(false, Decision::RedirectToSignIn), Decision::RedirectToSignIn);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_gate_never_allows_denied_request() {
        assert_eq!(gate(false, Decision::Allow), Decision::RedirectToSignIn);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "authorization predicate denied")]
    fn test_gate_flags_disagreement() {
        let _ = gate(false, Decision::Allow);
    }

    #[tokio::test]
    async fn test_anonymous_public_request_passes() {
        let response = get_path("/products").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_anonymous_sign_in_page_passes() {
        let response = get_path("/auth/signin").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_anonymous_admin_redirects_to_sign_in() {
        let response = get_path("/admin/orders").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/auth/signin");
    }
}
