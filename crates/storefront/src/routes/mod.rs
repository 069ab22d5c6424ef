//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check
//!
//! GET  /                       - Home page
//! GET  /products               - Product listing
//!
//! # Auth (signed-in visitors are sent home)
//! GET  /auth/signin            - Sign-in page
//!
//! # Account (requires a token)
//! GET  /account[/...]          - Account pages
//! POST /account/signout        - Clear the session token
//!
//! # Admin (requires ADMIN or MANAGER)
//! GET  /admin[/...]            - Admin dashboard
//! ```
//!
//! The paths above are the defaults. Guarded pages are mounted under the roots
//! of the [`AccessPolicy`] the guard uses, so moving a root moves its pages.
//!
//! Pages are placeholders for the rendering layer; access control happens in
//! [`route_guard`](crate::middleware::route_guard) before they run.

pub mod auth;
pub mod health;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};
use emporium_core::AccessPolicy;

use crate::state::AppState;

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::account))
        .route("/signout", post(auth::sign_out))
        .route("/{*rest}", get(pages::account))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::admin))
        .route("/{*rest}", get(pages::admin))
}

/// Create all routes for the storefront, mounted where `policy` guards them.
///
/// # Panics
///
/// Panics if the sign-in or home path overlaps another route.
pub fn routes(policy: &AccessPolicy) -> Router<AppState> {
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/", get(pages::home))
        .route("/products", get(pages::products))
        .route(policy.sign_in_path(), get(pages::sign_in))
        .nest(policy.account_root(), account_routes())
        .nest(policy.admin_root(), admin_routes());

    if policy.home_path() != "/" {
        router = router.route(policy.home_path(), get(pages::home));
    }

    router.fallback(pages::not_found)
}
