//! Integration tests for Emporium.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```
//!
//! No external services are needed: the storefront router is driven in
//! process with `tower::ServiceExt::oneshot`, and stores persist into
//! temporary directories.
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart survives process restarts through `FileStorage`
//! - `wishlist_persistence` - Wishlist survives restarts; stores stay independent
//! - `route_guard` - Guard decisions over HTTP with real sessions

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
    routing::post,
};
use emporium_client::{NewCartEntry, ProductSnapshot, VariantSnapshot};
use emporium_core::{AuthToken, UserRole};
use emporium_storefront::{
    config::StorefrontConfig, error::AppError, middleware::auth::AUTH_TOKEN_KEY,
    middleware::set_auth_token, routes, state::AppState,
};
use rust_decimal::Decimal;
use tower::ServiceExt;
use tower_sessions::Session;

/// Path of the test-only sign-in endpoint.
pub const TEST_SIGN_IN: &str = "/test/sign-in";

/// Path of the test-only endpoint storing a raw session value as the token.
pub const TEST_RAW_TOKEN: &str = "/test/raw-token";

/// Storefront configuration for tests.
pub fn test_config() -> StorefrontConfig {
    test_config_with(&[])
}

/// Storefront configuration for tests with extra environment variables.
pub fn test_config_with(vars: &[(&str, &str)]) -> StorefrontConfig {
    StorefrontConfig::from_lookup(|key| {
        if key == "STOREFRONT_BASE_URL" {
            return Some("http://localhost:3000".to_string());
        }
        vars.iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| (*value).to_string())
    })
    .unwrap()
}

/// The full storefront stack plus endpoints standing in for the identity layer.
pub fn storefront() -> Router {
    storefront_with(test_config())
}

/// Like [`storefront`], with a custom configuration.
pub fn storefront_with(config: StorefrontConfig) -> Router {
    let routes = routes::routes(&config.access)
        .route(
            TEST_SIGN_IN,
            post(
                |session: Session, Json(token): Json<AuthToken>| async move {
                    set_auth_token(&session, &token).await?;
                    Ok::<_, AppError>(StatusCode::NO_CONTENT)
                },
            ),
        )
        .route(
            TEST_RAW_TOKEN,
            post(
                |session: Session, Json(value): Json<serde_json::Value>| async move {
                    session.insert(AUTH_TOKEN_KEY, value).await?;
                    Ok::<_, AppError>(StatusCode::NO_CONTENT)
                },
            ),
        );
    emporium_storefront::build_app(routes, AppState::new(config))
}

/// Send a request through a fresh copy of `app`.
pub async fn send(app: &Router, method: &str, path: &str, cookie: Option<&str>) -> Response {
    send_json(app, method, path, cookie, None).await
}

/// Send a request with an optional JSON body.
pub async fn send_json(
    app: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// The `name=value` part of the session cookie set by `response`.
pub fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response sets a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// Sign in with `role` and return the session cookie.
pub async fn sign_in(app: &Router, role: UserRole) -> String {
    let token = serde_json::to_value(AuthToken::with_role(role)).unwrap();
    let response = send_json(app, "POST", TEST_SIGN_IN, None, Some(token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    session_cookie(&response)
}

/// `Location` header of a redirect.
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// A cart entry for variant `variant` at `price` (in cents).
pub fn cart_entry(variant: &str, cents: i64, quantity: u32) -> NewCartEntry {
    let price = Decimal::new(cents, 2);
    let product = ProductSnapshot::new(format!("prod-{variant}"), format!("Product {variant}"), price);
    let variant = VariantSnapshot::new(variant, product.id.clone(), "Default", price);
    NewCartEntry::new(product, variant, quantity)
}
