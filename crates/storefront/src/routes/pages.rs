//! Placeholder pages.
//!
//! Each handler stands in for a page of the rendering layer and only shows
//! enough to tell pages apart.

use axum::http::Uri;
use axum::response::Html;

use crate::error::AppError;
use crate::middleware::OptionalAuth;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><title>{title} | Emporium</title></head>\
         <body><h1>{title}</h1><p>{body}</p></body></html>"
    ))
}

pub async fn home() -> Html<String> {
    page("Home", "Welcome to Emporium.")
}

pub async fn products() -> Html<String> {
    page("Products", "Browse the catalog.")
}

pub async fn sign_in() -> Html<String> {
    page("Sign in", "Sign in to continue.")
}

pub async fn account(OptionalAuth(token): OptionalAuth) -> Html<String> {
    let role = token.map_or("guest", |t| t.role.as_str());
    page("Your account", &format!("Signed in as {role}."))
}

pub async fn admin(OptionalAuth(token): OptionalAuth) -> Html<String> {
    let role = token.map_or("guest", |t| t.role.as_str());
    page("Admin", &format!("Dashboard for {role}."))
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
