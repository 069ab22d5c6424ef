//! Route access rules for storefront navigation.
//!
//! Every request path falls into exactly one [`PathCategory`]. The decision
//! for a request is a pure function of that category and the caller's
//! [`AuthToken`], if any:
//!
//! | Category | Token | Decision |
//! |---|---|---|
//! | `Auth` | present | redirect home |
//! | `Auth` | absent | allow |
//! | `Admin` | absent | redirect to sign-in |
//! | `Admin` | `ADMIN` / `MANAGER` | allow |
//! | `Admin` | other role | redirect home |
//! | `Account` | absent | redirect to sign-in |
//! | `Account` | present | allow |
//! | `Public` | any | allow |
//!
//! [`authorized_for`] is the coarser yes/no predicate consulted before the
//! table. It must never grant a request the table redirects for lack of
//! credentials, and must grant everything the table allows.
//!
//! A missing or malformed token is simply "not signed in"; nothing here fails.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{UserId, UserRole};

/// Authentication token attached to a request by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Authenticated user, when the identity layer provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<UserId>,
    /// Email of the authenticated user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role granted to the user.
    pub role: UserRole,
}

impl AuthToken {
    /// Token carrying only a role.
    #[must_use]
    pub const fn with_role(role: UserRole) -> Self {
        Self {
            subject: None,
            email: None,
            role,
        }
    }
}

/// Category of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCategory {
    /// Sign-in and sign-up pages.
    Auth,
    /// Administrative dashboard.
    Admin,
    /// Signed-in user's account pages.
    Account,
    /// Everything else.
    Public,
}

impl PathCategory {
    /// All categories, in table priority order.
    pub const ALL: [Self; 4] = [Self::Auth, Self::Admin, Self::Account, Self::Public];

    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Admin => "admin",
            Self::Account => "account",
            Self::Public => "public",
        }
    }
}

/// Outcome of evaluating a request against the access rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Let the request through.
    Allow,
    /// Send the visitor to the sign-in page.
    RedirectToSignIn,
    /// Send the visitor to the home page.
    RedirectToHome,
}

impl Decision {
    /// Whether the request may proceed.
    #[must_use]
    pub const fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::RedirectToSignIn => "redirect_to_sign_in",
            Self::RedirectToHome => "redirect_to_home",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide a request from its category and token.
#[must_use]
pub const fn decide_for(category: PathCategory, token: Option<&AuthToken>) -> Decision {
    match (category, token) {
        (PathCategory::Auth, Some(_)) => Decision::RedirectToHome,
        (PathCategory::Admin | PathCategory::Account, None) => Decision::RedirectToSignIn,
        (PathCategory::Admin, Some(token)) if !token.role.can_access_admin() => {
            Decision::RedirectToHome
        }
        _ => Decision::Allow,
    }
}

/// Whether a request in `category` is authorized at all.
#[must_use]
pub const fn authorized_for(category: PathCategory, token: Option<&AuthToken>) -> bool {
    match (category, token) {
        (PathCategory::Auth | PathCategory::Public, _) => true,
        (PathCategory::Admin, Some(token)) => token.role.can_access_admin(),
        (PathCategory::Account, Some(_)) => true,
        (PathCategory::Admin | PathCategory::Account, None) => false,
    }
}

/// Errors building an [`AccessPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A configured path does not start with `/`.
    #[error("path must start with '/': {0:?}")]
    NotAbsolute(String),
    /// A root would capture every path.
    #[error("path root must name a segment, got {0:?}")]
    EmptyRoot(String),
}

/// Path roots and redirect targets used to classify requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    auth_root: String,
    admin_root: String,
    account_root: String,
    sign_in_path: String,
    home_path: String,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            auth_root: Self::DEFAULT_AUTH_ROOT.to_owned(),
            admin_root: Self::DEFAULT_ADMIN_ROOT.to_owned(),
            account_root: Self::DEFAULT_ACCOUNT_ROOT.to_owned(),
            sign_in_path: Self::DEFAULT_SIGN_IN_PATH.to_owned(),
            home_path: Self::DEFAULT_HOME_PATH.to_owned(),
        }
    }
}

impl AccessPolicy {
    pub const DEFAULT_AUTH_ROOT: &'static str = "/auth";
    pub const DEFAULT_ADMIN_ROOT: &'static str = "/admin";
    pub const DEFAULT_ACCOUNT_ROOT: &'static str = "/account";
    pub const DEFAULT_SIGN_IN_PATH: &'static str = "/auth/signin";
    pub const DEFAULT_HOME_PATH: &'static str = "/";

    /// Replace the three category roots.
    ///
    /// Trailing slashes are dropped, so `/admin/` behaves like `/admin`.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError` if a root is relative or is `/` itself.
    pub fn with_roots(
        mut self,
        auth_root: &str,
        admin_root: &str,
        account_root: &str,
    ) -> Result<Self, PolicyError> {
        self.auth_root = normalize_root(auth_root)?;
        self.admin_root = normalize_root(admin_root)?;
        self.account_root = normalize_root(account_root)?;
        Ok(self)
    }

    /// Replace the redirect targets.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::NotAbsolute` if a target does not start with `/`.
    pub fn with_redirects(mut self, sign_in_path: &str, home_path: &str) -> Result<Self, PolicyError> {
        self.sign_in_path = absolute(sign_in_path)?;
        self.home_path = absolute(home_path)?;
        Ok(self)
    }

    /// Root of the sign-in and sign-up pages.
    #[must_use]
    pub fn auth_root(&self) -> &str {
        &self.auth_root
    }

    /// Root of the admin dashboard.
    #[must_use]
    pub fn admin_root(&self) -> &str {
        &self.admin_root
    }

    /// Root of the account pages.
    #[must_use]
    pub fn account_root(&self) -> &str {
        &self.account_root
    }

    /// Sign-in page path.
    #[must_use]
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    /// Home page path.
    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Classify a request path.
    ///
    /// The longest matching root wins; equal lengths fall back to table order.
    #[must_use]
    pub fn classify(&self, path: &str) -> PathCategory {
        let roots = [
            (PathCategory::Auth, self.auth_root.as_str()),
            (PathCategory::Admin, self.admin_root.as_str()),
            (PathCategory::Account, self.account_root.as_str()),
        ];

        let mut best: Option<(PathCategory, usize)> = None;
        for (category, root) in roots {
            if root_matches(root, path) && best.is_none_or(|(_, len)| root.len() > len) {
                best = Some((category, root.len()));
            }
        }
        best.map_or(PathCategory::Public, |(category, _)| category)
    }

    /// Decide a request for `path`.
    #[must_use]
    pub fn decide(&self, path: &str, token: Option<&AuthToken>) -> Decision {
        decide_for(self.classify(path), token)
    }

    /// Whether a request for `path` is authorized at all.
    #[must_use]
    pub fn is_authorized(&self, path: &str, token: Option<&AuthToken>) -> bool {
        authorized_for(self.classify(path), token)
    }

    /// Where a decision sends the visitor, or `None` to proceed.
    #[must_use]
    pub fn redirect_target(&self, decision: Decision) -> Option<&str> {
        match decision {
            Decision::Allow => None,
            Decision::RedirectToSignIn => Some(&self.sign_in_path),
            Decision::RedirectToHome => Some(&self.home_path),
        }
    }
}

fn absolute(path: &str) -> Result<String, PolicyError> {
    if path.starts_with('/') {
        Ok(path.to_owned())
    } else {
        Err(PolicyError::NotAbsolute(path.to_owned()))
    }
}

fn normalize_root(root: &str) -> Result<String, PolicyError> {
    let root = absolute(root)?;
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(PolicyError::EmptyRoot(root));
    }
    Ok(trimmed.to_owned())
}

/// `root` matches `path` on a segment boundary, case-sensitively.
fn root_matches(root: &str, path: &str) -> bool {
    path.strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
