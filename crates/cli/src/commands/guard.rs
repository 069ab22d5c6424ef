//! Route guard inspection.

use emporium_core::{AccessPolicy, AuthToken, UserRole};

/// Evaluate `path` for a visitor with `role` (anonymous when `None`).
#[allow(clippy::print_stdout)]
pub fn check(policy: &AccessPolicy, path: &str, role: Option<UserRole>) {
    println!("{}", render(policy, path, role));
}

/// Describe the guard's verdict for `path`.
#[must_use]
pub fn render(policy: &AccessPolicy, path: &str, role: Option<UserRole>) -> String {
    let token = role.map(AuthToken::with_role);
    let category = policy.classify(path);
    let decision = policy.decide(path, token.as_ref());
    let authorized = policy.is_authorized(path, token.as_ref());

    let mut line = format!(
        "path={path} category={} decision={decision} authorized={authorized}",
        category.as_str()
    );
    if let Some(target) = policy.redirect_target(decision) {
        line.push_str(" location=");
        line.push_str(target);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_admin_for_customer() {
        let line = render(&AccessPolicy::default(), "/admin/orders", Some(UserRole::Customer));
        assert_eq!(
            line,
            "path=/admin/orders category=admin decision=redirect_to_home authorized=false location=/"
        );
    }

    #[test]
    fn test_render_public_anonymous() {
        let line = render(&AccessPolicy::default(), "/products", None);
        assert_eq!(line, "path=/products category=public decision=allow authorized=true");
    }
}
