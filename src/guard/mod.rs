//! Route guard: decides whether a request path is served or redirected,
//! based only on the session cookies.

pub mod middleware;
pub mod routes;

pub use middleware::route_guard;
pub use routes::{Access, MenuItem, ROUTES, RouteRule, classify, is_asset, menu_for, role_permits};

use tracing::debug;

use crate::session::CookieSession;

pub const LOGIN_PATH: &str = "/auth/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

impl GuardDecision {
    fn redirect(path: &str, target: &str) -> Self {
        debug!(path, target, "Guard redirect");
        Self::Redirect(target.to_string())
    }
}

/// Decide what to do with a request for `path`.
pub fn evaluate(path: &str, cookies: &CookieSession) -> GuardDecision {
    if is_asset(path) {
        return GuardDecision::Allow;
    }
    let normalized = routes::normalize(path);
    if normalized == "/login" {
        return GuardDecision::redirect(path, LOGIN_PATH);
    }

    match (classify(normalized), cookies.role()) {
        (Access::GuestOnly, _) if cookies.is_authenticated() => {
            GuardDecision::redirect(path, DASHBOARD_PATH)
        }
        (Access::Protected | Access::Roles(_), _) if !cookies.is_authenticated() => {
            GuardDecision::redirect(path, LOGIN_PATH)
        }
        (Access::Roles(roles), Some(role)) if !roles.contains(&role) => {
            GuardDecision::redirect(path, DASHBOARD_PATH)
        }
        _ => GuardDecision::Allow,
    }
}
