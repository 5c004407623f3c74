//! Declarative route table and the navigation menu built from it.

use crate::model::Role;

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Only visitors who are not signed in.
    GuestOnly,
    /// Any signed-in user.
    Protected,
    /// Signed-in users with one of the listed roles.
    Roles(&'static [Role]),
}

/// One row of the route table. A pattern ending in `/*` matches its base
/// path and everything below it.
#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    pub pattern: &'static str,
    pub access: Access,
}

const USER_ONLY: &[Role] = &[Role::User];
const VET_ONLY: &[Role] = &[Role::Vet];

pub static ROUTES: &[RouteRule] = &[
    RouteRule { pattern: "/", access: Access::Public },
    RouteRule { pattern: "/auth/login", access: Access::GuestOnly },
    RouteRule { pattern: "/auth/register", access: Access::GuestOnly },
    RouteRule { pattern: "/auth/verify-email", access: Access::GuestOnly },
    RouteRule { pattern: "/dashboard", access: Access::Protected },
    RouteRule { pattern: "/appointments/*", access: Access::Protected },
    RouteRule { pattern: "/profile", access: Access::Protected },
    RouteRule { pattern: "/pets/*", access: Access::Roles(USER_ONLY) },
    RouteRule { pattern: "/patients", access: Access::Roles(VET_ONLY) },
    RouteRule { pattern: "/clinic", access: Access::Roles(VET_ONLY) },
    RouteRule { pattern: "/onboarding/*", access: Access::Roles(VET_ONLY) },
];

impl RouteRule {
    pub fn matches(&self, path: &str) -> bool {
        match self.pattern.strip_suffix("/*") {
            Some(base) => {
                path == base
                    || path
                        .strip_prefix(base)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            None => path == self.pattern,
        }
    }
}

/// Access level for `path`; unlisted paths are public.
pub fn classify(path: &str) -> Access {
    let path = normalize(path);
    ROUTES
        .iter()
        .find(|rule| rule.matches(path))
        .map_or(Access::Public, |rule| rule.access)
}

/// Whether a signed-in user with `role` may open `path`.
pub fn role_permits(role: Role, path: &str) -> bool {
    match classify(path) {
        Access::Public | Access::Protected => true,
        Access::GuestOnly => false,
        Access::Roles(roles) => roles.contains(&role),
    }
}

/// Paths the guard never looks at: API calls, framework assets, images.
pub fn is_asset(path: &str) -> bool {
    const PREFIXES: &[&str] = &["/api/", "/_next/", "/static/"];
    const EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp"];

    if PREFIXES.iter().any(|p| path.starts_with(p)) || path == "/favicon.ico" {
        return true;
    }
    let lower = path.to_ascii_lowercase();
    EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Drop the query string and any trailing slash (except on `/`).
pub(crate) fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

// ── Navigation ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub href: &'static str,
    pub label: &'static str,
}

static MENU: &[MenuItem] = &[
    MenuItem { href: "/dashboard", label: "Dashboard" },
    MenuItem { href: "/appointments", label: "Appointments" },
    MenuItem { href: "/appointments/new", label: "New appointment" },
    MenuItem { href: "/pets", label: "My pets" },
    MenuItem { href: "/pets/new", label: "Add pet" },
    MenuItem { href: "/patients", label: "Patients" },
    MenuItem { href: "/clinic", label: "Clinic" },
    MenuItem { href: "/profile", label: "Profile" },
];

/// Menu entries the route table lets `role` open.
pub fn menu_for(role: Role) -> Vec<MenuItem> {
    MENU.iter()
        .copied()
        .filter(|item| role_permits(role, item.href))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_base_and_children_only() {
        let rule = RouteRule { pattern: "/pets/*", access: Access::Protected };
        assert!(rule.matches("/pets"));
        assert!(rule.matches("/pets/new"));
        assert!(rule.matches("/pets/123/edit"));
        assert!(!rule.matches("/petshop"));
    }

    #[test]
    fn classify_known_and_unknown_paths() {
        assert_eq!(classify("/"), Access::Public);
        assert_eq!(classify("/auth/login"), Access::GuestOnly);
        assert_eq!(classify("/appointments/new"), Access::Protected);
        assert_eq!(classify("/onboarding/clinic-info"), Access::Roles(VET_ONLY));
        assert_eq!(classify("/pets/"), Access::Roles(USER_ONLY));
        assert_eq!(classify("/dashboard?tab=today"), Access::Protected);
        assert_eq!(classify("/about"), Access::Public);
    }

    #[test]
    fn assets_bypass() {
        assert!(is_asset("/api/pets"));
        assert!(is_asset("/_next/static/chunk.js"));
        assert!(is_asset("/favicon.ico"));
        assert!(is_asset("/images/cat.PNG"));
        assert!(!is_asset("/dashboard"));
    }

    #[test]
    fn menu_is_filtered_by_role() {
        let hrefs = |role| menu_for(role).iter().map(|i| i.href).collect::<Vec<_>>();
        assert_eq!(
            hrefs(Role::User),
            vec!["/dashboard", "/appointments", "/appointments/new", "/pets", "/pets/new", "/profile"]
        );
        assert_eq!(
            hrefs(Role::Vet),
            vec!["/dashboard", "/appointments", "/appointments/new", "/patients", "/clinic", "/profile"]
        );
    }
}
