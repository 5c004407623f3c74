//! axum middleware applying the guard to incoming requests.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/dashboard", get(dashboard))
//!     .layer(axum::middleware::from_fn(route_guard));
//! ```

use axum::extract::Request;
use axum::http::header::COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::{GuardDecision, evaluate};
use crate::session::CookieSession;

/// Redirect (307) or pass the request through.
pub async fn route_guard(request: Request, next: Next) -> Response {
    let cookies = request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    let session = CookieSession::from_header(&cookies);

    match evaluate(request.uri().path(), &session) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => Redirect::temporary(&target).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{StatusCode, header::LOCATION};
    use axum::routing::get;
    use tower::ServiceExt;

    use crate::model::{Role, User};
    use crate::session::{CookieBackend, PersistedSession, SessionBackend};

    fn app() -> Router {
        Router::new()
            .route("/dashboard", get(|| async { "dashboard" }))
            .route("/auth/login", get(|| async { "login" }))
            .route("/onboarding", get(|| async { "onboarding" }))
            .layer(axum::middleware::from_fn(route_guard))
    }

    async fn cookie_for(role: Role) -> String {
        let jar = CookieBackend::default();
        jar.save(&PersistedSession {
            access_token: "tok".into(),
            user: User {
                id: "u-1".into(),
                email: "someone@example.com".into(),
                user_code: None,
                role,
                is_verified: true,
                onboarding_step: None,
                steps: None,
            },
        })
        .await
        .unwrap();
        jar.cookie_header().await.unwrap()
    }

    async fn get_path(path: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        app().oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn anonymous_dashboard_redirects_to_login() {
        let response = get_path("/dashboard", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/auth/login");
    }

    #[tokio::test]
    async fn signed_in_user_passes_through() {
        let cookie = cookie_for(Role::Vet).await;
        let response = get_path("/dashboard", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn signed_in_user_bounced_from_login() {
        let cookie = cookie_for(Role::User).await;
        let response = get_path("/auth/login", Some(&cookie)).await;
        assert_eq!(response.headers()[LOCATION], "/dashboard");
    }

    #[tokio::test]
    async fn pet_owner_cannot_open_onboarding() {
        let cookie = cookie_for(Role::User).await;
        let response = get_path("/onboarding", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/dashboard");
    }
}
