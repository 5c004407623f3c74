//! Cookie mirror of the session.
//!
//! Two cookies, `access_token` and `user` (URI-encoded JSON), both scoped to
//! `Path=/`. The route guard only ever sees these cookies, never the client
//! backend.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tokio::sync::RwLock;
use tracing::warn;

use super::PersistedSession;
use super::backend::SessionBackend;
use crate::config::DEFAULT_COOKIE_MAX_AGE_DAYS;
use crate::error::SessionError;
use crate::model::{Role, User};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const USER_COOKIE: &str = "user";

/// Characters `encodeURIComponent` leaves alone.
pub(crate) const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq)]
enum JarState {
    /// Nothing was ever written.
    Empty,
    Set(PersistedSession),
    /// Cleared; the next response should expire the cookies.
    Expired,
}

/// In-process cookie jar mirroring the session.
#[derive(Debug)]
pub struct CookieBackend {
    jar: RwLock<JarState>,
    max_age: Duration,
}

impl Default for CookieBackend {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_COOKIE_MAX_AGE_DAYS * 24 * 60 * 60))
    }
}

impl CookieBackend {
    pub fn new(max_age: Duration) -> Self {
        Self {
            jar: RwLock::new(JarState::Empty),
            max_age,
        }
    }

    /// `Cookie` request header for the current jar, `None` when empty.
    pub async fn cookie_header(&self) -> Option<String> {
        match &*self.jar.read().await {
            JarState::Set(session) => Some(format!(
                "{ACCESS_TOKEN_COOKIE}={}; {USER_COOKIE}={}",
                session.access_token,
                encode_user(&session.user).ok()?
            )),
            JarState::Empty | JarState::Expired => None,
        }
    }

    /// `Set-Cookie` values a host would send for the current jar.
    pub async fn set_cookie_headers(&self) -> Result<Vec<String>, SessionError> {
        let headers = match &*self.jar.read().await {
            JarState::Empty => Vec::new(),
            JarState::Set(session) => {
                let max_age = self.max_age.as_secs();
                vec![
                    format!(
                        "{ACCESS_TOKEN_COOKIE}={}; Path=/; Max-Age={max_age}",
                        session.access_token
                    ),
                    format!(
                        "{USER_COOKIE}={}; Path=/; Max-Age={max_age}",
                        encode_user(&session.user)?
                    ),
                ]
            }
            JarState::Expired => vec![
                format!("{ACCESS_TOKEN_COOKIE}=; Path=/; Max-Age=0"),
                format!("{USER_COOKIE}=; Path=/; Max-Age=0"),
            ],
        };
        Ok(headers)
    }

    /// Parsed view of the jar, exactly as the route guard would read it.
    pub async fn session(&self) -> CookieSession {
        match self.cookie_header().await {
            Some(header) => CookieSession::from_header(&header),
            None => CookieSession::default(),
        }
    }
}

#[async_trait]
impl SessionBackend for CookieBackend {
    fn name(&self) -> &'static str {
        "cookie"
    }

    async fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
        Ok(match &*self.jar.read().await {
            JarState::Set(session) => Some(session.clone()),
            JarState::Empty | JarState::Expired => None,
        })
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), SessionError> {
        *self.jar.write().await = JarState::Set(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.jar.write().await = JarState::Expired;
        Ok(())
    }
}

/// The session as seen through request cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSession {
    pub access_token: Option<String>,
    pub user: Option<User>,
}

impl CookieSession {
    /// Parse a `Cookie` header. A `user` cookie that does not decode is
    /// logged and treated as absent.
    pub fn from_header(header: &str) -> Self {
        let mut session = Self::default();
        for pair in header.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match name.trim() {
                ACCESS_TOKEN_COOKIE => session.access_token = Some(value.to_string()),
                USER_COOKIE => match decode_user(value) {
                    Ok(user) => session.user = Some(user),
                    Err(reason) => warn!(reason = %reason, "Ignoring unreadable user cookie"),
                },
                _ => {}
            }
        }
        session
    }

    /// Both cookies present and the user readable.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

fn encode_user(user: &User) -> Result<String, SessionError> {
    let json = serde_json::to_string(user)?;
    Ok(utf8_percent_encode(&json, URI_COMPONENT).to_string())
}

fn decode_user(value: &str) -> Result<User, String> {
    let json = percent_decode_str(value)
        .decode_utf8()
        .map_err(|e| e.to_string())?;
    serde_json::from_str(&json).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::OnboardingStep;

    fn session() -> PersistedSession {
        PersistedSession {
            access_token: "eyJhbGciOi.payload.sig".into(),
            user: User {
                id: "v-1".into(),
                email: "dr.ayse@example.com".into(),
                user_code: None,
                role: Role::Vet,
                is_verified: true,
                onboarding_step: Some(OnboardingStep::CompanyInfo),
                steps: None,
            },
        }
    }

    #[tokio::test]
    async fn header_round_trips_through_parser() {
        let jar = CookieBackend::default();
        jar.save(&session()).await.unwrap();

        let header = jar.cookie_header().await.unwrap();
        assert!(header.starts_with("access_token=eyJhbGciOi.payload.sig; user=%7B%22id%22"));

        let parsed = CookieSession::from_header(&header);
        assert!(parsed.is_authenticated());
        assert_eq!(parsed.user, Some(session().user));
        assert_eq!(parsed.role(), Some(Role::Vet));
    }

    #[tokio::test]
    async fn set_cookie_values_carry_path_and_max_age() {
        let jar = CookieBackend::default();
        assert!(jar.set_cookie_headers().await.unwrap().is_empty());

        jar.save(&session()).await.unwrap();
        let headers = jar.set_cookie_headers().await.unwrap();
        assert_eq!(headers.len(), 2);
        assert!(headers[0].ends_with("; Path=/; Max-Age=2592000"));
        assert!(headers[1].starts_with("user=%7B"));

        jar.clear().await.unwrap();
        let headers = jar.set_cookie_headers().await.unwrap();
        assert_eq!(headers, vec![
            "access_token=; Path=/; Max-Age=0".to_string(),
            "user=; Path=/; Max-Age=0".to_string(),
        ]);
        assert!(jar.cookie_header().await.is_none());
        assert!(jar.load().await.unwrap().is_none());
    }

    #[test]
    fn malformed_user_cookie_means_no_user() {
        let parsed = CookieSession::from_header("access_token=abc; user=%7Bnot-json");
        assert_eq!(parsed.access_token.as_deref(), Some("abc"));
        assert!(parsed.user.is_none());
        assert!(!parsed.is_authenticated());
    }

    #[test]
    fn token_without_user_is_not_authenticated() {
        let parsed = CookieSession::from_header("theme=dark; access_token=abc");
        assert!(!parsed.is_authenticated());
        assert!(CookieSession::from_header("").user.is_none());
    }
}
