//! Session store: the single owner of the signed-in user and token.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::PersistedSession;
use super::backend::SessionBackend;
use crate::error::SessionError;
use crate::model::User;
use crate::onboarding::{OnboardingStep, OnboardingSteps};

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    access_token: Option<SecretString>,
    is_hydrated: bool,
}

/// Read-only view of the session at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub has_token: bool,
    pub is_hydrated: bool,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.has_token
    }
}

/// Holds the session in memory and writes every change through to all
/// backends, primary first.
pub struct SessionStore {
    state: RwLock<SessionState>,
    backends: Vec<Arc<dyn SessionBackend>>,
}

impl SessionStore {
    pub fn new(primary: Arc<dyn SessionBackend>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            backends: vec![primary],
        }
    }

    /// Add a backend that receives a copy of every write.
    pub fn with_mirror(mut self, mirror: Arc<dyn SessionBackend>) -> Self {
        self.backends.push(mirror);
        self
    }

    // ── Mutators ────────────────────────────────────────────────────────

    /// Persist `user` and `token`, then make them current.
    ///
    /// If any backend fails, backends already written are cleared again and
    /// the in-memory session is left as it was.
    pub async fn login(&self, user: User, token: impl Into<String>) -> Result<(), SessionError> {
        let persisted = PersistedSession {
            access_token: token.into(),
            user,
        };

        let mut state = self.state.write().await;
        for (i, backend) in self.backends.iter().enumerate() {
            if let Err(e) = backend.save(&persisted).await {
                warn!(backend = backend.name(), error = %e, "Session save failed, rolling back");
                for written in &self.backends[..i] {
                    if let Err(e) = written.clear().await {
                        warn!(backend = written.name(), error = %e, "Rollback clear failed");
                    }
                }
                return Err(e);
            }
        }

        info!(user_id = %persisted.user.id, role = %persisted.user.role, "Signed in");
        state.access_token = Some(SecretString::from(persisted.access_token));
        state.user = Some(persisted.user);
        Ok(())
    }

    /// Drop the session everywhere. In-memory state is always cleared; the
    /// first backend failure is returned after every backend was tried.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        let user_id = state.user.as_ref().map(|u| u.id.clone());
        state.user = None;
        state.access_token = None;

        let mut first_error = None;
        for backend in &self.backends {
            if let Err(e) = backend.clear().await {
                warn!(backend = backend.name(), error = %e, "Session clear failed");
                first_error.get_or_insert(e);
            }
        }

        info!(user_id = user_id.as_deref().unwrap_or("-"), "Signed out");
        first_error.map_or(Ok(()), Err)
    }

    pub async fn update_onboarding_step(&self, step: OnboardingStep) -> Result<(), SessionError> {
        self.patch_user(|user| user.onboarding_step = Some(step)).await
    }

    pub async fn update_onboarding_steps(&self, steps: OnboardingSteps) -> Result<(), SessionError> {
        self.patch_user(|user| user.steps = Some(steps)).await
    }

    /// Set the step flags and the current step in one write.
    pub async fn record_onboarding_progress(
        &self,
        steps: OnboardingSteps,
        step: OnboardingStep,
    ) -> Result<(), SessionError> {
        self.patch_user(|user| {
            user.steps = Some(steps);
            user.onboarding_step = Some(step);
        })
        .await
    }

    /// Replace the user with a fresh copy from the backend. No-op when
    /// signed out.
    pub async fn set_user(&self, user: User) -> Result<(), SessionError> {
        self.patch_user(|current| *current = user).await
    }

    /// Swap in a refreshed access token. No-op when signed out.
    pub async fn set_access_token(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        let Some(user) = state.user.clone() else {
            return Ok(());
        };
        let previous = persisted_of(&state);
        let persisted = PersistedSession {
            access_token: token.into(),
            user,
        };
        self.write_all(&persisted, previous.as_ref()).await?;
        state.access_token = Some(SecretString::from(persisted.access_token));
        Ok(())
    }

    /// Load the session from the first backend that holds one and copy it
    /// to the others.
    pub async fn hydrate(&self) -> SessionSnapshot {
        let mut state = self.state.write().await;

        let mut found = None;
        for (i, backend) in self.backends.iter().enumerate() {
            match backend.load().await {
                Ok(Some(session)) => {
                    found = Some((i, session));
                    break;
                }
                Ok(None) => {}
                Err(e) => warn!(backend = backend.name(), error = %e, "Session load failed"),
            }
        }

        if let Some((source, session)) = found {
            for (i, backend) in self.backends.iter().enumerate() {
                if i == source {
                    continue;
                }
                let in_sync = matches!(backend.load().await, Ok(Some(ref s)) if *s == session);
                if !in_sync {
                    debug!(from = self.backends[source].name(), to = backend.name(), "Re-syncing session");
                    if let Err(e) = backend.save(&session).await {
                        warn!(backend = backend.name(), error = %e, "Session re-sync failed");
                    }
                }
            }
            state.access_token = Some(SecretString::from(session.access_token));
            state.user = Some(session.user);
        }

        state.is_hydrated = true;
        snapshot_of(&state)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> SessionSnapshot {
        snapshot_of(&*self.state.read().await)
    }

    pub async fn access_token(&self) -> Option<SecretString> {
        self.state.read().await.access_token.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        let state = self.state.read().await;
        state.user.is_some() && state.access_token.is_some()
    }

    pub async fn is_hydrated(&self) -> bool {
        self.state.read().await.is_hydrated
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Apply `patch` to a copy of the user, persist it, then commit it.
    async fn patch_user(&self, patch: impl FnOnce(&mut User)) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        let Some(mut user) = state.user.clone() else {
            return Ok(());
        };
        patch(&mut user);

        if let Some(token) = &state.access_token {
            let persisted = PersistedSession {
                access_token: token.expose_secret().to_string(),
                user: user.clone(),
            };
            self.write_all(&persisted, persisted_of(&state).as_ref()).await?;
        }
        state.user = Some(user);
        Ok(())
    }

    /// Save `session` to every backend. On failure, backends already
    /// written get `previous` back (or are cleared when there was none), so
    /// they never disagree with memory.
    async fn write_all(
        &self,
        session: &PersistedSession,
        previous: Option<&PersistedSession>,
    ) -> Result<(), SessionError> {
        for (i, backend) in self.backends.iter().enumerate() {
            if let Err(e) = backend.save(session).await {
                warn!(backend = backend.name(), error = %e, "Session save failed, restoring previous");
                for written in &self.backends[..i] {
                    let restored = match previous {
                        Some(previous) => written.save(previous).await,
                        None => written.clear().await,
                    };
                    if let Err(e) = restored {
                        warn!(backend = written.name(), error = %e, "Session restore failed");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

/// The session as it is currently committed, if complete.
fn persisted_of(state: &SessionState) -> Option<PersistedSession> {
    Some(PersistedSession {
        access_token: state.access_token.as_ref()?.expose_secret().to_string(),
        user: state.user.clone()?,
    })
}

fn snapshot_of(state: &SessionState) -> SessionSnapshot {
    SessionSnapshot {
        user: state.user.clone(),
        has_token: state.access_token.is_some(),
        is_hydrated: state.is_hydrated,
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.backends.iter().map(|b| b.name()).collect();
        f.debug_struct("SessionStore").field("backends", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use crate::session::{CookieBackend, MemoryBackend};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend whose saves always fail.
    struct BrokenBackend;

    #[async_trait]
    impl SessionBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }
        async fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
            Ok(None)
        }
        async fn save(&self, _: &PersistedSession) -> Result<(), SessionError> {
            Err(SessionError::Backend {
                backend: "broken".into(),
                reason: "quota exceeded".into(),
            })
        }
        async fn clear(&self) -> Result<(), SessionError> {
            Err(SessionError::Backend {
                backend: "broken".into(),
                reason: "quota exceeded".into(),
            })
        }
    }

    /// Backend that accepts `allowed` saves and then refuses the rest.
    struct FlakyBackend {
        inner: MemoryBackend,
        allowed: usize,
        saves: AtomicUsize,
    }

    impl FlakyBackend {
        fn allowing(allowed: usize) -> Self {
            Self {
                inner: MemoryBackend::new(),
                allowed,
                saves: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SessionBackend for FlakyBackend {
        fn name(&self) -> &'static str {
            "flaky"
        }
        async fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
            self.inner.load().await
        }
        async fn save(&self, session: &PersistedSession) -> Result<(), SessionError> {
            if self.saves.fetch_add(1, Ordering::SeqCst) >= self.allowed {
                return Err(SessionError::Backend {
                    backend: "flaky".into(),
                    reason: "disk full".into(),
                });
            }
            self.inner.save(session).await
        }
        async fn clear(&self) -> Result<(), SessionError> {
            self.inner.clear().await
        }
    }

    fn vet() -> User {
        User {
            id: "v-1".into(),
            email: "dr.ayse@example.com".into(),
            user_code: None,
            role: Role::Vet,
            is_verified: true,
            onboarding_step: Some(OnboardingStep::PersonalInfo),
            steps: None,
        }
    }

    fn store() -> (SessionStore, Arc<MemoryBackend>, Arc<CookieBackend>) {
        let primary = Arc::new(MemoryBackend::new());
        let cookies = Arc::new(CookieBackend::default());
        let store = SessionStore::new(primary.clone()).with_mirror(cookies.clone());
        (store, primary, cookies)
    }

    #[tokio::test]
    async fn login_writes_every_backend() {
        let (store, primary, cookies) = store();
        store.login(vet(), "tok-1").await.unwrap();

        assert!(store.is_authenticated().await);
        assert_eq!(primary.load().await.unwrap().unwrap().access_token, "tok-1");
        assert!(cookies.session().await.is_authenticated());
        assert_eq!(
            store.access_token().await.unwrap().expose_secret(),
            "tok-1"
        );
    }

    #[tokio::test]
    async fn logout_leaves_nothing_behind() {
        let (store, primary, cookies) = store();
        store.login(vet(), "tok-1").await.unwrap();
        store.logout().await.unwrap();

        assert!(!store.is_authenticated().await);
        assert!(store.current_user().await.is_none());
        assert!(primary.load().await.unwrap().is_none());
        assert!(cookies.load().await.unwrap().is_none());
        assert!(cookies.cookie_header().await.is_none());
    }

    #[tokio::test]
    async fn failed_login_rolls_back() {
        let primary = Arc::new(MemoryBackend::new());
        let store = SessionStore::new(primary.clone()).with_mirror(Arc::new(BrokenBackend));

        let err = store.login(vet(), "tok-1").await.unwrap_err();
        assert!(matches!(err, SessionError::Backend { .. }));
        assert!(!store.is_authenticated().await);
        assert!(primary.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_clears_memory_even_when_a_backend_fails() {
        let primary = Arc::new(MemoryBackend::new());
        let store = SessionStore::new(primary.clone()).with_mirror(Arc::new(BrokenBackend));
        // Seed memory directly; the broken mirror would refuse a login.
        store.state.write().await.user = Some(vet());
        store.state.write().await.access_token = Some(SecretString::from("tok"));

        assert!(store.logout().await.is_err());
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn onboarding_updates_persist_and_ignore_signed_out() {
        let (store, primary, cookies) = store();
        store
            .update_onboarding_step(OnboardingStep::CompanyInfo)
            .await
            .unwrap();
        assert!(store.current_user().await.is_none());

        store.login(vet(), "tok-1").await.unwrap();
        store
            .record_onboarding_progress(
                OnboardingSteps::through(OnboardingStep::PersonalInfo),
                OnboardingStep::CompanyInfo,
            )
            .await
            .unwrap();

        let saved = primary.load().await.unwrap().unwrap().user;
        assert_eq!(saved.onboarding_step, Some(OnboardingStep::CompanyInfo));
        assert!(saved.steps.unwrap().personal_info);
        assert_eq!(
            cookies.session().await.user.unwrap().onboarding_step,
            Some(OnboardingStep::CompanyInfo)
        );
    }

    #[tokio::test]
    async fn set_access_token_rewrites_backends() {
        let (store, primary, _) = store();
        store.set_access_token("ignored").await.unwrap();
        assert!(primary.load().await.unwrap().is_none());

        store.login(vet(), "tok-1").await.unwrap();
        store.set_access_token("tok-2").await.unwrap();
        assert_eq!(primary.load().await.unwrap().unwrap().access_token, "tok-2");
        assert_eq!(store.access_token().await.unwrap().expose_secret(), "tok-2");
    }

    #[tokio::test]
    async fn failed_mirror_write_restores_written_backends() {
        let primary = Arc::new(MemoryBackend::new());
        let mirror = Arc::new(FlakyBackend::allowing(1));
        let store = SessionStore::new(primary.clone()).with_mirror(mirror.clone());
        store.login(vet(), "tok-1").await.unwrap();

        let err = store
            .update_onboarding_step(OnboardingStep::CompanyInfo)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Backend { .. }));

        let step = |s: Option<PersistedSession>| s.unwrap().user.onboarding_step;
        assert_eq!(
            store.current_user().await.unwrap().onboarding_step,
            Some(OnboardingStep::PersonalInfo)
        );
        assert_eq!(step(primary.load().await.unwrap()), Some(OnboardingStep::PersonalInfo));
        assert_eq!(step(mirror.load().await.unwrap()), Some(OnboardingStep::PersonalInfo));

        assert!(store.set_access_token("tok-2").await.is_err());
        assert_eq!(primary.load().await.unwrap().unwrap().access_token, "tok-1");
        assert_eq!(store.access_token().await.unwrap().expose_secret(), "tok-1");
    }

    #[tokio::test]
    async fn hydrate_restores_and_resyncs() {
        let primary = Arc::new(MemoryBackend::new());
        let cookies = Arc::new(CookieBackend::default());
        primary
            .save(&PersistedSession {
                access_token: "tok-1".into(),
                user: vet(),
            })
            .await
            .unwrap();

        let store = SessionStore::new(primary.clone()).with_mirror(cookies.clone());
        assert!(!store.is_hydrated().await);

        let snapshot = store.hydrate().await;
        assert!(snapshot.is_hydrated);
        assert!(snapshot.is_authenticated());
        assert!(cookies.session().await.is_authenticated(), "mirror re-synced");
    }

    #[tokio::test]
    async fn hydrate_with_nothing_stored() {
        let (store, _, _) = store();
        let snapshot = store.hydrate().await;
        assert!(snapshot.is_hydrated);
        assert!(!snapshot.is_authenticated());
    }
}
