use std::sync::{Arc, Mutex as StdMutex, Weak};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::auth::credentials::{TokenKey, TokenStore};
use crate::models::UserProfile;

/// Interval between background token refreshes.
/// A policy constant assumed shorter than the access token's real
/// lifetime; the token's own expiry claim is never consulted.
const REFRESH_INTERVAL: Duration = Duration::from_secs(4 * 60);

/// The remote endpoints the session lifecycle depends on.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange a refresh token for a new access token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ApiError>;

    /// Fetch the profile of the user the access token belongs to.
    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, ApiError>;
}

/// In-memory authentication state for the current user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }
}

/// Owns the authentication session and guarantees consumers a currently
/// valid access token.
///
/// The manager is the single writer of the session; screens read a
/// snapshot via [`SessionManager::session`] and obtain tokens through
/// [`SessionManager::valid_access_token`]. A background task renews the
/// access token on a fixed interval while a refresh token exists.
///
/// Clone is cheap - clones share the same session and renewal task.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    session: Mutex<Session>,
    renewal: StdMutex<Option<JoinHandle<()>>>,
    refresh_interval: Duration,
}

impl Inner {
    /// Reset all three session fields and delete both persisted secrets.
    /// Partial sessions are disallowed, so this is the only clear path.
    fn clear(&self, session: &mut Session) -> Result<()> {
        session.user = None;
        session.access_token = None;
        session.refresh_token = None;
        self.store.delete(TokenKey::Access)?;
        self.store.delete(TokenKey::Refresh)?;
        Ok(())
    }

    fn renewal_slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.renewal.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Guaranteed-on-teardown cancellation of the renewal timer
        if let Ok(slot) = self.renewal.get_mut() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

impl SessionManager {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        Self::with_refresh_interval(api, store, REFRESH_INTERVAL)
    }

    /// Like [`SessionManager::new`] with a custom renewal interval.
    pub fn with_refresh_interval(
        api: Arc<dyn AuthApi>,
        store: Arc<dyn TokenStore>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                session: Mutex::new(Session::default()),
                renewal: StdMutex::new(None),
                refresh_interval,
            }),
        }
    }

    /// Restore a persisted session on startup.
    ///
    /// Reads both tokens from the store. If an access token is present
    /// the user profile is fetched with it; a failed fetch leaves the
    /// profile absent but keeps the tokens. Schedules background renewal
    /// when a refresh token was restored.
    pub async fn restore(&self) -> Result<()> {
        let access = self.inner.store.get(TokenKey::Access)?;
        let refresh = self.inner.store.get(TokenKey::Refresh)?;
        let schedule = refresh.is_some();
        {
            let mut session = self.inner.session.lock().await;
            session.access_token = access.clone();
            session.refresh_token = refresh;
            session.user = None;
            if let Some(token) = access {
                match self.inner.api.fetch_profile(&token).await {
                    Ok(profile) => {
                        info!(email = %profile.email, "session restored");
                        session.user = Some(profile);
                    }
                    Err(e) => {
                        warn!(error = %e, "could not fetch profile for restored session");
                    }
                }
            }
        }
        if schedule {
            self.schedule_renewal();
        }
        Ok(())
    }

    /// Establish a session from a successful login exchange and persist
    /// both tokens. (Re)schedules background renewal.
    pub async fn login(&self, user: UserProfile, access: String, refresh: String) -> Result<()> {
        self.inner.store.save(TokenKey::Access, &access)?;
        self.inner.store.save(TokenKey::Refresh, &refresh)?;
        {
            let mut session = self.inner.session.lock().await;
            session.user = Some(user);
            session.access_token = Some(access);
            session.refresh_token = Some(refresh);
        }
        self.schedule_renewal();
        Ok(())
    }

    /// Clear the session and delete both persisted tokens.
    /// Idempotent - safe to call when already logged out.
    pub async fn logout(&self) -> Result<()> {
        self.cancel_renewal();
        let mut session = self.inner.session.lock().await;
        self.inner.clear(&mut session)
    }

    /// Return a currently valid access token, or `None` when logged out.
    ///
    /// When only a refresh token remains, one refresh exchange is
    /// attempted. A failed exchange - network failure or rejection alike -
    /// clears the whole session before returning `None`.
    pub async fn valid_access_token(&self) -> Option<String> {
        let mut session = self.inner.session.lock().await;
        if let Some(token) = &session.access_token {
            return Some(token.clone());
        }
        let refresh = session.refresh_token.clone()?;
        match self.inner.api.refresh_access_token(&refresh).await {
            Ok(access) => {
                session.access_token = Some(access.clone());
                if let Err(e) = self.inner.store.save(TokenKey::Access, &access) {
                    warn!(error = %e, "failed to persist refreshed access token");
                }
                Some(access)
            }
            Err(e) => {
                warn!(error = %e, "refresh exchange failed, clearing session");
                self.cancel_renewal();
                if let Err(e) = self.inner.clear(&mut session) {
                    warn!(error = %e, "failed to delete persisted tokens");
                }
                None
            }
        }
    }

    /// Snapshot of the current session state.
    pub async fn session(&self) -> Session {
        self.inner.session.lock().await.clone()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.session.lock().await.user.clone()
    }

    /// Arm the renewal timer, replacing any previously armed one so a
    /// stale timer can never fire after the refresh token has changed.
    fn schedule_renewal(&self) {
        self.cancel_renewal();
        let weak = Arc::downgrade(&self.inner);
        let interval = self.inner.refresh_interval;
        let handle = tokio::spawn(renewal_loop(weak, interval));
        *self.inner.renewal_slot() = Some(handle);
    }

    fn cancel_renewal(&self) {
        if let Some(handle) = self.inner.renewal_slot().take() {
            handle.abort();
        }
    }
}

/// Background renewal: sleep one interval, exchange the refresh token,
/// rearm on success. Any failure clears the whole session and ends the
/// task - one-shot policy, no retry or backoff.
async fn renewal_loop(weak: Weak<Inner>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let refresh = { inner.session.lock().await.refresh_token.clone() };
        let Some(refresh) = refresh else {
            // No refresh token means no renewal may run
            return;
        };
        match inner.api.refresh_access_token(&refresh).await {
            Ok(access) => {
                let mut session = inner.session.lock().await;
                session.access_token = Some(access.clone());
                if let Err(e) = inner.store.save(TokenKey::Access, &access) {
                    warn!(error = %e, "failed to persist refreshed access token");
                }
                debug!("access token renewed");
            }
            Err(e) => {
                warn!(error = %e, "background refresh failed, clearing session");
                let mut session = inner.session.lock().await;
                if let Err(e) = inner.clear(&mut session) {
                    warn!(error = %e, "failed to delete persisted tokens");
                }
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use reqwest::StatusCode;

    use super::*;
    use crate::auth::credentials::MemoryStore;
    use crate::models::UserType;

    struct MockAuthApi {
        refresh_calls: AtomicUsize,
        profile_calls: AtomicUsize,
        refresh_ok: AtomicBool,
        profile_ok: AtomicBool,
    }

    impl MockAuthApi {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                refresh_calls: AtomicUsize::new(0),
                profile_calls: AtomicUsize::new(0),
                refresh_ok: AtomicBool::new(true),
                profile_ok: AtomicBool::new(true),
            })
        }

        fn refresh_calls(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuthApi for MockAuthApi {
        async fn refresh_access_token(&self, _refresh_token: &str) -> Result<String, ApiError> {
            let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.refresh_ok.load(Ordering::SeqCst) {
                Ok(format!("access-{n}"))
            } else {
                Err(ApiError::Unauthorized)
            }
        }

        async fn fetch_profile(&self, _access_token: &str) -> Result<UserProfile, ApiError> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            if self.profile_ok.load(Ordering::SeqCst) {
                Ok(test_profile())
            } else {
                Err(ApiError::Rejected {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    detail: "down for maintenance".to_string(),
                })
            }
        }
    }

    fn test_profile() -> UserProfile {
        UserProfile {
            email: "a@b.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            contact_number: String::new(),
            user_type: UserType::User,
        }
    }

    fn manager(api: Arc<MockAuthApi>, store: Arc<MemoryStore>) -> SessionManager {
        // One minute keeps paused-clock tests readable
        SessionManager::with_refresh_interval(api, store, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_login_persists_both_tokens() {
        let api = MockAuthApi::new();
        let store = Arc::new(MemoryStore::new());
        let mgr = manager(api, store.clone());

        mgr.login(test_profile(), "A1".into(), "R1".into())
            .await
            .unwrap();

        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("A1"));
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("R1"));
        let session = mgr.session().await;
        assert_eq!(session.access_token.as_deref(), Some("A1"));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_then_valid_token_makes_no_network_call() {
        let api = MockAuthApi::new();
        let store = Arc::new(MemoryStore::new());
        let mgr = manager(api.clone(), store);

        mgr.login(test_profile(), "A1".into(), "R1".into())
            .await
            .unwrap();
        mgr.logout().await.unwrap();

        assert_eq!(mgr.valid_access_token().await, None);
        assert_eq!(api.refresh_calls(), 0);
        assert!(!mgr.session().await.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let api = MockAuthApi::new();
        let store = Arc::new(MemoryStore::new());
        let mgr = manager(api, store);

        mgr.logout().await.unwrap();
        mgr.logout().await.unwrap();
        assert!(mgr.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_on_demand_when_access_token_missing() {
        let api = MockAuthApi::new();
        let store = Arc::new(MemoryStore::new());
        store.save(TokenKey::Refresh, "R1").unwrap();
        let mgr = manager(api.clone(), store.clone());
        mgr.restore().await.unwrap();

        let token = mgr.valid_access_token().await;
        assert_eq!(token.as_deref(), Some("access-1"));
        assert_eq!(api.refresh_calls(), 1);
        // New access token persisted as well as returned
        assert_eq!(
            store.get(TokenKey::Access).unwrap().as_deref(),
            Some("access-1")
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session_exactly_once() {
        let api = MockAuthApi::new();
        api.refresh_ok.store(false, Ordering::SeqCst);
        let store = Arc::new(MemoryStore::new());
        store.save(TokenKey::Refresh, "R1").unwrap();
        let mgr = manager(api.clone(), store.clone());
        mgr.restore().await.unwrap();

        assert_eq!(mgr.valid_access_token().await, None);
        assert_eq!(api.refresh_calls(), 1);
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
        assert_eq!(store.get(TokenKey::Refresh).unwrap(), None);
        assert!(!mgr.session().await.is_authenticated());

        // Refresh token is gone, so no second exchange is attempted
        assert_eq!(mgr.valid_access_token().await, None);
        assert_eq!(api.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_restore_keeps_tokens_when_profile_fetch_fails() {
        let api = MockAuthApi::new();
        api.profile_ok.store(false, Ordering::SeqCst);
        let store = Arc::new(MemoryStore::new());
        store.save(TokenKey::Access, "A1").unwrap();
        store.save(TokenKey::Refresh, "R1").unwrap();
        let mgr = manager(api, store.clone());

        mgr.restore().await.unwrap();

        let session = mgr.session().await;
        assert!(session.user.is_none());
        assert_eq!(session.access_token.as_deref(), Some("A1"));
        assert_eq!(session.refresh_token.as_deref(), Some("R1"));
        // Persisted copies untouched
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn test_restore_fetches_profile() {
        let api = MockAuthApi::new();
        let store = Arc::new(MemoryStore::new());
        store.save(TokenKey::Access, "A1").unwrap();
        let mgr = manager(api.clone(), store);

        mgr.restore().await.unwrap();

        let user = mgr.current_user().await.expect("profile restored");
        assert_eq!(user.email, "a@b.com");
        assert_eq!(api.profile_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_arms_renewal_timer() {
        let api = MockAuthApi::new();
        let store = Arc::new(MemoryStore::new());
        store.save(TokenKey::Refresh, "R1").unwrap();
        let mgr = manager(api.clone(), store.clone());
        mgr.restore().await.unwrap();

        // A restored refresh token is enough to arm the timer
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(api.refresh_calls(), 1);
        assert_eq!(
            store.get(TokenKey::Access).unwrap().as_deref(),
            Some("access-1")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_without_tokens_arms_nothing() {
        let api = MockAuthApi::new();
        let store = Arc::new(MemoryStore::new());
        let mgr = manager(api.clone(), store);
        mgr.restore().await.unwrap();

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(api.refresh_calls(), 0);
        assert!(!mgr.session().await.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_renewal_rearms_on_success() {
        let api = MockAuthApi::new();
        let store = Arc::new(MemoryStore::new());
        let mgr = manager(api.clone(), store.clone());
        mgr.login(test_profile(), "A1".into(), "R1".into())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(api.refresh_calls(), 1);
        assert_eq!(
            mgr.session().await.access_token.as_deref(),
            Some("access-1")
        );
        assert_eq!(
            store.get(TokenKey::Access).unwrap().as_deref(),
            Some("access-1")
        );

        // Timer rearmed after success: exactly one more fire per interval
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.refresh_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_renewal_failure_logs_out() {
        let api = MockAuthApi::new();
        api.refresh_ok.store(false, Ordering::SeqCst);
        let store = Arc::new(MemoryStore::new());
        let mgr = manager(api.clone(), store.clone());
        mgr.login(test_profile(), "A1".into(), "R1".into())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(api.refresh_calls(), 1);
        assert!(!mgr.session().await.is_authenticated());
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
        assert_eq!(store.get(TokenKey::Refresh).unwrap(), None);

        // One-shot policy: the task is gone, nothing fires again
        tokio::time::sleep(Duration::from_secs(180)).await;
        assert_eq!(api.refresh_calls(), 1);
        assert_eq!(mgr.valid_access_token().await, None);
        assert_eq!(api.refresh_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_cancels_renewal_timer() {
        let api = MockAuthApi::new();
        let store = Arc::new(MemoryStore::new());
        let mgr = manager(api.clone(), store);
        mgr.login(test_profile(), "A1".into(), "R1".into())
            .await
            .unwrap();
        mgr.logout().await.unwrap();

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(api.refresh_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_relogin_replaces_renewal_timer() {
        let api = MockAuthApi::new();
        let store = Arc::new(MemoryStore::new());
        let mgr = manager(api.clone(), store);
        mgr.login(test_profile(), "A1".into(), "R1".into())
            .await
            .unwrap();

        // Half an interval later a second login rearms from zero
        tokio::time::sleep(Duration::from_secs(30)).await;
        mgr.login(test_profile(), "A2".into(), "R2".into())
            .await
            .unwrap();

        // The old timer would have fired at t=60; the new one fires at t=90
        tokio::time::sleep(Duration::from_secs(45)).await;
        assert_eq!(api.refresh_calls(), 0);
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(api.refresh_calls(), 1);
    }
}
