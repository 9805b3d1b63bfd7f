// Session/identity holder: the single writer of the token and identity snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::domain::{
    Identity, IdentityUpdate, KeyValueStore, LoginRequest, PortalApi, RegistrationRequest, Route,
    Session, StorageError,
};

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the serialized identity snapshot.
pub const IDENTITY_KEY: &str = "user";
/// Grace period before the in-memory identity is dropped on logout, so views
/// that still read it can unmount first.
pub const IDENTITY_CLEAR_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success(Identity),
    Failure(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Success,
    Failure(String),
}

pub struct SessionHolder {
    api: Arc<dyn PortalApi>,
    store: Arc<dyn KeyValueStore>,
    session: Arc<RwLock<Option<Session>>>,
    // Bumped on every sign-in so a pending delayed clear never wipes a newer session.
    generation: Arc<AtomicU64>,
    clear_delay: Duration,
}

impl SessionHolder {
    /// Rehydrates the persisted session (if any) and primes the API client.
    pub fn restore(api: Arc<dyn PortalApi>, store: Arc<dyn KeyValueStore>) -> Self {
        let restored = restore_session(store.as_ref());
        api.set_bearer(restored.as_ref().map(|session| session.token.clone()));

        match &restored {
            Some(session) => tracing::info!(email = %session.identity.email, "session restored."),
            None => tracing::debug!("no persisted session."),
        }

        Self {
            api,
            store,
            session: Arc::new(RwLock::new(restored)),
            generation: Arc::new(AtomicU64::new(0)),
            clear_delay: IDENTITY_CLEAR_DELAY,
        }
    }

    pub fn with_clear_delay(mut self, delay: Duration) -> Self {
        self.clear_delay = delay;
        self
    }

    pub fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session().map(|session| session.identity)
    }

    pub fn token(&self) -> Option<String> {
        self.session().map(|session| session.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    #[tracing::instrument(name = "login", skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = match self.api.login(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "login rejected.");
                return LoginOutcome::Failure(err.user_message("Login failed"));
            }
        };

        let token = response.access_token.filter(|token| !token.is_empty());
        let (Some(token), Some(identity)) = (token, response.user) else {
            tracing::warn!("login response carried no access token.");
            return LoginOutcome::Failure("No access token".to_string());
        };

        if let Err(err) = persist(self.store.as_ref(), &token, &identity) {
            // The session still works for this run; it just will not survive a reload.
            tracing::error!(error = %err, "failed to persist session.");
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        self.api.set_bearer(Some(token.clone()));
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(Session {
            token,
            identity: identity.clone(),
        });

        tracing::info!(role = ?identity.role(), "login succeeded.");
        LoginOutcome::Success(identity)
    }

    /// Forwards the registration; never signs the account in.
    #[tracing::instrument(name = "register", skip_all, fields(email = %form.email))]
    pub async fn register(&self, form: RegistrationRequest) -> RegisterOutcome {
        match self.api.register(form).await {
            Ok(()) => {
                tracing::info!("registration accepted.");
                RegisterOutcome::Success
            }
            Err(err) => {
                tracing::warn!(error = %err, "registration rejected.");
                RegisterOutcome::Failure(err.user_message("Registration failed"))
            }
        }
    }

    /// Drops persisted state and the auth header now, the in-memory session
    /// shortly after. Returns where the caller should navigate.
    pub fn logout(&self) -> Route {
        if let Err(err) = clear_persisted(self.store.as_ref()) {
            tracing::error!(error = %err, "failed to clear persisted session.");
        }
        self.api.set_bearer(None);

        let session = Arc::clone(&self.session);
        let generation = Arc::clone(&self.generation);
        let issued_at = generation.load(Ordering::SeqCst);
        let delay = self.clear_delay;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) if !delay.is_zero() => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if generation.load(Ordering::SeqCst) == issued_at {
                        *session.write().unwrap_or_else(PoisonError::into_inner) = None;
                    }
                });
            }
            _ => {
                *session.write().unwrap_or_else(PoisonError::into_inner) = None;
            }
        }

        tracing::info!("logged out.");
        Route::Home
    }

    /// Merges a profile edit into the identity and re-persists it.
    pub fn update_identity(&self, update: IdentityUpdate) -> Option<Identity> {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        let session = guard.as_mut()?;
        session.identity.apply(update);

        if let Err(err) = persist(self.store.as_ref(), &session.token, &session.identity) {
            tracing::error!(error = %err, "failed to persist updated identity.");
        }

        Some(session.identity.clone())
    }
}

fn restore_session(store: &dyn KeyValueStore) -> Option<Session> {
    let token = read_key(store, TOKEN_KEY);
    let raw_identity = read_key(store, IDENTITY_KEY);

    match (token, raw_identity) {
        (Some(token), Some(raw_identity)) => match serde_json::from_str::<Identity>(&raw_identity) {
            Ok(identity) => Some(Session { token, identity }),
            Err(err) => {
                tracing::warn!(error = %err, "persisted identity is unreadable; dropping session.");
                discard(store);
                None
            }
        },
        (None, None) => None,
        _ => {
            // Half a session is no session.
            tracing::warn!("persisted session is incomplete; dropping it.");
            discard(store);
            None
        }
    }
}

fn read_key(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value.filter(|value| !value.is_empty()),
        Err(err) => {
            tracing::warn!(error = %err, key, "failed to read persisted session.");
            None
        }
    }
}

fn discard(store: &dyn KeyValueStore) {
    if let Err(err) = clear_persisted(store) {
        tracing::error!(error = %err, "failed to clear persisted session.");
    }
}

fn persist(store: &dyn KeyValueStore, token: &str, identity: &Identity) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(identity)?;
    store.set(TOKEN_KEY, token)?;
    store.set(IDENTITY_KEY, &encoded)
}

fn clear_persisted(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    store.remove(TOKEN_KEY)?;
    store.remove(IDENTITY_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiError, LoginResponse};
    use crate::use_cases::test_support::{FakeApi, MemoryStore, identity};

    fn holder(api: Arc<FakeApi>, store: Arc<MemoryStore>) -> SessionHolder {
        SessionHolder::restore(api, store)
    }

    #[tokio::test]
    async fn when_login_succeeds_then_token_and_identity_are_stored_and_attached() {
        let api = Arc::new(FakeApi::accepting_login("tok-1", identity("Asha", "USER")));
        let store = Arc::new(MemoryStore::default());
        let holder = holder(api.clone(), store.clone());

        let outcome = holder.login("asha@example.com", "secret1").await;

        let LoginOutcome::Success(identity) = outcome else {
            panic!("expected login to succeed");
        };
        assert_eq!(identity.name, "Asha");
        assert_eq!(holder.token().as_deref(), Some("tok-1"));
        assert_eq!(api.bearer().as_deref(), Some("tok-1"));
        assert_eq!(store.snapshot(TOKEN_KEY).as_deref(), Some("tok-1"));

        let persisted: Identity = serde_json::from_str(
            &store.snapshot(IDENTITY_KEY).expect("expected identity to be persisted"),
        )
        .expect("expected persisted identity to parse");
        assert_eq!(persisted.name, "Asha");
    }

    #[tokio::test]
    async fn when_login_is_rejected_then_returns_backend_message_and_stays_logged_out() {
        let api = Arc::new(FakeApi::default());
        FakeApi::set(
            &api.login,
            Err(ApiError::Upstream {
                status: 401,
                message: Some("Invalid email or password".to_string()),
            }),
        );
        let holder = holder(api.clone(), Arc::new(MemoryStore::default()));

        let outcome = holder.login("asha@example.com", "nope").await;

        assert_eq!(
            outcome,
            LoginOutcome::Failure("Invalid email or password".to_string())
        );
        assert!(!holder.is_authenticated());
        assert!(api.bearer().is_none());
    }

    #[tokio::test]
    async fn when_login_response_has_no_token_then_fails_with_no_access_token() {
        let api = Arc::new(FakeApi::default());
        FakeApi::set(
            &api.login,
            Ok(LoginResponse {
                access_token: None,
                user: Some(identity("Asha", "USER")),
            }),
        );
        let holder = holder(api, Arc::new(MemoryStore::default()));

        let outcome = holder.login("asha@example.com", "secret1").await;

        assert_eq!(outcome, LoginOutcome::Failure("No access token".to_string()));
        assert!(holder.session().is_none());
    }

    #[tokio::test]
    async fn when_transport_fails_then_login_falls_back_to_generic_message() {
        let api = Arc::new(FakeApi::default());
        FakeApi::set(&api.login, Err(ApiError::Transport("refused".to_string())));
        let holder = holder(api, Arc::new(MemoryStore::default()));

        let outcome = holder.login("asha@example.com", "secret1").await;

        assert_eq!(outcome, LoginOutcome::Failure("Login failed".to_string()));
    }

    #[test]
    fn when_persisted_pair_is_valid_then_restore_rehydrates_and_sets_bearer() {
        let snapshot = serde_json::to_string(&identity("Ravi", "ROLE_ADMIN")).expect("encode");
        let store = Arc::new(MemoryStore::seeded(&[
            (TOKEN_KEY, "tok-9"),
            (IDENTITY_KEY, snapshot.as_str()),
        ]));
        let api = Arc::new(FakeApi::default());

        let holder = holder(api.clone(), store);

        assert_eq!(holder.identity().map(|identity| identity.name), Some("Ravi".to_string()));
        assert_eq!(api.bearer().as_deref(), Some("tok-9"));
    }

    #[test]
    fn when_persisted_identity_is_invalid_then_starts_logged_out_and_drops_both_keys() {
        let store = Arc::new(MemoryStore::seeded(&[
            (TOKEN_KEY, "tok-9"),
            (IDENTITY_KEY, "{not json"),
        ]));
        let api = Arc::new(FakeApi::default());

        let holder = holder(api.clone(), store.clone());

        assert!(!holder.is_authenticated());
        assert!(api.bearer().is_none());
        assert!(store.snapshot(TOKEN_KEY).is_none());
        assert!(store.snapshot(IDENTITY_KEY).is_none());
    }

    #[test]
    fn when_only_the_token_is_persisted_then_it_is_discarded() {
        let store = Arc::new(MemoryStore::seeded(&[(TOKEN_KEY, "tok-9")]));

        let holder = holder(Arc::new(FakeApi::default()), store.clone());

        assert!(!holder.is_authenticated());
        assert!(store.snapshot(TOKEN_KEY).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn when_logging_out_then_persisted_state_clears_now_and_identity_shortly_after() {
        let api = Arc::new(FakeApi::accepting_login("tok-1", identity("Asha", "USER")));
        let store = Arc::new(MemoryStore::default());
        let holder = holder(api.clone(), store.clone());
        holder.login("asha@example.com", "secret1").await;

        let destination = holder.logout();

        assert_eq!(destination, Route::Home);
        assert!(store.snapshot(TOKEN_KEY).is_none());
        assert!(store.snapshot(IDENTITY_KEY).is_none());
        assert!(api.bearer().is_none());
        // Still readable while dependent views unmount.
        assert!(holder.is_authenticated());

        tokio::time::sleep(IDENTITY_CLEAR_DELAY * 2).await;

        assert!(!holder.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn when_signing_in_again_before_delayed_clear_then_new_session_survives() {
        let api = Arc::new(FakeApi::accepting_login("tok-1", identity("Asha", "USER")));
        let holder = holder(api, Arc::new(MemoryStore::default()));
        holder.login("asha@example.com", "secret1").await;

        holder.logout();
        holder.login("asha@example.com", "secret1").await;
        tokio::time::sleep(IDENTITY_CLEAR_DELAY * 2).await;

        assert!(holder.is_authenticated());
    }

    #[tokio::test]
    async fn when_identity_is_updated_then_snapshot_is_merged_and_persisted() {
        let api = Arc::new(FakeApi::accepting_login("tok-1", identity("Asha", "USER")));
        let store = Arc::new(MemoryStore::default());
        let holder = holder(api, store.clone());
        holder.login("asha@example.com", "secret1").await;

        let updated = holder
            .update_identity(IdentityUpdate {
                address: Some("9 River Rd".to_string()),
                ..IdentityUpdate::default()
            })
            .expect("expected an active session");

        assert_eq!(updated.address.as_deref(), Some("9 River Rd"));
        let persisted = store.snapshot(IDENTITY_KEY).expect("expected persisted identity");
        assert!(persisted.contains("9 River Rd"));
    }

    #[test]
    fn when_no_session_exists_then_update_identity_is_a_no_op() {
        let holder = holder(Arc::new(FakeApi::default()), Arc::new(MemoryStore::default()));

        assert!(holder.update_identity(IdentityUpdate::default()).is_none());
    }

    #[tokio::test]
    async fn when_registration_fails_then_returns_backend_text() {
        let api = Arc::new(FakeApi::default());
        FakeApi::set(
            &api.register,
            Err(ApiError::Upstream {
                status: 400,
                message: Some("Email is already taken!".to_string()),
            }),
        );
        let holder = holder(api.clone(), Arc::new(MemoryStore::default()));

        let outcome = holder.register(RegistrationRequest::default()).await;

        assert_eq!(
            outcome,
            RegisterOutcome::Failure("Email is already taken!".to_string())
        );
        assert!(!holder.is_authenticated());
        assert_eq!(api.calls(), vec!["register"]);
    }
}
