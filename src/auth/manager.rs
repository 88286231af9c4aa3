use std::sync::Arc;

use super::credentials::{self, TokenStore};
use super::refresh;
use super::state::{AuthState, AuthStateHandle};
use super::types::{AuthStatus, RefreshOutcome, User};
use crate::error::AuthError;
use crate::http_client::AuthHttpClient;

/// Authentication session manager
/// Mediates between the backend, the durable token store and observable state
pub struct AuthSessionManager {
    /// Transport for login and refresh requests
    client: AuthHttpClient,

    /// Durable store for the access/refresh token pair
    store: Arc<dyn TokenStore>,

    /// Current user and status
    state: AuthState,
}

impl AuthSessionManager {
    /// Create a new manager in the `Checking` status
    /// No I/O happens here; call [`initialize`](Self::initialize) to resume a stored session
    pub fn new(client: AuthHttpClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            store,
            state: AuthState::new(),
        }
    }

    /// Run the initial status check
    pub async fn initialize(&self) -> bool {
        tracing::info!("Checking stored session...");
        let authenticated = self.check_auth_status().await;
        tracing::info!("Initial session check settled: {}", self.auth_status());
        authenticated
    }

    /// Read-only handle for observers
    pub fn subscribe(&self) -> AuthStateHandle {
        self.state.subscribe()
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.state.status()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.current_user()
    }

    /// Sign in with email and password
    ///
    /// On rejection the backend's own error detail is returned and neither
    /// state nor store is touched.
    pub async fn login(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        tracing::debug!("Signing in...");

        match self.client.login(email, password).await {
            Ok(response) => Ok(self.establish_session(response.user, &response.token)),
            Err(e) => {
                tracing::warn!("Sign in failed: {}", e);
                Err(e)
            }
        }
    }

    /// Try to resume the stored session; `false` on any failure
    pub async fn check_auth_status(&self) -> bool {
        self.check_auth_status_detailed().await.is_authenticated()
    }

    /// Same as [`check_auth_status`](Self::check_auth_status) but reports why
    ///
    /// A failed refresh drops the status to `NotAuthenticated` but leaves the
    /// stored tokens in place; only a missing refresh token triggers a full
    /// logout.
    pub async fn check_auth_status_detailed(&self) -> RefreshOutcome {
        let outcome = refresh::refresh_session(&self.client, self.store.as_ref()).await;

        match &outcome {
            RefreshOutcome::Authenticated { user, token } => {
                self.establish_session(user.clone(), token);
            }
            RefreshOutcome::NoSession => self.logout(),
            RefreshOutcome::Rejected(_) | RefreshOutcome::TransportFailure(_) => {
                self.state.mark_not_authenticated();
            }
        }

        outcome
    }

    /// Drop the session locally; never contacts the backend
    pub fn logout(&self) {
        if let Err(e) = credentials::clear_session_credentials(self.store.as_ref()) {
            tracing::error!("Failed to clear stored credentials: {}", e);
        }
        self.state.clear();
        tracing::info!("Session cleared");
    }

    fn establish_session(&self, user: User, token: &str) -> bool {
        let refresh_token = user.refresh_token.clone();
        self.state.set_authenticated(user);

        if let Err(e) =
            credentials::store_session_credentials(self.store.as_ref(), token, &refresh_token)
        {
            tracing::error!("Failed to persist session credentials: {}", e);
        }

        tracing::info!("Session established");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::{MemoryTokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
    use proptest::prelude::*;
    use serde_json::Map;

    fn offline_manager(store: Arc<MemoryTokenStore>) -> AuthSessionManager {
        let client = AuthHttpClient::new("http://127.0.0.1:9", 1, 1).unwrap();
        AuthSessionManager::new(client, store)
    }

    fn user(refresh_token: &str) -> User {
        User {
            refresh_token: refresh_token.to_string(),
            profile: Map::new(),
        }
    }

    #[test]
    fn test_new_is_checking() {
        let manager = offline_manager(Arc::new(MemoryTokenStore::new()));
        assert_eq!(manager.auth_status(), AuthStatus::Checking);
        assert!(manager.current_user().is_none());
    }

    #[test]
    fn test_establish_session_writes_both_tokens() {
        let store = Arc::new(MemoryTokenStore::new());
        let manager = offline_manager(store.clone());

        assert!(manager.establish_session(user("r-1"), "a-1"));
        assert_eq!(manager.auth_status(), AuthStatus::Authenticated);
        assert_eq!(manager.current_user(), Some(user("r-1")));
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("a-1"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("r-1"));
    }

    #[test]
    fn test_logout_clears_everything() {
        let store = Arc::new(MemoryTokenStore::new());
        let manager = offline_manager(store.clone());
        manager.establish_session(user("r-1"), "a-1");

        manager.logout();
        assert_eq!(manager.auth_status(), AuthStatus::NotAuthenticated);
        assert!(manager.current_user().is_none());
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_initialize_without_session_logs_out() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(ACCESS_TOKEN_KEY, "stale").unwrap();
        let manager = offline_manager(store.clone());

        assert!(!manager.initialize().await);
        assert_eq!(manager.auth_status(), AuthStatus::NotAuthenticated);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_user_and_tokens() {
        let store = Arc::new(MemoryTokenStore::new());
        let manager = offline_manager(store.clone());
        manager.establish_session(user("r-1"), "a-1");

        let outcome = manager.check_auth_status_detailed().await;
        assert!(matches!(outcome, RefreshOutcome::TransportFailure(_)));
        assert_eq!(manager.auth_status(), AuthStatus::NotAuthenticated);
        assert_eq!(manager.current_user(), Some(user("r-1")));
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("a-1"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("r-1"));
    }

    proptest! {
        #[test]
        fn prop_logout_is_idempotent(
            access in proptest::option::of("[a-z0-9]{0,16}"),
            refresh in proptest::option::of("[a-z0-9]{0,16}"),
            authenticated in any::<bool>(),
        ) {
            let store = Arc::new(MemoryTokenStore::new());
            if let Some(access) = &access {
                store.set(ACCESS_TOKEN_KEY, access).unwrap();
            }
            if let Some(refresh) = &refresh {
                store.set(REFRESH_TOKEN_KEY, refresh).unwrap();
            }
            let manager = offline_manager(store.clone());
            if authenticated {
                manager.establish_session(user("r-x"), "a-x");
            }

            manager.logout();
            let once = (
                manager.subscribe().snapshot(),
                store.get(ACCESS_TOKEN_KEY).unwrap(),
                store.get(REFRESH_TOKEN_KEY).unwrap(),
            );

            manager.logout();
            let twice = (
                manager.subscribe().snapshot(),
                store.get(ACCESS_TOKEN_KEY).unwrap(),
                store.get(REFRESH_TOKEN_KEY).unwrap(),
            );

            prop_assert_eq!(once, twice);
        }
    }
}
