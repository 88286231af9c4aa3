// Observable session state
// A single watch channel carries user and status together

use tokio::sync::watch;

use super::types::{AuthStatus, User};

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub status: AuthStatus,
}

impl AuthSnapshot {
    fn checking() -> Self {
        Self {
            user: None,
            status: AuthStatus::Checking,
        }
    }
}

/// Owned, mutable session state
///
/// Every mutation is a single send, so observers never see a user from one
/// operation paired with a status from another.
pub struct AuthState {
    tx: watch::Sender<AuthSnapshot>,
}

impl AuthState {
    /// Create state in the `Checking` status with no user
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AuthSnapshot::checking());
        Self { tx }
    }

    /// Read-only handle for observers
    pub fn subscribe(&self) -> AuthStateHandle {
        AuthStateHandle {
            rx: self.tx.subscribe(),
        }
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.tx.borrow().status
    }

    pub fn current_user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    pub(crate) fn set_authenticated(&self, user: User) {
        self.tx.send_replace(AuthSnapshot {
            user: Some(user),
            status: AuthStatus::Authenticated,
        });
    }

    pub(crate) fn clear(&self) {
        self.tx.send_replace(AuthSnapshot {
            user: None,
            status: AuthStatus::NotAuthenticated,
        });
    }

    /// Drop to `NotAuthenticated` without touching the current user
    pub(crate) fn mark_not_authenticated(&self) {
        self.tx
            .send_modify(|snapshot| snapshot.status = AuthStatus::NotAuthenticated);
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable read-only view of [`AuthState`]
#[derive(Clone)]
pub struct AuthStateHandle {
    rx: watch::Receiver<AuthSnapshot>,
}

impl AuthStateHandle {
    pub fn snapshot(&self) -> AuthSnapshot {
        self.rx.borrow().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.rx.borrow().status
    }

    pub fn current_user(&self) -> Option<User> {
        self.rx.borrow().user.clone()
    }

    /// Wait for the next mutation
    /// Returns `None` once the owning state has been dropped
    pub async fn changed(&mut self) -> Option<AuthSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the status has left `Checking`
    pub async fn settled(&mut self) -> Option<AuthStatus> {
        self.rx
            .wait_for(|snapshot| snapshot.status != AuthStatus::Checking)
            .await
            .ok()
            .map(|snapshot| snapshot.status)
    }
}
