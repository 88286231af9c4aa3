// Authentication module
// Session lifecycle, token persistence and observable auth state

mod credentials;
mod manager;
mod refresh;
mod state;
mod types;

pub use credentials::{
    clear_session_credentials, load_session_credentials, store_session_credentials,
    MemoryTokenStore, SqliteTokenStore, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
pub use manager::AuthSessionManager;
pub use state::{AuthSnapshot, AuthState, AuthStateHandle};
pub use types::{AuthResponse, AuthStatus, LoginRequest, RefreshOutcome, SessionCredentials, User};
