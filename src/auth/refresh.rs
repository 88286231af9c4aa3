// Session refresh logic

use super::credentials::{self, TokenStore};
use super::types::RefreshOutcome;
use crate::error::AuthError;
use crate::http_client::AuthHttpClient;

/// Try to resume the stored session
///
/// Reads the stored credentials before any request is made. Without a
/// refresh token nothing is sent. Never touches state or store.
pub async fn refresh_session(client: &AuthHttpClient, store: &dyn TokenStore) -> RefreshOutcome {
    let creds = match credentials::load_session_credentials(store) {
        Ok(Some(creds)) => creds,
        Ok(None) => {
            tracing::debug!("No refresh token stored");
            return RefreshOutcome::NoSession;
        }
        Err(e) => {
            tracing::warn!("Failed to read stored credentials, assuming no session: {}", e);
            return RefreshOutcome::NoSession;
        }
    };

    tracing::debug!(
        has_access_token = creds.access_token.is_some(),
        "Refreshing session..."
    );

    match client
        .refresh(creds.access_token.as_deref(), &creds.refresh_token)
        .await
    {
        Ok(response) => RefreshOutcome::Authenticated {
            user: response.user,
            token: response.token,
        },
        Err(AuthError::Rejected { status, message }) => {
            tracing::info!("Session refresh rejected: {} - {}", status, message);
            RefreshOutcome::Rejected(message)
        }
        Err(e) => {
            tracing::warn!("Session refresh failed: {}", e);
            RefreshOutcome::TransportFailure(e.to_string())
        }
    }
}
