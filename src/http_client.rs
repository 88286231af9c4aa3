use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

use crate::auth::{AuthResponse, LoginRequest};
use crate::error::AuthError;

const LOGIN_PATH: &str = "/api/Auth/login";
const REFRESH_PATH: &str = "/api/auth/refresh";

/// HTTP transport for the auth backend
///
/// Requests are sent once; there is no retry or backoff here.
pub struct AuthHttpClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Backend base URL without trailing slash
    base_url: String,
}

impl AuthHttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, connect_timeout: u64, request_timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST credentials to the login endpoint
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let request = self
            .client
            .post(self.endpoint(LOGIN_PATH))
            .json(&LoginRequest { email, password });

        self.execute(request).await
    }

    /// Exchange a refresh token for a new session
    /// The access token goes in the bearer header and may be absent or stale
    pub async fn refresh(
        &self,
        access_token: Option<&str>,
        refresh_token: &str,
    ) -> Result<AuthResponse, AuthError> {
        let request = self
            .client
            .post(self.endpoint(REFRESH_PATH))
            .query(&[("refreshToken", refresh_token)])
            .header(
                "Authorization",
                format!("Bearer {}", access_token.unwrap_or_default()),
            );

        self.execute(request).await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<AuthResponse, AuthError> {
        let request = request
            .build()
            .map_err(|e| AuthError::Transport(format!("Failed to build request: {}", e)))?;

        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(method = %method, path = %url.path(), "Sending HTTP request");

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let error_kind = error_kind(&e);
                tracing::warn!(
                    error_kind = error_kind,
                    error = %e,
                    path = %url.path(),
                    "HTTP request error"
                );
                return Err(AuthError::Transport(format!(
                    "HTTP request failed: {} (kind: {})",
                    e, error_kind
                )));
            }
        };

        let status = response.status();
        tracing::debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                path = %url.path(),
                response_body = %error_text,
                "Backend rejected request"
            );

            let message = extract_error_detail(&error_text).unwrap_or_else(|| {
                if error_text.trim().is_empty() {
                    status.to_string()
                } else {
                    error_text
                }
            });

            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<AuthResponse>().await.map_err(|e| {
            tracing::warn!(error = %e, path = %url.path(), "Unreadable success response");
            AuthError::Transport(format!("Failed to parse response: {}", e))
        })
    }
}

/// Categorize a reqwest error for logs
fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection_failed"
    } else if e.is_request() {
        "request_error"
    } else if e.is_body() {
        "body_error"
    } else if e.is_decode() {
        "decode_error"
    } else {
        "unknown"
    }
}

/// Pull the nested `error` detail out of a backend error body
/// Strings are returned verbatim, other JSON values as serialized JSON
pub fn extract_error_detail(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    match json.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
