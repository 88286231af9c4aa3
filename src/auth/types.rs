// Authentication types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identity record returned by the backend
///
/// Only `refreshToken` is interpreted; every other field is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub refresh_token: String,

    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl User {
    /// Look up a profile field by its backend name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.profile.get(field)
    }

    /// The user's email, when the backend sends one
    pub fn email(&self) -> Option<&str> {
        self.get("email").and_then(Value::as_str)
    }
}

/// Whether the session is still being determined, established, or absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthStatus {
    Checking,
    Authenticated,
    NotAuthenticated,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStatus::Checking => "checking",
            AuthStatus::Authenticated => "authenticated",
            AuthStatus::NotAuthenticated => "notAuthenticated",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login request body
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Login and refresh response
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Persisted credential pair
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCredentials {
    pub access_token: Option<String>,
    pub refresh_token: String,
}

/// Detailed result of a status check
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Backend issued a fresh session
    Authenticated { user: User, token: String },
    /// No refresh token stored, nothing was sent
    NoSession,
    /// Backend rejected the refresh token
    Rejected(String),
    /// Backend could not be reached or answered garbage
    TransportFailure(String),
}

impl RefreshOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, RefreshOutcome::Authenticated { .. })
    }
}
