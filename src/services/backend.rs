//! Ports onto the hosted auth/database service.
//!
//! Handlers only talk to these traits; [`super::supabase::SupabaseClient`] is
//! the HTTP adapter used in production and tests swap in in-memory fakes.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    trip::Trip,
    user::{AuthOutcome, AuthSession, Credentials, User},
};

/// Auth failures the app reacts to differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidCredentials,
    UserAlreadyExists,
    WeakPassword,
    EmailNotConfirmed,
    RateLimited,
    SessionMissing,
    Other,
}

const LEGACY_INVALID_CREDENTIALS: &str = "Invalid login credentials";

impl AuthErrorKind {
    /// Prefers the structured `error_code`; older deployments only send a
    /// message, so the known sign-in message is matched as a fallback.
    pub fn classify(code: Option<&str>, message: &str) -> Self {
        let by_code = match code {
            Some("invalid_credentials") => Some(Self::InvalidCredentials),
            Some("user_already_exists" | "email_exists") => Some(Self::UserAlreadyExists),
            Some("weak_password") => Some(Self::WeakPassword),
            Some("email_not_confirmed") => Some(Self::EmailNotConfirmed),
            Some("over_request_rate_limit" | "over_email_send_rate_limit") => {
                Some(Self::RateLimited)
            }
            Some("session_not_found" | "bad_jwt" | "no_authorization") => {
                Some(Self::SessionMissing)
            }
            _ => None,
        };

        by_code.unwrap_or_else(|| {
            if message.contains(LEGACY_INVALID_CREDENTIALS) {
                Self::InvalidCredentials
            } else {
                Self::Other
            }
        })
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{message}")]
    Auth { kind: AuthErrorKind, message: String },
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected backend response: {0}")]
    Decode(String),
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    pub fn auth(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self::Auth {
            kind,
            message: message.into(),
        }
    }

    pub fn auth_kind(&self) -> Option<AuthErrorKind> {
        match self {
            BackendError::Auth { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Body of a sign-up call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    /// Stored as the new account's `user_metadata`.
    pub data: Map<String, Value>,
}

impl SignUpRequest {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
            data: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthSession, BackendError>;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthOutcome, BackendError>;

    /// Resolves the user behind an access token.
    async fn get_user(&self, access_token: &str) -> Result<User, BackendError>;

    /// Trades a refresh token for a new session once the access token expired.
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;
}

#[async_trait]
pub trait TripStore: Send + Sync {
    /// All trips owned by `user_id`, earliest start first.
    async fn trips_for_user(
        &self,
        access_token: &str,
        user_id: &Uuid,
    ) -> Result<Vec<Trip>, BackendError>;
}
