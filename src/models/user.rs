use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;
use uuid::Uuid;

pub const GUEST_MARKER: &str = "is_guest";

/// An account as issued by the auth service. Fields the app does not use are
/// kept in `extra` so responses forward the user object unchanged.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub aud: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    #[serde(default)]
    pub app_metadata: Map<String, Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            aud: Some("authenticated".into()),
            role: Some("authenticated".into()),
            email: Some(email.into()),
            user_metadata: Map::new(),
            app_metadata: Map::new(),
            created_at: Some(Utc::now()),
            last_sign_in_at: None,
            extra: Map::new(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.user_metadata
            .get(GUEST_MARKER)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn email_text(&self) -> &str {
        self.email.as_deref().unwrap_or("traveller")
    }
}

/// Tokens handed out by a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// What a sign-in or sign-up produced. `session` is absent when the account
/// still needs email confirmation.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: User,
    pub session: Option<AuthSession>,
}

impl From<AuthSession> for AuthOutcome {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.clone(),
            session: Some(session),
        }
    }
}
