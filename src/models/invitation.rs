use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum InvitationStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub trip_id: String,
    pub inviter_email: Option<String>,
    pub friend_email: String,
    pub message: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(
        trip_id: impl Into<String>,
        inviter_email: Option<String>,
        friend_email: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("inv-{}", now.timestamp_millis()),
            trip_id: trip_id.into(),
            inviter_email,
            friend_email: friend_email.into(),
            message: message.into(),
            status: InvitationStatus::Pending,
            created_at: now,
        }
    }
}
