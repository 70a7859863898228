use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::{error::AppError, models::invitation::Invitation};

/// Delivers trip invitations to friends.
#[async_trait]
pub trait InvitationMailer: Send + Sync {
    async fn deliver(&self, invitation: &Invitation) -> Result<(), AppError>;
}

/// Stand-in mailer: logs the invitation and waits to mimic a network call.
/// No email leaves the process.
#[derive(Debug, Clone)]
pub struct LogOnlyMailer {
    delay: Duration,
}

impl LogOnlyMailer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl InvitationMailer for LogOnlyMailer {
    async fn deliver(&self, invitation: &Invitation) -> Result<(), AppError> {
        let payload =
            serde_json::to_string(invitation).map_err(|err| AppError::Other(err.into()))?;
        info!(invitation_id = %invitation.id, "Sending invitation: {payload}");
        // TODO: hand the invitation to a transactional email provider.
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
