use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{
    config::AppConfig,
    error::AppError,
    services::{
        backend::{AuthGateway, TripStore},
        invites::{InvitationMailer, LogOnlyMailer},
        supabase::SupabaseClient,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth: Arc<dyn AuthGateway>,
    pub trips: Arc<dyn TripStore>,
    pub mailer: Arc<dyn InvitationMailer>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        auth: Arc<dyn AuthGateway>,
        trips: Arc<dyn TripStore>,
        mailer: Arc<dyn InvitationMailer>,
    ) -> Self {
        let digest = Sha512::digest(config.cookie_secret.as_bytes());
        let cookie_key = Key::from(&digest[..]);
        Self {
            config,
            auth,
            trips,
            mailer,
            cookie_key,
        }
    }

    /// Wires the production adapters from configuration.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let backend = Arc::new(SupabaseClient::new(
            config.supabase_url.clone(),
            &config.supabase_anon_key,
            config.backend_timeout,
        )?);
        let mailer = Arc::new(LogOnlyMailer::new(config.invite_delay));
        Ok(Self::new(config, backend.clone(), backend, mailer))
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
