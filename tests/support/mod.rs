#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Map};
use url::Url;
use uuid::Uuid;
use wayfarer::{
    config::AppConfig,
    error::AppError,
    models::{
        invitation::Invitation,
        trip::Trip,
        user::{AuthOutcome, AuthSession, Credentials, User},
    },
    services::{
        backend::{AuthErrorKind, AuthGateway, BackendError, SignUpRequest, TripStore},
        invites::{InvitationMailer, LogOnlyMailer},
    },
    state::AppState,
};

#[derive(Debug)]
struct Account {
    password: String,
    user: User,
}

/// In-memory stand-in for the hosted auth + database service.
#[derive(Debug, Default)]
pub struct FakeBackend {
    accounts: Mutex<HashMap<String, Account>>,
    sessions: Mutex<HashMap<String, User>>,
    refresh_tokens: Mutex<HashMap<String, User>>,
    trips: Mutex<Vec<Trip>>,
    pub fail_trips: AtomicBool,
    pub sign_in_calls: AtomicUsize,
    pub sign_up_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn register(&self, email: &str, password: &str) -> User {
        let user = User::new(email);
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        user
    }

    pub fn add_trip(&self, user_id: &Uuid, destination: &str, start_date: &str, end_date: &str) {
        let mut trips = self.trips.lock().unwrap();
        let id = trips.len() + 1;
        trips.push(Trip {
            id: json!(id),
            user_id: user_id.to_string(),
            destination: destination.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            extra: Map::new(),
        });
    }

    pub fn open_session(&self, user: &User) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), user.clone());
        token
    }

    /// Lets every issued access token lapse; refresh tokens stay valid.
    pub fn expire_access_tokens(&self) {
        self.sessions.lock().unwrap().clear();
    }

    fn session_for(&self, user: &User) -> AuthSession {
        let refresh_token = Uuid::new_v4().to_string();
        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(refresh_token.clone(), user.clone());
        AuthSession {
            access_token: self.open_session(user),
            refresh_token,
            expires_in: Some(3600),
            user: user.clone(),
        }
    }
}

#[async_trait]
impl AuthGateway for FakeBackend {
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthSession, BackendError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let user = {
            let accounts = self.accounts.lock().unwrap();
            accounts
                .get(&credentials.email)
                .filter(|account| account.password == credentials.password)
                .map(|account| account.user.clone())
        };
        match user {
            Some(user) => Ok(self.session_for(&user)),
            None => Err(BackendError::auth(
                AuthErrorKind::InvalidCredentials,
                "Invalid login credentials",
            )),
        }
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthOutcome, BackendError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        if self.accounts.lock().unwrap().contains_key(&request.email) {
            return Err(BackendError::auth(
                AuthErrorKind::UserAlreadyExists,
                "User already registered",
            ));
        }
        let mut user = self.register(&request.email, &request.password);
        user.user_metadata = request.data.clone();
        if let Some(account) = self.accounts.lock().unwrap().get_mut(&request.email) {
            account.user = user.clone();
        }
        Ok(self.session_for(&user).into())
    }

    async fn get_user(&self, access_token: &str) -> Result<User, BackendError> {
        self.sessions
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| BackendError::auth(AuthErrorKind::SessionMissing, "invalid JWT"))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let user = self.refresh_tokens.lock().unwrap().remove(refresh_token);
        match user {
            Some(user) => Ok(self.session_for(&user)),
            None => Err(BackendError::auth(
                AuthErrorKind::SessionMissing,
                "Invalid Refresh Token: Refresh Token Not Found",
            )),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        if let Some(user) = self.sessions.lock().unwrap().remove(access_token) {
            self.refresh_tokens
                .lock()
                .unwrap()
                .retain(|_, owner| owner.id != user.id);
        }
        Ok(())
    }
}

#[async_trait]
impl TripStore for FakeBackend {
    async fn trips_for_user(
        &self,
        _access_token: &str,
        user_id: &Uuid,
    ) -> Result<Vec<Trip>, BackendError> {
        if self.fail_trips.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 500,
                body: "relation \"trips\" does not exist".into(),
            });
        }
        let owner = user_id.to_string();
        let mut trips: Vec<Trip> = self
            .trips
            .lock()
            .unwrap()
            .iter()
            .filter(|trip| trip.user_id == owner)
            .cloned()
            .collect();
        trips.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(trips)
    }
}

pub struct FailingMailer;

#[async_trait]
impl InvitationMailer for FailingMailer {
    async fn deliver(&self, _invitation: &Invitation) -> Result<(), AppError> {
        Err(AppError::Other(anyhow::anyhow!("smtp relay unreachable")))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        supabase_url: Url::parse("http://127.0.0.1:54321").unwrap(),
        supabase_anon_key: "test-anon-key".into(),
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        cookie_secret: "test-cookie-secret".into(),
        cookie_secure: false,
        backend_timeout: Duration::from_secs(1),
        invite_delay: Duration::ZERO,
    }
}

pub fn app_state(backend: Arc<FakeBackend>) -> AppState {
    let mailer = Arc::new(LogOnlyMailer::new(Duration::ZERO));
    AppState::new(test_config(), backend.clone(), backend, mailer)
}

pub fn app_state_with_mailer(
    backend: Arc<FakeBackend>,
    mailer: Arc<dyn InvitationMailer>,
) -> AppState {
    AppState::new(test_config(), backend.clone(), backend, mailer)
}
