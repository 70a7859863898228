use std::{convert::Infallible, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    error::{AppError, FieldErrors},
    models::user::{AuthOutcome, AuthSession, Credentials, User, GUEST_MARKER},
    services::backend::{AuthErrorKind, AuthGateway, BackendError, SignUpRequest, TripStore},
    state::AppState,
};

pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";

/// Read/write access to the encrypted cookie jar of one request. Handlers
/// that change cookies must return it as part of their response.
#[derive(Clone)]
pub struct SessionCookies {
    jar: PrivateCookieJar,
    secure: bool,
}

impl SessionCookies {
    pub fn new(jar: PrivateCookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.jar
            .get(name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, name: &str, value: &str) {
        let cookie = Cookie::build((name.to_string(), value.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);
        self.jar = self.jar.clone().add(cookie);
    }

    pub fn remove(&mut self, name: &str) {
        let cookie = Cookie::build((name.to_string(), String::new())).path("/");
        self.jar = self.jar.clone().remove(cookie);
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_COOKIE)
    }

    pub fn store_session(&mut self, session: &AuthSession) {
        self.set(ACCESS_TOKEN_COOKIE, &session.access_token);
        self.set(REFRESH_TOKEN_COOKIE, &session.refresh_token);
    }

    pub fn clear_session(&mut self) {
        self.remove(ACCESS_TOKEN_COOKIE);
        self.remove(REFRESH_TOKEN_COOKIE);
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionCookies {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        Ok(Self::new(jar, state.config.cookie_secure))
    }
}

impl IntoResponseParts for SessionCookies {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

/// Per-request handle onto the backend, carrying whatever session the
/// cookies hold.
#[derive(Clone)]
pub struct RequestClient {
    pub cookies: SessionCookies,
    auth: Arc<dyn AuthGateway>,
    trips: Arc<dyn TripStore>,
}

impl RequestClient {
    pub fn has_session(&self) -> bool {
        self.cookies.access_token().is_some()
    }

    pub fn auth(&self) -> &dyn AuthGateway {
        self.auth.as_ref()
    }

    pub fn trips(&self) -> &dyn TripStore {
        self.trips.as_ref()
    }

    /// The signed-in user, or `None` when there is no session or it can no
    /// longer be renewed. An expired access token is exchanged for a new one
    /// via the refresh cookie; the caller must send `cookies` back.
    pub async fn current_user(&mut self) -> Option<User> {
        let token = self.cookies.access_token()?;
        match self.auth.get_user(&token).await {
            Ok(user) => Some(user),
            Err(err) if err.auth_kind().is_some() => {
                debug!("access token rejected, refreshing: {err}");
                self.refresh().await
            }
            Err(err) => {
                debug!("could not resolve session user: {err}");
                None
            }
        }
    }

    async fn refresh(&mut self) -> Option<User> {
        let refresh_token = self.cookies.get(REFRESH_TOKEN_COOKIE)?;
        match self.auth.refresh_session(&refresh_token).await {
            Ok(session) => {
                self.cookies.store_session(&session);
                Some(session.user)
            }
            Err(err) => {
                debug!("session refresh failed: {err}");
                self.cookies.clear_session();
                None
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestClient {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = SessionCookies::from_request_parts(parts, state).await?;
        Ok(Self {
            cookies,
            auth: state.auth.clone(),
            trips: state.trips.clone(),
        })
    }
}

/// Signs in; in guest mode an unknown account is created on the fly instead
/// of failing.
pub async fn resolve_login(
    gateway: &dyn AuthGateway,
    credentials: &Credentials,
    is_guest: bool,
) -> Result<AuthOutcome, AppError> {
    match gateway.sign_in_with_password(credentials).await {
        Ok(session) => Ok(session.into()),
        Err(err) if is_guest && err.auth_kind() == Some(AuthErrorKind::InvalidCredentials) => {
            info!(email = %credentials.email, "no account for guest, signing up");
            let request = SignUpRequest::new(credentials).with_metadata(GUEST_MARKER, true);
            gateway.sign_up(&request).await.map_err(rejected)
        }
        Err(err) => Err(rejected(err)),
    }
}

pub async fn sign_up(
    gateway: &dyn AuthGateway,
    credentials: &Credentials,
) -> Result<AuthOutcome, AppError> {
    gateway
        .sign_up(&SignUpRequest::new(credentials))
        .await
        .map_err(rejected)
}

fn rejected(err: BackendError) -> AppError {
    AppError::BadRequest(err.to_string())
}

/// Stricter than the RFC check: doubled or leading dots in the local part and
/// single-letter top-level domains are rejected.
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:[A-Za-z0-9_'+-]+\.)*[A-Za-z0-9_'+-]*[A-Za-z0-9_+-]",
        r"@(?:[A-Za-z0-9][A-Za-z0-9-]*\.)+[A-Za-z]{2,}$",
    ))
    .expect("valid email pattern")
});

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CredentialsForm {
    #[validate(
        required(message = "Required"),
        email(message = "Invalid email"),
        custom(function = "email_shape")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Required"),
        length(min = 6, message = "String must contain at least 6 character(s)")
    )]
    pub password: Option<String>,
}

impl CredentialsForm {
    /// Per-field messages on failure, keyed like the form inputs.
    pub fn into_credentials(self) -> Result<Credentials, FieldErrors> {
        if let Err(errors) = self.validate() {
            return Err(field_errors(&errors));
        }
        match (self.email, self.password) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            _ => Err(FieldErrors::new()),
        }
    }
}

fn email_shape(email: &str) -> Result<(), ValidationError> {
    if EMAIL_SHAPE.is_match(email) {
        return Ok(());
    }
    let mut error = ValidationError::new("email");
    error.message = Some("Invalid email".into());
    Err(error)
}

fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();
    for (field, failures) in errors.field_errors() {
        let messages = fields.entry(field.to_string()).or_default();
        for failure in failures.iter() {
            let message = failure
                .message
                .as_ref()
                .map(|message| message.to_string())
                .unwrap_or_else(|| failure.code.to_string());
            if !messages.contains(&message) {
                messages.push(message);
            }
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedGateway {
        sign_in_error: Option<(AuthErrorKind, &'static str)>,
        sign_up_error: Option<&'static str>,
        sign_ups: Mutex<Vec<SignUpRequest>>,
    }

    #[async_trait]
    impl AuthGateway for ScriptedGateway {
        async fn sign_in_with_password(
            &self,
            credentials: &Credentials,
        ) -> Result<AuthSession, BackendError> {
            if let Some((kind, message)) = self.sign_in_error {
                return Err(BackendError::auth(kind, message));
            }
            Ok(AuthSession {
                access_token: "access".into(),
                refresh_token: "refresh".into(),
                expires_in: Some(3600),
                user: User::new(&credentials.email),
            })
        }

        async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthOutcome, BackendError> {
            self.sign_ups.lock().unwrap().push(request.clone());
            if let Some(message) = self.sign_up_error {
                return Err(BackendError::auth(AuthErrorKind::Other, message));
            }
            let mut user = User::new(&request.email);
            user.user_metadata = request.data.clone();
            Ok(AuthOutcome {
                user,
                session: None,
            })
        }

        async fn get_user(&self, _access_token: &str) -> Result<User, BackendError> {
            Err(BackendError::auth(AuthErrorKind::SessionMissing, "no session"))
        }

        async fn refresh_session(&self, _refresh_token: &str) -> Result<AuthSession, BackendError> {
            Err(BackendError::auth(AuthErrorKind::SessionMissing, "no session"))
        }

        async fn sign_out(&self, _access_token: &str) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            email: "guest@example.com".into(),
            password: "hunter22".into(),
        }
    }

    fn invalid_credentials() -> Option<(AuthErrorKind, &'static str)> {
        Some((AuthErrorKind::InvalidCredentials, "Invalid login credentials"))
    }

    #[tokio::test]
    async fn guest_without_account_is_signed_up_as_guest() {
        let gateway = ScriptedGateway {
            sign_in_error: invalid_credentials(),
            ..Default::default()
        };
        let outcome = resolve_login(&gateway, &credentials(), true)
            .await
            .expect("guest account");
        assert!(outcome.user.is_guest());
        let sign_ups = gateway.sign_ups.lock().unwrap();
        assert_eq!(sign_ups.len(), 1);
        assert_eq!(sign_ups[0].data[GUEST_MARKER], true);
    }

    #[tokio::test]
    async fn guest_with_account_is_just_signed_in() {
        let gateway = ScriptedGateway::default();
        let outcome = resolve_login(&gateway, &credentials(), true)
            .await
            .expect("sign in");
        assert!(outcome.session.is_some());
        assert!(gateway.sign_ups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn regular_login_never_signs_up() {
        let gateway = ScriptedGateway {
            sign_in_error: invalid_credentials(),
            ..Default::default()
        };
        let err = resolve_login(&gateway, &credentials(), false)
            .await
            .expect_err("bad credentials");
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Invalid login credentials"));
        assert!(gateway.sign_ups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn guest_with_other_sign_in_error_is_rejected() {
        let gateway = ScriptedGateway {
            sign_in_error: Some((AuthErrorKind::EmailNotConfirmed, "Email not confirmed")),
            ..Default::default()
        };
        let err = resolve_login(&gateway, &credentials(), true)
            .await
            .expect_err("unconfirmed");
        assert_eq!(err.to_string(), "Email not confirmed");
        assert!(gateway.sign_ups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_guest_sign_up_surfaces_its_message() {
        let gateway = ScriptedGateway {
            sign_in_error: invalid_credentials(),
            sign_up_error: Some("Signups not allowed for this instance"),
            ..Default::default()
        };
        let err = resolve_login(&gateway, &credentials(), true)
            .await
            .expect_err("sign up refused");
        assert_eq!(err.to_string(), "Signups not allowed for this instance");
    }

    fn form(email: &str, password: &str) -> CredentialsForm {
        CredentialsForm {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[test]
    fn form_validation_reports_each_field() {
        let errors = form("not-an-email", "123").into_credentials().unwrap_err();
        assert_eq!(errors["email"], vec!["Invalid email"]);
        assert_eq!(
            errors["password"],
            vec!["String must contain at least 6 character(s)"]
        );
    }

    #[test]
    fn malformed_addresses_are_invalid_emails() {
        for email in [
            "a@b..com",
            "a@b.c",
            "a..b@example.com",
            "a@-example.com",
            ".a@example.com",
            "a b@example.com",
            "a@example",
        ] {
            let errors = form(email, "secret12").into_credentials().unwrap_err();
            assert_eq!(errors["email"], vec!["Invalid email"], "{email}");
            assert!(!errors.contains_key("password"), "{email}");
        }
    }

    #[test]
    fn ordinary_addresses_are_accepted() {
        for email in [
            "me@example.com",
            "first.last+trips@mail.example.co.uk",
            "o'neil@example.ie",
        ] {
            let credentials = form(email, "secret12").into_credentials().expect(email);
            assert_eq!(credentials.email, email);
        }
    }

    #[test]
    fn missing_fields_are_required() {
        let errors = CredentialsForm::default().into_credentials().unwrap_err();
        assert_eq!(errors["email"], vec!["Required"]);
        assert_eq!(errors["password"], vec!["Required"]);
    }

    #[test]
    fn password_length_counts_characters() {
        assert!(form("me@example.com", "ñññññ").into_credentials().is_err());
        assert!(form("me@example.com", "ññññññ").into_credentials().is_ok());
    }
}
