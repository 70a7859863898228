//! Reqwest-backed adapter for a Supabase-style backend: GoTrue for auth and
//! PostgREST for the `trips` table.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use uuid::Uuid;

use super::backend::{AuthErrorKind, AuthGateway, BackendError, SignUpRequest, TripStore};
use crate::models::{
    trip::Trip,
    user::{AuthOutcome, AuthSession, Credentials, User},
};

#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: Arc<Url>,
    anon_key: Arc<str>,
}

/// Error payload shapes across GoTrue versions.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl AuthErrorBody {
    fn into_error(self, status: reqwest::StatusCode) -> BackendError {
        let code = self.error_code.clone().or_else(|| self.error.clone());
        let message = self
            .msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| status.to_string());
        let kind = AuthErrorKind::classify(code.as_deref(), &message);
        BackendError::auth(kind, message)
    }
}

impl SupabaseClient {
    pub fn new(base_url: Url, anon_key: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: Arc::new(with_trailing_slash(base_url)),
            anon_key: Arc::from(anon_key),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.client
            .get(url)
            .header("apikey", self.anon_key.as_ref())
    }

    fn post(&self, url: Url) -> RequestBuilder {
        self.client
            .post(url)
            .header("apikey", self.anon_key.as_ref())
    }

    async fn auth_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let body: AuthErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(body.into_error(status));
        }
        serde_json::from_slice(&bytes).map_err(|err| BackendError::Decode(err.to_string()))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Sign-up answers with a full session when the project auto-confirms
/// accounts and with the bare user otherwise.
fn parse_sign_up(body: Value) -> Result<AuthOutcome, BackendError> {
    let decode = |err: serde_json::Error| BackendError::Decode(err.to_string());
    if body.get("access_token").is_some() {
        let session: AuthSession = serde_json::from_value(body).map_err(decode)?;
        return Ok(session.into());
    }
    let user_value = body
        .get("user")
        .cloned()
        .filter(|user| !user.is_null())
        .unwrap_or(body);
    let user: User = serde_json::from_value(user_value).map_err(decode)?;
    Ok(AuthOutcome {
        user,
        session: None,
    })
}

#[async_trait]
impl AuthGateway for SupabaseClient {
    #[tracing::instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthSession, BackendError> {
        let url = self.endpoint("auth/v1/token")?;
        let response = self
            .post(url)
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await?;
        Self::auth_json(response).await
    }

    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthOutcome, BackendError> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self.post(url).json(request).send().await?;
        let body: Value = Self::auth_json(response).await?;
        parse_sign_up(body)
    }

    #[tracing::instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> Result<User, BackendError> {
        let url = self.endpoint("auth/v1/user")?;
        let response = self.get(url).bearer_auth(access_token).send().await?;
        Self::auth_json(response).await
    }

    #[tracing::instrument(skip_all)]
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        let url = self.endpoint("auth/v1/token")?;
        let response = self
            .post(url)
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        Self::auth_json(response).await
    }

    #[tracing::instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/logout")?;
        let response = self.post(url).bearer_auth(access_token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body: AuthErrorBody = response.json().await.unwrap_or_default();
        Err(body.into_error(status))
    }
}

#[async_trait]
impl TripStore for SupabaseClient {
    #[tracing::instrument(skip(self, access_token))]
    async fn trips_for_user(
        &self,
        access_token: &str,
        user_id: &Uuid,
    ) -> Result<Vec<Trip>, BackendError> {
        let url = self.endpoint("rest/v1/trips")?;
        let user_filter = format!("eq.{user_id}");
        let response = self
            .get(url)
            .bearer_auth(access_token)
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "start_date.asc"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read body".to_string());
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }
}
