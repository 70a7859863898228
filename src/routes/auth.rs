use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::{
    auth::{self, CredentialsForm, RequestClient, SessionCookies},
    error::{AppError, FieldErrors},
    models::user::{AuthOutcome, Credentials},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth", get(auth_page))
        .route("/auth/login", post(login_action))
        .route("/auth/signup", post(signup_action))
        .route("/auth/logout", post(logout))
        .route("/routes/auth", post(json_login))
}

#[derive(Template)]
#[template(path = "auth.html")]
struct AuthTemplate;

async fn auth_page() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(AuthTemplate)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    email: String,
    password: String,
    #[serde(default)]
    is_guest: bool,
}

/// JSON login used by the client; guests get an account on first use.
async fn json_login(
    State(state): State<AppState>,
    mut cookies: SessionCookies,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let credentials = Credentials {
        email: req.email,
        password: req.password,
    };
    let outcome = auth::resolve_login(state.auth.as_ref(), &credentials, req.is_guest).await?;
    remember(&mut cookies, &outcome);
    Ok((cookies, Json(json!({ "user": outcome.user }))).into_response())
}

async fn login_action(
    State(state): State<AppState>,
    cookies: SessionCookies,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let credentials = match form.into_credentials() {
        Ok(credentials) => credentials,
        Err(errors) => return Ok(rejected_form(errors)),
    };
    let outcome = auth::resolve_login(state.auth.as_ref(), &credentials, false).await;
    action_result(cookies, outcome)
}

async fn signup_action(
    State(state): State<AppState>,
    cookies: SessionCookies,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let credentials = match form.into_credentials() {
        Ok(credentials) => credentials,
        Err(errors) => return Ok(rejected_form(errors)),
    };
    let outcome = auth::sign_up(state.auth.as_ref(), &credentials).await;
    action_result(cookies, outcome)
}

/// Failed form actions still answer 200; the page reads `success` and shows
/// `errors` next to the inputs. Backend failures go under the `auth` field.
fn action_result(
    mut cookies: SessionCookies,
    outcome: Result<AuthOutcome, AppError>,
) -> Result<Response, AppError> {
    match outcome {
        Ok(outcome) => {
            remember(&mut cookies, &outcome);
            Ok((
                cookies,
                Json(json!({ "success": true, "user": outcome.user })),
            )
                .into_response())
        }
        Err(AppError::BadRequest(message)) => {
            let mut errors = FieldErrors::new();
            errors.insert("auth".into(), vec![message]);
            Ok(rejected_form(errors))
        }
        Err(err) => Err(err),
    }
}

fn rejected_form(errors: FieldErrors) -> Response {
    Json(json!({ "success": false, "errors": errors })).into_response()
}

fn remember(cookies: &mut SessionCookies, outcome: &AuthOutcome) {
    if let Some(session) = outcome.session.as_ref() {
        cookies.store_session(session);
    }
}

async fn logout(mut client: RequestClient) -> (SessionCookies, Redirect) {
    if let Some(token) = client.cookies.access_token() {
        if let Err(err) = client.auth().sign_out(&token).await {
            warn!("sign-out at backend failed: {err}");
        }
    }
    client.cookies.clear_session();
    (client.cookies, Redirect::to("/"))
}
