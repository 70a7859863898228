use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::{
    auth::{RequestClient, SessionCookies},
    error::AppError,
    models::{
        invitation::Invitation,
        recommendation::{PackingList, Suggestion},
    },
    services::{packing, suggestions},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ai-suggestion", post(ai_suggestion))
        .route("/api/packing-list", post(packing_list))
        .route("/api/invite", post(invite))
}

#[derive(Deserialize)]
struct SuggestionRequest {
    destination: String,
}

async fn ai_suggestion(Json(req): Json<SuggestionRequest>) -> Json<Suggestion> {
    Json(suggestions::suggest(&req.destination, Utc::now()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackingRequest {
    destination: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    end_date: String,
    trip_type: Option<String>,
}

async fn packing_list(Json(req): Json<PackingRequest>) -> Json<PackingList> {
    Json(packing::packing_list(
        &req.destination,
        &req.start_date,
        &req.end_date,
        req.trip_type.as_deref(),
    ))
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InviteRequest {
    trip_id: Value,
    friend_email: String,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InviteResponse {
    success: bool,
    invitation_id: String,
    message: &'static str,
}

/// The session is checked before the body is looked at, so anonymous callers
/// always get a 401.
async fn invite(
    State(state): State<AppState>,
    mut client: RequestClient,
    body: Option<Json<InviteRequest>>,
) -> Result<(SessionCookies, Json<InviteResponse>), AppError> {
    if !client.has_session() {
        return Err(AppError::Unauthorized);
    }
    let Some(Json(req)) = body else {
        return Err(AppError::BadRequest("Invalid invitation request".into()));
    };

    let inviter_email = client.current_user().await.and_then(|user| user.email);
    let trip_id = match req.trip_id {
        Value::String(id) => id,
        other => other.to_string(),
    };
    let invitation = Invitation::new(
        trip_id,
        inviter_email,
        req.friend_email,
        req.message,
        Utc::now(),
    );

    if let Err(err) = state.mailer.deliver(&invitation).await {
        error!("Failed to send invitation: {err}");
        return Err(AppError::InvitationFailed);
    }

    let response = InviteResponse {
        success: true,
        invitation_id: invitation.id,
        message: "Invitation sent successfully!",
    };
    Ok((client.cookies, Json(response)))
}
