use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{response::Response, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    auth::{RequestClient, SessionCookies},
    models::trip::{TripView, TripsPage},
    services::trips::load_trips,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/api/session", get(session_data))
        .route("/api/trips", get(trips_data))
}

#[derive(Clone)]
struct TripCard {
    destination: String,
    dates: String,
    image_url: String,
    is_past: bool,
}

impl From<TripView> for TripCard {
    fn from(view: TripView) -> Self {
        Self {
            dates: format!("{} → {}", view.trip.start_date, view.trip.end_date),
            destination: view.trip.destination,
            image_url: view.image_url,
            is_past: view.is_past,
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    signed_in: bool,
    email: String,
    is_guest: bool,
    upcoming: Vec<TripCard>,
    past: Vec<TripCard>,
}

async fn fetch_page(client: &mut RequestClient) -> TripsPage {
    let user = client.current_user().await;
    let token = client.cookies.access_token();
    load_trips(client.trips(), token.as_deref(), user, Utc::now()).await
}

async fn home(mut client: RequestClient) -> (SessionCookies, Response) {
    let page = fetch_page(&mut client).await;
    let (past, upcoming): (Vec<TripCard>, Vec<TripCard>) = page
        .trips
        .into_iter()
        .map(TripCard::from)
        .partition(|card| card.is_past);

    let html = AskamaTemplateResponse::into_response(HomeTemplate {
        signed_in: page.user.is_some(),
        email: page
            .user
            .as_ref()
            .map(|user| user.email_text().to_string())
            .unwrap_or_default(),
        is_guest: page.user.as_ref().map(|user| user.is_guest()).unwrap_or(false),
        upcoming,
        past,
    });
    (client.cookies, html)
}

/// Layout data: just the signed-in user.
async fn session_data(mut client: RequestClient) -> (SessionCookies, Json<Value>) {
    let user = client.current_user().await;
    (client.cookies, Json(json!({ "user": user })))
}

async fn trips_data(mut client: RequestClient) -> (SessionCookies, Json<TripsPage>) {
    let page = fetch_page(&mut client).await;
    (client.cookies, Json(page))
}
