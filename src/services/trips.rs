use chrono::{DateTime, Utc};
use tracing::error;

use super::{backend::TripStore, flags};
use crate::models::{
    trip::{Trip, TripView, TripsPage},
    user::User,
};

pub fn annotate(trip: Trip, now: DateTime<Utc>) -> TripView {
    let is_past = trip.ends_at().map(|end| end < now).unwrap_or(false);
    let image_url = flags::flag_url(&trip.destination);
    TripView {
        trip,
        is_past,
        image_url,
    }
}

/// Loads the page data for the home screen. Backend failures are logged and
/// shown as an empty list.
pub async fn load_trips(
    store: &dyn TripStore,
    access_token: Option<&str>,
    user: Option<User>,
    now: DateTime<Utc>,
) -> TripsPage {
    let (Some(user), Some(token)) = (user, access_token) else {
        return TripsPage::default();
    };

    let trips = match store.trips_for_user(token, &user.id).await {
        Ok(trips) => trips,
        Err(err) => {
            error!(user_id = %user.id, "Error fetching trips: {err}");
            Vec::new()
        }
    };

    TripsPage {
        trips: trips.into_iter().map(|trip| annotate(trip, now)).collect(),
        user: Some(user),
    }
}
