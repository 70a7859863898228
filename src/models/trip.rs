use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::user::User;

/// A row of the `trips` table. Columns beyond the ones the app reads are kept
/// in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    pub id: Value,
    pub user_id: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Trip {
    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.end_date)
    }
}

/// A trip with its read-time display fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TripView {
    #[serde(flatten)]
    pub trip: Trip,
    #[serde(rename = "isPast")]
    pub is_past: bool,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct TripsPage {
    pub user: Option<User>,
    pub trips: Vec<TripView>,
}

/// Accepts RFC 3339 timestamps and plain dates; plain dates are midnight UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}
