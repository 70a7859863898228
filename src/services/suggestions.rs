use chrono::{DateTime, Duration, Utc};

use crate::models::recommendation::Suggestion;

struct SuggestionEntry {
    destination: &'static str,
    notes: &'static str,
    start_offset_days: i64,
    end_offset_days: i64,
}

const SUGGESTIONS: &[SuggestionEntry] = &[
    SuggestionEntry {
        destination: "Tokyo",
        notes: "Visit Senso-ji Temple, explore Shibuya Crossing, try authentic ramen, visit Tsukiji Outer Market for sushi, see cherry blossoms in spring.",
        start_offset_days: 30,
        end_offset_days: 37,
    },
    SuggestionEntry {
        destination: "Paris",
        notes: "Visit Eiffel Tower, explore Louvre Museum, walk along Champs-Élysées, visit Notre-Dame Cathedral, enjoy French cuisine.",
        start_offset_days: 45,
        end_offset_days: 52,
    },
    SuggestionEntry {
        destination: "New York",
        notes: "Visit Times Square, explore Central Park, see Statue of Liberty, visit Metropolitan Museum of Art, walk Brooklyn Bridge.",
        start_offset_days: 20,
        end_offset_days: 27,
    },
];

const FALLBACK_START_DAYS: i64 = 30;
const FALLBACK_END_DAYS: i64 = 37;

/// Exact-name lookup; unknown destinations get a templated note.
pub fn suggest(destination: &str, now: DateTime<Utc>) -> Suggestion {
    match SUGGESTIONS.iter().find(|entry| entry.destination == destination) {
        Some(entry) => Suggestion {
            notes: entry.notes.to_string(),
            start_date: offset_date(now, entry.start_offset_days),
            end_date: offset_date(now, entry.end_offset_days),
        },
        None => Suggestion {
            notes: format!(
                "Explore {destination}, visit local attractions, try local cuisine, and immerse yourself in the culture."
            ),
            start_date: offset_date(now, FALLBACK_START_DAYS),
            end_date: offset_date(now, FALLBACK_END_DAYS),
        },
    }
}

fn offset_date(now: DateTime<Utc>, days: i64) -> String {
    (now + Duration::days(days)).format("%Y-%m-%d").to_string()
}
