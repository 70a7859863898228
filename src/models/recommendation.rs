use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub notes: String,
    pub start_date: String,
    pub end_date: String,
}

/// Packing categories in display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PackingCategories {
    pub essentials: Vec<String>,
    pub clothing: Vec<String>,
    pub electronics: Vec<String>,
    pub toiletries: Vec<String>,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackingList {
    pub categories: PackingCategories,
    /// `None` (serialized as `null`) when a date could not be parsed.
    pub duration: Option<i64>,
    pub trip_type: String,
    pub destination: String,
}
