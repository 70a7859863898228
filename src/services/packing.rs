//! Packing lists assembled from a per-destination base list, adjusted for
//! trip length and trip type.

use crate::models::{
    recommendation::{PackingCategories, PackingList},
    trip::parse_instant,
};

pub const DEFAULT_TRIP_TYPE: &str = "general";

struct BaseList {
    destination: &'static str,
    essentials: &'static [&'static str],
    clothing: &'static [&'static str],
    electronics: &'static [&'static str],
    toiletries: &'static [&'static str],
    documents: &'static [&'static str],
}

impl BaseList {
    fn to_categories(&self) -> PackingCategories {
        PackingCategories {
            essentials: owned(self.essentials),
            clothing: owned(self.clothing),
            electronics: owned(self.electronics),
            toiletries: owned(self.toiletries),
            documents: owned(self.documents),
        }
    }
}

const STANDARD_DOCUMENTS: &[&str] = &[
    "Passport",
    "Travel insurance",
    "Hotel confirmations",
    "Emergency contacts",
];

const BASE_LISTS: &[BaseList] = &[
    BaseList {
        destination: "Tokyo",
        essentials: &[
            "Passport",
            "Travel adapter (Type A/B)",
            "Comfortable walking shoes",
            "Camera",
        ],
        clothing: &[
            "Light layers",
            "Rain jacket",
            "Comfortable socks",
            "Hat for sun protection",
        ],
        electronics: &[
            "Phone charger",
            "Power bank",
            "Universal adapter",
            "Camera/Phone for photos",
        ],
        toiletries: &[
            "Toothbrush/toothpaste",
            "Deodorant",
            "Sunscreen",
            "Hand sanitizer",
        ],
        documents: STANDARD_DOCUMENTS,
    },
    BaseList {
        destination: "Paris",
        essentials: &[
            "Passport",
            "Travel adapter (Type E)",
            "Comfortable walking shoes",
            "Camera",
        ],
        clothing: &[
            "Stylish casual wear",
            "Light jacket",
            "Comfortable shoes",
            "Scarf for fashion",
        ],
        electronics: &["Phone charger", "Power bank", "Universal adapter", "Camera"],
        toiletries: &[
            "Toothbrush/toothpaste",
            "Deodorant",
            "Perfume/cologne",
            "Hand sanitizer",
        ],
        documents: STANDARD_DOCUMENTS,
    },
    BaseList {
        destination: "New York",
        essentials: &[
            "ID/Passport",
            "Comfortable walking shoes",
            "Camera",
            "Metro card",
        ],
        clothing: &[
            "Layers for changing weather",
            "Comfortable walking shoes",
            "Rain jacket",
            "Warm layers",
        ],
        electronics: &["Phone charger", "Power bank", "Camera", "Portable WiFi"],
        toiletries: &[
            "Toothbrush/toothpaste",
            "Deodorant",
            "Sunscreen",
            "Hand sanitizer",
        ],
        documents: &[
            "ID/Passport",
            "Travel insurance",
            "Hotel confirmations",
            "Emergency contacts",
        ],
    },
];

const FALLBACK_LIST: BaseList = BaseList {
    destination: "",
    essentials: &["Passport", "Travel adapter", "Comfortable shoes", "Camera"],
    clothing: &[
        "Weather-appropriate clothing",
        "Comfortable walking shoes",
        "Light jacket",
    ],
    electronics: &["Phone charger", "Power bank", "Camera"],
    toiletries: &[
        "Toothbrush/toothpaste",
        "Deodorant",
        "Sunscreen",
        "Hand sanitizer",
    ],
    documents: STANDARD_DOCUMENTS,
};

const LONG_TRIP_DAYS: i64 = 7;
const SHORT_TRIP_DAYS: i64 = 3;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Whole days between two dates, rounded up. `None` if either side does not
/// parse.
pub fn trip_duration(start: &str, end: &str) -> Option<i64> {
    let start = parse_instant(start)?;
    let end = parse_instant(end)?;
    let millis = (end - start).num_milliseconds();
    let day_millis = SECONDS_PER_DAY * 1000;
    Some(millis.div_euclid(day_millis) + i64::from(millis.rem_euclid(day_millis) != 0))
}

pub fn packing_list(
    destination: &str,
    start_date: &str,
    end_date: &str,
    trip_type: Option<&str>,
) -> PackingList {
    let trip_type = trip_type.unwrap_or(DEFAULT_TRIP_TYPE);
    let base = BASE_LISTS
        .iter()
        .find(|list| list.destination == destination)
        .unwrap_or(&FALLBACK_LIST);

    let mut categories = base.to_categories();
    let duration = trip_duration(start_date, end_date);
    if let Some(days) = duration {
        apply_duration(&mut categories, days);
    }
    apply_trip_type(&mut categories, trip_type);

    PackingList {
        categories,
        duration,
        trip_type: trip_type.to_string(),
        destination: destination.to_string(),
    }
}

fn apply_duration(categories: &mut PackingCategories, days: i64) {
    if days > LONG_TRIP_DAYS {
        extend(
            &mut categories.clothing,
            &["Extra underwear and socks", "Laundry supplies"],
        );
        extend(
            &mut categories.electronics,
            &["Laptop/tablet", "Extra memory cards"],
        );
    }
    if days <= SHORT_TRIP_DAYS {
        categories
            .essentials
            .retain(|item| !item.contains("adapter"));
    }
}

fn apply_trip_type(categories: &mut PackingCategories, trip_type: &str) {
    match trip_type {
        "business" => {
            extend(
                &mut categories.clothing,
                &["Business attire", "Dress shoes", "Blazer/jacket"],
            );
            extend(
                &mut categories.electronics,
                &["Laptop", "Business cards", "Portfolio"],
            );
        }
        "beach" => {
            extend(
                &mut categories.clothing,
                &["Swimsuit", "Beach towel", "Sunglasses", "Beach hat"],
            );
            extend(
                &mut categories.essentials,
                &["Sunscreen", "Beach bag", "Water bottle"],
            );
        }
        "hiking" => {
            extend(
                &mut categories.clothing,
                &["Hiking boots", "Moisture-wicking clothes", "Hiking socks"],
            );
            extend(
                &mut categories.essentials,
                &["Water bottle", "First aid kit", "Hiking poles"],
            );
        }
        _ => {}
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn extend(target: &mut Vec<String>, items: &[&str]) {
    target.extend(items.iter().map(|item| item.to_string()));
}
