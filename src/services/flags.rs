/// Destination keywords and their ISO country codes. Order matters: the first
/// keyword found in a destination wins.
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("Tokyo", "jp"),
    ("Japan", "jp"),
    ("Paris", "fr"),
    ("France", "fr"),
    ("New York", "us"),
    ("USA", "us"),
    ("Barcelona", "es"),
    ("Spain", "es"),
    ("London", "gb"),
    ("UK", "gb"),
    ("Rome", "it"),
    ("Italy", "it"),
    ("Berlin", "de"),
    ("Germany", "de"),
    ("Amsterdam", "nl"),
    ("Netherlands", "nl"),
    ("Sydney", "au"),
    ("Australia", "au"),
    ("Toronto", "ca"),
    ("Canada", "ca"),
];

pub const UNKNOWN_COUNTRY: &str = "un";

const FLAG_CDN: &str = "https://flagcdn.com/w320";

pub fn country_code(destination: &str) -> &'static str {
    let haystack = destination.to_lowercase();
    COUNTRY_CODES
        .iter()
        .find(|(keyword, _)| haystack.contains(&keyword.to_lowercase()))
        .map(|(_, code)| *code)
        .unwrap_or(UNKNOWN_COUNTRY)
}

pub fn flag_url(destination: &str) -> String {
    format!("{FLAG_CDN}/{}.png", country_code(destination))
}
