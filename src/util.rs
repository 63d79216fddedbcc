use chrono::{Local, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Title-case a slug or phrase: dashes become spaces, each word capitalized.
///
/// Example: "elementary-school" → "Elementary School"
pub fn title_case(value: &str) -> String {
    value
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first character, lowercase the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Parse an IANA timezone name from config.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Current wall-clock time in the given timezone, or the host's local time.
pub fn wall_clock_now(tz: Option<&Tz>) -> NaiveDateTime {
    match tz {
        Some(tz) => Utc::now().with_timezone(tz).naive_local(),
        None => Local::now().naive_local(),
    }
}
