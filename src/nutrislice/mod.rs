//! Nutrislice weekly menu integration.
//!
//! Fetches the previous, current and next week of a school's menu from the
//! public Nutrislice JSON API and keeps the merged timeline fresh.
//! Follows the same client / poller split as the other integrations.

pub mod client;
pub mod poller;
pub mod window;

/// Host suffix for district menu feeds: `https://{district}.api.nutrislice.com`.
pub const API_HOST_SUFFIX: &str = "api.nutrislice.com";

/// Base URL for a district's menu feed.
pub fn district_base_url(district: &str) -> String {
    format!("https://{}.{}", district, API_HOST_SUFFIX)
}
