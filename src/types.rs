use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Categories offered by the setup wizard. Configured categories must come
/// from this list.
pub const CATEGORIES: &[&str] = &[
    "entree",
    "sides",
    "dessert",
    "drink",
    "breakfast",
    "snack",
    "condiment",
    "fruit",
    "vegetable",
    "grain",
    "beverage",
    "milk",
];

pub const DEFAULT_CATEGORY: &str = "entree";

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    #[default]
    Lunch,
    Breakfast,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Lunch => "lunch",
            MealType::Breakfast => "breakfast",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "lunch" => Some(MealType::Lunch),
            "breakfast" => Some(MealType::Breakfast),
            _ => None,
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-instance settings, stored in ~/.nutrislice/config.json.
///
/// Set once at setup time and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub district: String,
    pub school_name: String,
    #[serde(default)]
    pub meal_type: MealType,
    /// First entry drives the state string; the rest are informational.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_poll_interval_minutes")]
    pub poll_interval_minutes: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// IANA timezone for the 1 PM cutoff. Falls back to the host's local time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Replaces `https://{district}.api.nutrislice.com` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_categories() -> Vec<String> {
    vec![DEFAULT_CATEGORY.to_string()]
}

fn default_poll_interval_minutes() -> u32 {
    6 * 60
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Config {
    pub fn new(district: &str, school_name: &str, meal_type: MealType, categories: &[&str]) -> Self {
        Self {
            district: district.to_string(),
            school_name: school_name.to_string(),
            meal_type,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            poll_interval_minutes: default_poll_interval_minutes(),
            request_timeout_secs: default_request_timeout_secs(),
            timezone: None,
            base_url: None,
        }
    }

    /// The category whose item count drives the state string.
    pub fn primary_category(&self) -> &str {
        self.categories
            .first()
            .map(|c| c.as_str())
            .unwrap_or(DEFAULT_CATEGORY)
    }
}

// ============================================================================
// Menu data
// ============================================================================

/// One entry from a day's `menu_items`, reduced to what display needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuItem {
    pub is_holiday: bool,
    /// Holiday label; empty for regular items.
    pub text: String,
    pub food_name: Option<String>,
    /// Item-level category, lowercased. `None` when absent or empty.
    pub item_category: Option<String>,
    /// Nested food record's category, lowercased.
    pub food_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    pub date: NaiveDate,
    pub items: Vec<MenuItem>,
}

impl Day {
    /// The first holiday item, if any. Later items are irrelevant once found.
    pub fn holiday(&self) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.is_holiday)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekRole {
    Previous,
    Current,
    Next,
}

impl WeekRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekRole::Previous => "previous_week",
            WeekRole::Current => "current_week",
            WeekRole::Next => "next_week",
        }
    }
}

/// Result of fetching an optional (previous/next) week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekSnapshot {
    Present(Vec<Day>),
    Absent,
}

impl WeekSnapshot {
    pub fn days(&self) -> &[Day] {
        match self {
            WeekSnapshot::Present(days) => days,
            WeekSnapshot::Absent => &[],
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, WeekSnapshot::Present(_))
    }
}

/// The three-week window. The current week has no absent form: if it could
/// not be fetched there is no snapshot at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot3 {
    pub previous: WeekSnapshot,
    pub current: Vec<Day>,
    pub next: WeekSnapshot,
}

// ============================================================================
// Published output
// ============================================================================

/// What the display surface receives: one short state plus attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuState {
    pub state: String,
    pub attributes: MenuAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuAttributes {
    pub target_date: String,
    pub district: String,
    pub school_name: String,
    pub meal_type: MealType,
    pub categories: Vec<String>,
    pub today_menu: String,
    pub tomorrow_menu: String,
    pub days: Vec<DayAttributes>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAttributes {
    pub date: String,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub menu_items: Vec<MenuItemAttributes>,
    pub has_menu: bool,
    pub menu_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItemAttributes {
    pub name: String,
    pub category: Option<String>,
}
