//! Menu sensor: turns the merged timeline into a display state.
//!
//! The state string is computed for one "active date": the user's override if
//! one was set through `set_target_date`, otherwise today until 1 PM and
//! tomorrow after. Attributes cover every day in the timeline regardless of
//! the active date.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::category::{item_matches, resolve_category};
use crate::error::TargetDateError;
use crate::timeline::find_day;
use crate::types::{Config, Day, DayAttributes, MenuAttributes, MenuItemAttributes, MenuState};
use crate::util::{capitalize, title_case};

/// From this local hour on, today's meal is assumed served; show tomorrow.
pub const CUTOFF_HOUR: u32 = 13;

/// Nutrislice fills empty days with this food name.
pub const PLACEHOLDER_FOOD: &str = "Menu Subject to Change";

pub const NO_MENU: &str = "No menu";
pub const UNKNOWN_STATE: &str = "unknown";
const HOLIDAY_FALLBACK: &str = "Holiday";

/// Display entity for one configured school + meal type.
///
/// Owns the target-date override. The override lives only as long as the
/// instance; there is no way to clear it short of a restart.
#[derive(Debug, Clone)]
pub struct MenuSensor {
    config: Config,
    target_date: Option<NaiveDate>,
}

impl MenuSensor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            target_date: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Friendly name, e.g. "Elementary School Lunch".
    pub fn name(&self) -> String {
        format!(
            "{} {}",
            title_case(&self.config.school_name),
            title_case(self.config.meal_type.as_str())
        )
    }

    pub fn unique_id(&self) -> String {
        format!(
            "nutrislice_{}_{}_{}",
            self.config.district, self.config.school_name, self.config.meal_type
        )
    }

    pub fn target_date(&self) -> Option<NaiveDate> {
        self.target_date
    }

    /// Apply the set_date command. `today` is the wall-clock date at the
    /// moment of the call; sentinels are resolved against it once.
    pub fn set_target_date(
        &mut self,
        input: &str,
        today: NaiveDate,
    ) -> Result<NaiveDate, TargetDateError> {
        let date = parse_target_date(input, today)?;
        self.target_date = Some(date);
        Ok(date)
    }

    /// The date the state string describes.
    pub fn active_date(&self, now: NaiveDateTime) -> NaiveDate {
        if let Some(date) = self.target_date {
            return date;
        }
        default_active_date(now)
    }

    /// The short state string, e.g. "2 Entrees Available".
    pub fn native_value(&self, timeline: &[Day], now: NaiveDateTime) -> String {
        let day = find_day(timeline, self.active_date(now));
        state_for_day(day, self.config.primary_category())
    }

    pub fn attributes(&self, timeline: &[Day], now: NaiveDateTime) -> MenuAttributes {
        let days: Vec<DayAttributes> = timeline.iter().map(format_day).collect();

        let today = now.date();
        let tomorrow = today + chrono::Duration::days(1);
        let summary_for = |date: NaiveDate| -> String {
            let key = date.to_string();
            days.iter()
                .find(|d| d.date == key)
                .map(|d| d.menu_summary.clone())
                .unwrap_or_else(|| NO_MENU.to_string())
        };

        MenuAttributes {
            target_date: self.active_date(now).to_string(),
            district: self.config.district.clone(),
            school_name: self.config.school_name.clone(),
            meal_type: self.config.meal_type,
            categories: self.config.categories.clone(),
            today_menu: summary_for(today),
            tomorrow_menu: summary_for(tomorrow),
            days,
        }
    }

    /// State plus attributes, ready to publish.
    pub fn compute(&self, timeline: &[Day], now: NaiveDateTime) -> MenuState {
        MenuState {
            state: self.native_value(timeline, now),
            attributes: self.attributes(timeline, now),
        }
    }
}

/// Today before the cutoff hour, tomorrow from the cutoff on.
pub fn default_active_date(now: NaiveDateTime) -> NaiveDate {
    if now.hour() >= CUTOFF_HOUR {
        now.date() + chrono::Duration::days(1)
    } else {
        now.date()
    }
}

/// Parse "today", "tomorrow" (any case) or an ISO `YYYY-MM-DD` date.
pub fn parse_target_date(input: &str, today: NaiveDate) -> Result<NaiveDate, TargetDateError> {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => Ok(today + chrono::Duration::days(1)),
        _ => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|_| TargetDateError::InvalidFormat(input.to_string())),
    }
}

/// State string for the active day (or its absence).
pub fn state_for_day(day: Option<&Day>, primary_category: &str) -> String {
    let Some(day) = day else {
        return UNKNOWN_STATE.to_string();
    };

    if let Some(holiday) = day.holiday() {
        return holiday_label(&holiday.text);
    }

    let label = capitalize(primary_category);
    let count = day
        .items
        .iter()
        .filter(|item| item_matches(item, primary_category))
        .count();

    if count > 0 {
        format!("{} {}s Available", count, label)
    } else {
        format!("No {}s/Weekend", label)
    }
}

fn holiday_label(text: &str) -> String {
    if text.is_empty() {
        HOLIDAY_FALLBACK.to_string()
    } else {
        text.to_string()
    }
}

/// Attribute record for one day.
pub fn format_day(day: &Day) -> DayAttributes {
    let holiday_name = day.holiday().map(|h| holiday_label(&h.text));

    let menu_items: Vec<MenuItemAttributes> = day
        .items
        .iter()
        .filter(|item| !item.is_holiday)
        .filter_map(|item| {
            let name = item.food_name.as_deref()?;
            if name.is_empty() || name == PLACEHOLDER_FOOD {
                return None;
            }
            Some(MenuItemAttributes {
                name: name.to_string(),
                category: resolve_category(item).map(String::from),
            })
        })
        .collect();

    let menu_summary = match &holiday_name {
        Some(name) => name.clone(),
        None if !menu_items.is_empty() => menu_items
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        None => NO_MENU.to_string(),
    };

    DayAttributes {
        date: day.date.to_string(),
        is_holiday: holiday_name.is_some(),
        holiday_name,
        has_menu: !menu_items.is_empty(),
        menu_items,
        menu_summary,
    }
}
