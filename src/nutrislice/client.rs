//! HTTP client for the Nutrislice weekly menu API.
//!
//! One GET per (district, school, meal type, week). The API returns the whole
//! week containing the supplied date, so any date inside the week works.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use url::Url;

use crate::category::normalize_category;
use crate::error::MenuError;
use crate::types::{Config, Day, MealType, MenuItem};

// ============================================================================
// API response types (deserialized from Nutrislice JSON)
// ============================================================================

#[derive(Debug, Deserialize)]
struct MenuResponse {
    days: Vec<RawDay>,
}

#[derive(Debug, Deserialize)]
struct RawDay {
    date: NaiveDate,
    #[serde(default)]
    menu_items: Vec<RawMenuItem>,
}

#[derive(Debug, Deserialize)]
struct RawMenuItem {
    #[serde(default)]
    is_holiday: bool,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    food: Option<RawFood>,
}

#[derive(Debug, Deserialize)]
struct RawFood {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    food_category: Option<String>,
}

impl From<RawMenuItem> for MenuItem {
    fn from(raw: RawMenuItem) -> Self {
        let (food_name, food_category) = match raw.food {
            Some(food) => (
                food.name.map(|n| n.trim().to_string()),
                food.food_category.as_deref().and_then(normalize_category),
            ),
            None => (None, None),
        };

        MenuItem {
            is_holiday: raw.is_holiday,
            text: raw.text.unwrap_or_default().trim().to_string(),
            food_name,
            item_category: raw.category.as_deref().and_then(normalize_category),
            food_category,
        }
    }
}

impl From<RawDay> for Day {
    fn from(raw: RawDay) -> Self {
        Day {
            date: raw.date,
            items: raw.menu_items.into_iter().map(MenuItem::from).collect(),
        }
    }
}

/// Parse a weekly menu body into domain days.
pub fn parse_week(body: &str) -> Result<Vec<Day>, MenuError> {
    let response: MenuResponse = serde_json::from_str(body)?;
    Ok(response.days.into_iter().map(Day::from).collect())
}

// ============================================================================
// Client
// ============================================================================

/// Count the days in a weekly body without validating their shape.
///
/// A missing or null `days` counts as zero.
pub fn count_days(body: &str) -> Result<usize, MenuError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    Ok(value
        .get("days")
        .and_then(serde_json::Value::as_array)
        .map_or(0, Vec::len))
}

/// Anything that can produce one week of menu days.
///
/// The window fetcher only depends on this seam, so tests can substitute
/// canned weeks for the HTTP client.
#[async_trait]
pub trait WeekSource: Send + Sync {
    async fn fetch_week(&self, week_of: NaiveDate) -> Result<Vec<Day>, MenuError>;

    /// Number of days the API lists for the week. Used by setup, where an
    /// answer with no days means the school or meal type is wrong.
    async fn probe_week(&self, week_of: NaiveDate) -> Result<usize, MenuError> {
        Ok(self.fetch_week(week_of).await?.len())
    }
}

pub struct MenuClient {
    client: reqwest::Client,
    base_url: Url,
    school_name: String,
    meal_type: MealType,
    timeout_secs: u64,
}

impl MenuClient {
    pub fn new(config: &Config) -> Result<Self, MenuError> {
        let base = config
            .base_url
            .clone()
            .unwrap_or_else(|| super::district_base_url(&config.district));
        let mut base_url =
            Url::parse(&base).map_err(|e| MenuError::InvalidUrl(format!("{}: {}", base, e)))?;
        // Keep any path prefix on the base when joining
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| MenuError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            school_name: config.school_name.clone(),
            meal_type: config.meal_type,
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// URL of the week containing `week_of`.
    pub fn week_url(&self, week_of: NaiveDate) -> Result<Url, MenuError> {
        let path = format!(
            "menu/api/weeks/school/{}/menu-type/{}/{}/",
            self.school_name,
            self.meal_type,
            week_of.format("%Y/%m/%d")
        );
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| MenuError::InvalidUrl(e.to_string()))?;
        url.set_query(Some("format=json"));
        Ok(url)
    }

    async fn get_week_body(&self, week_of: NaiveDate) -> Result<String, MenuError> {
        let url = self.week_url(week_of)?;
        log::debug!("Nutrislice: GET {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MenuError::from_reqwest(e, self.timeout_secs))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MenuError::Status {
                status: status.as_u16(),
            });
        }

        resp.text()
            .await
            .map_err(|e| MenuError::from_reqwest(e, self.timeout_secs))
    }
}

#[async_trait]
impl WeekSource for MenuClient {
    async fn fetch_week(&self, week_of: NaiveDate) -> Result<Vec<Day>, MenuError> {
        let body = self.get_week_body(week_of).await?;
        parse_week(&body)
    }

    async fn probe_week(&self, week_of: NaiveDate) -> Result<usize, MenuError> {
        let body = self.get_week_body(week_of).await?;
        count_days(&body)
    }
}
