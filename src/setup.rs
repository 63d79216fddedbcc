//! Setup-time checks for a new school + meal type.
//!
//! The wizard collects district, school and meal type, then categories.
//! Before an instance is created the district/school pair is checked against
//! the live API: network failures are "cannot connect", a reachable endpoint
//! that rejects the pair (or returns no days) is "invalid input".

use chrono::NaiveDate;
use serde::Serialize;

use crate::category::normalize_category;
use crate::error::{MenuError, ValidationError};
use crate::nutrislice::client::{MenuClient, WeekSource};
use crate::types::{Config, MealType, CATEGORIES};
use crate::util::title_case;

/// Any date works; the API answers with the week containing it.
const PROBE_DATE: (i32, u32, u32) = (2023, 1, 1);

/// What the wizard stores once validation passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupInfo {
    pub title: String,
    pub unique_id: String,
}

/// Trim + lowercase identifiers and categories the way the wizard does.
pub fn normalize_config(mut config: Config) -> Config {
    config.district = config.district.trim().to_lowercase();
    config.school_name = config.school_name.trim().to_lowercase();
    config.categories = config
        .categories
        .iter()
        .filter_map(|c| normalize_category(c))
        .collect();
    config
}

/// Parse the first wizard step's raw fields into a config.
pub fn config_from_input(
    district: &str,
    school_name: &str,
    meal_type: &str,
    categories: &[&str],
) -> Result<Config, ValidationError> {
    let meal_type = MealType::parse(meal_type).ok_or_else(|| {
        ValidationError::InvalidConfig(format!("unknown meal type '{}'", meal_type.trim()))
    })?;
    let config = normalize_config(Config::new(district, school_name, meal_type, categories));
    validate_config(&config)?;
    Ok(config)
}

/// Static checks that need no network.
pub fn validate_config(config: &Config) -> Result<(), ValidationError> {
    if config.district.is_empty() {
        return Err(ValidationError::InvalidConfig("district is required".into()));
    }
    if config.school_name.is_empty() {
        return Err(ValidationError::InvalidConfig("school name is required".into()));
    }
    if config.categories.is_empty() {
        return Err(ValidationError::InvalidConfig(
            "select at least one category".into(),
        ));
    }
    if let Some(unknown) = config
        .categories
        .iter()
        .find(|c| !CATEGORIES.contains(&c.as_str()))
    {
        return Err(ValidationError::InvalidConfig(format!(
            "unknown category '{}'",
            unknown
        )));
    }
    if config.poll_interval_minutes == 0 {
        return Err(ValidationError::InvalidConfig(
            "poll interval must be at least one minute".into(),
        ));
    }
    if let Some(tz) = config.timezone.as_deref() {
        if crate::util::parse_timezone(tz).is_none() {
            return Err(ValidationError::InvalidConfig(format!(
                "unknown timezone '{}'",
                tz
            )));
        }
    }
    Ok(())
}

/// Probe the API with the configured district/school/meal type.
pub async fn validate_connection(source: &dyn WeekSource) -> Result<(), ValidationError> {
    let (y, m, d) = PROBE_DATE;
    let probe = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| ValidationError::InvalidConfig("bad probe date".into()))?;

    match source.probe_week(probe).await {
        Ok(0) => Err(ValidationError::InvalidInput(
            "Invalid data received. Check District/School Name.".into(),
        )),
        Ok(_) => Ok(()),
        Err(MenuError::Status { status }) => {
            log::error!("Failed to fetch Nutrislice data: {}", status);
            Err(ValidationError::InvalidInput(format!(
                "Could not connect to Nutrislice API ({}). Check District/School Name.",
                status
            )))
        }
        Err(e) => Err(ValidationError::CannotConnect(e.to_string())),
    }
}

/// Full wizard check: static validation, then a live probe.
pub async fn validate_input(config: &Config) -> Result<SetupInfo, ValidationError> {
    validate_config(config)?;
    let client =
        MenuClient::new(config).map_err(|e| ValidationError::InvalidInput(e.to_string()))?;
    validate_connection(&client).await?;

    Ok(SetupInfo {
        title: entry_title(&config.school_name, config.meal_type),
        unique_id: unique_id(config),
    })
}

/// e.g. "Nutrislice: Elementary School - Lunch"
pub fn entry_title(school_name: &str, meal_type: MealType) -> String {
    format!(
        "Nutrislice: {} - {}",
        title_case(school_name),
        title_case(meal_type.as_str())
    )
}

/// One instance per district + school + meal type.
pub fn unique_id(config: &Config) -> String {
    format!(
        "{}_{}_{}",
        config.district, config.school_name, config.meal_type
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Day;

    #[test]
    fn test_config_from_input_normalizes() {
        let config =
            config_from_input(" My-District ", "Elementary-School", "Lunch", &["entree", "Sides"])
                .unwrap();
        assert_eq!(config.district, "my-district");
        assert_eq!(config.school_name, "elementary-school");
        assert_eq!(config.meal_type, MealType::Lunch);
        assert_eq!(config.categories, vec!["entree", "sides"]);
    }

    #[test]
    fn test_config_from_input_rejects_meal_type() {
        let err = config_from_input("d", "s", "dinner", &["entree"]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_config_requires_categories() {
        let err = config_from_input("d", "s", "lunch", &[]).unwrap_err();
        assert!(err.to_string().contains("at least one category"));
    }

    #[test]
    fn test_validate_config_rejects_blank_identifiers() {
        assert!(config_from_input("  ", "s", "lunch", &["entree"]).is_err());
        assert!(config_from_input("d", "", "lunch", &["entree"]).is_err());
    }

    #[test]
    fn test_validate_config_rejects_unknown_timezone() {
        let mut config = Config::new("d", "s", MealType::Lunch, &["entree"]);
        config.timezone = Some("Nowhere/Special".into());
        assert!(validate_config(&config).is_err());
        config.timezone = Some("America/New_York".into());
        assert!(validate_config(&config).is_ok());
    }

    struct CannedWeek(Result<usize, u16>);

    #[async_trait::async_trait]
    impl WeekSource for CannedWeek {
        async fn fetch_week(&self, week_of: NaiveDate) -> Result<Vec<Day>, MenuError> {
            match self.0 {
                Ok(n) => Ok((0..n)
                    .map(|i| Day {
                        date: week_of + chrono::Duration::days(i as i64),
                        items: Vec::new(),
                    })
                    .collect()),
                Err(status) => Err(MenuError::Status { status }),
            }
        }
    }

    #[tokio::test]
    async fn test_validate_connection_classifies_probe_result() {
        assert!(validate_connection(&CannedWeek(Ok(7))).await.is_ok());
        assert!(matches!(
            validate_connection(&CannedWeek(Ok(0))).await,
            Err(ValidationError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_connection(&CannedWeek(Err(404))).await,
            Err(ValidationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_entry_title_and_unique_id() {
        let config = Config::new("my-district", "elementary-school", MealType::Lunch, &["entree"]);
        assert_eq!(
            entry_title(&config.school_name, config.meal_type),
            "Nutrislice: Elementary School - Lunch"
        );
        assert_eq!(unique_id(&config), "my-district_elementary-school_lunch");
    }
}
