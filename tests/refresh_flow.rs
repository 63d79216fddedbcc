//! End-to-end refresh flow against a mock Nutrislice server.
//!
//! The instance reads the wall clock, so each test pins the config to a
//! fixed-offset zone where it is currently morning. "Today" is then at least
//! an hour from midnight and before the 1 PM cutoff for the whole test.

use chrono::{Duration, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use nutrislice_lib::commands;
use nutrislice_lib::error::ValidationError;
use nutrislice_lib::state;
use nutrislice_lib::types::{Config, MealType};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn week_path(date: NaiveDate) -> String {
    format!(
        "/menu/api/weeks/school/elementary-school/menu-type/lunch/{}/",
        date.format("%Y/%m/%d")
    )
}

fn entree(name: &str) -> serde_json::Value {
    json!({ "is_holiday": false, "text": "", "category": "entree",
            "food": { "name": name, "food_category": "entree" } })
}

fn current_week_body(today: NaiveDate) -> serde_json::Value {
    let tomorrow = today + Duration::days(1);
    json!({
        "days": [
            { "date": today.to_string(), "menu_items": [entree("Pizza"), entree("Tacos")] },
            { "date": tomorrow.to_string(), "menu_items": [
                { "is_holiday": false, "text": "", "category": "",
                  "food": { "name": "Menu Subject to Change", "food_category": "" } }
            ] }
        ]
    })
}

/// Probe week + current week answer; adjacent weeks 404.
async fn mount_school(server: &MockServer, today: NaiveDate) {
    Mock::given(method("GET"))
        .and(path(week_path(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "days": [{ "date": "2023-01-01" }] })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(week_path(today)))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_week_body(today)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/menu/api/weeks/"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(10)
        .mount(server)
        .await;
}

/// A fixed-offset zone whose local hour is between 1 AM and 11 AM, and
/// today's date there.
fn morning_zone() -> (String, NaiveDate) {
    for offset in -12i32..=12 {
        let name = match offset {
            0 => "Etc/GMT".to_string(),
            o if o > 0 => format!("Etc/GMT+{}", o),
            o => format!("Etc/GMT{}", o),
        };
        let tz: Tz = name.parse().unwrap();
        let now = Utc::now().with_timezone(&tz);
        if (1..=11).contains(&now.hour()) {
            return (name, now.date_naive());
        }
    }
    unreachable!("25 consecutive offsets cover every hour")
}

fn config_for(server: &MockServer, zone: &str) -> Config {
    let mut config = Config::new(
        "my-district",
        "elementary-school",
        MealType::Lunch,
        &["entree", "fruit"],
    );
    config.base_url = Some(server.uri());
    config.timezone = Some(zone.to_string());
    config
}

#[tokio::test]
async fn test_setup_publishes_with_adjacent_weeks_absent() {
    let server = MockServer::start().await;
    let (zone, today) = morning_zone();
    mount_school(&server, today).await;

    let instance = state::setup(config_for(&server, &zone)).await.unwrap();

    let published = instance.published().expect("first refresh publishes");
    assert_eq!(published.attributes.target_date, today.to_string());
    assert_eq!(published.state, "2 Entrees Available");
    assert_eq!(published.attributes.days.len(), 2);
    assert_eq!(published.attributes.today_menu, "Pizza, Tacos");
    assert_eq!(published.attributes.tomorrow_menu, "No menu");
    assert!(!published.attributes.days[1].has_menu);

    let info = instance.setup_info.as_ref().expect("setup keeps title and id");
    assert_eq!(info.title, "Nutrislice: Elementary School - Lunch");
    assert_eq!(info.unique_id, "my-district_elementary-school_lunch");
    assert!(commands::get_last_refreshed(&instance).is_some());
}

#[tokio::test]
async fn test_set_date_recomputes_without_fetch() {
    let server = MockServer::start().await;
    let (zone, today) = morning_zone();
    mount_school(&server, today).await;

    let instance = state::setup(config_for(&server, &zone)).await.unwrap();
    let requests_after_setup = server.received_requests().await.unwrap().len();

    commands::set_target_date(&instance, &today.to_string()).unwrap();
    let published = instance.published().unwrap();
    assert_eq!(published.state, "2 Entrees Available");
    assert_eq!(published.attributes.target_date, today.to_string());

    commands::set_target_date(&instance, "tomorrow").unwrap();
    let published = instance.published().unwrap();
    assert_eq!(published.state, "No Entrees/Weekend");
    assert_eq!(
        published.attributes.target_date,
        (today + Duration::days(1)).to_string()
    );

    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_after_setup
    );
}

#[tokio::test]
async fn test_malformed_set_date_keeps_override() {
    let server = MockServer::start().await;
    let (zone, today) = morning_zone();
    mount_school(&server, today).await;

    let instance = state::setup(config_for(&server, &zone)).await.unwrap();
    let past = today - Duration::days(30);
    commands::set_target_date(&instance, &past.to_string()).unwrap();

    assert!(commands::set_target_date(&instance, "02/17/2026").is_err());

    let published = instance.published().unwrap();
    assert_eq!(published.attributes.target_date, past.to_string());
    assert_eq!(published.state, "unknown");
}

#[tokio::test]
async fn test_current_week_failure_keeps_published_output() {
    let server = MockServer::start().await;
    let (zone, today) = morning_zone();
    mount_school(&server, today).await;

    let instance = state::setup(config_for(&server, &zone)).await.unwrap();
    let before = instance.published();

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = commands::refresh_now(&instance).await.unwrap_err();
    assert!(err.contains("500"));
    assert_eq!(instance.published(), before);
    assert!(commands::get_last_error(&instance).is_some());
}

#[tokio::test]
async fn test_setup_fails_when_current_week_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(week_path(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "days": [{ "date": "2023-01-01" }] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .with_priority(10)
        .mount(&server)
        .await;

    let (zone, _) = morning_zone();
    let err = state::setup(config_for(&server, &zone)).await.err().unwrap();
    assert!(matches!(err, ValidationError::CannotConnect(_)));
}
