use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use tokio::sync::{watch, Notify};

use crate::error::{MenuError, ValidationError};
use crate::nutrislice::client::{MenuClient, WeekSource};
use crate::sensor::MenuSensor;
use crate::setup::SetupInfo;
use crate::types::{Config, Day, MenuState};

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "NUTRISLICE_CONFIG";

/// State for one configured school + meal type.
///
/// Menu data is kept in memory only. A failed refresh leaves both the cached
/// timeline and the published output untouched.
pub struct AppState {
    pub config: Config,
    pub sensor: Mutex<MenuSensor>,
    /// Merged timeline from the last successful refresh. `None` until then.
    pub timeline: Mutex<Option<Vec<Day>>>,
    pub last_error: Mutex<Option<String>>,
    pub last_refreshed: Mutex<Option<DateTime<Utc>>>,
    /// Title and unique id from setup validation. `None` for instances built
    /// directly with `new`.
    pub setup_info: Option<SetupInfo>,
    /// Wakes the poller for an immediate refresh.
    pub poller_wake: Notify,
    /// Held for the duration of a refresh cycle.
    pub(crate) refresh_guard: tokio::sync::Mutex<()>,
    pub(crate) source: Arc<dyn WeekSource>,
    published: watch::Sender<Option<MenuState>>,
    timezone: Option<Tz>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn WeekSource>) -> Self {
        let timezone = config.timezone.as_deref().and_then(|name| {
            let tz = crate::util::parse_timezone(name);
            if tz.is_none() {
                log::warn!("Unknown timezone '{}', using local time", name);
            }
            tz
        });
        let (published, _) = watch::channel(None);

        Self {
            sensor: Mutex::new(MenuSensor::new(config.clone())),
            config,
            timeline: Mutex::new(None),
            last_error: Mutex::new(None),
            last_refreshed: Mutex::new(None),
            setup_info: None,
            poller_wake: Notify::new(),
            refresh_guard: tokio::sync::Mutex::new(()),
            source,
            published,
            timezone,
        }
    }

    /// Build state backed by the real Nutrislice client.
    pub fn with_client(config: Config) -> Result<Self, MenuError> {
        let client = MenuClient::new(&config)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Wall-clock time in the instance's timezone.
    pub fn now(&self) -> NaiveDateTime {
        crate::util::wall_clock_now(self.timezone.as_ref())
    }

    /// Recompute state + attributes from the cached timeline and publish.
    ///
    /// Does nothing before the first successful refresh.
    pub fn publish(&self, now: NaiveDateTime) -> Option<MenuState> {
        let computed = {
            let timeline = self.timeline.lock();
            let timeline = timeline.as_ref()?;
            self.sensor.lock().compute(timeline, now)
        };

        self.published.send_replace(Some(computed.clone()));
        Some(computed)
    }

    /// Last published output.
    pub fn published(&self) -> Option<MenuState> {
        self.published.borrow().clone()
    }

    /// Receive every published output.
    pub fn subscribe(&self) -> watch::Receiver<Option<MenuState>> {
        self.published.subscribe()
    }
}

/// Set up an instance: validate config, check the district/school against the
/// API, then run the first refresh. Any failure blocks creation.
pub async fn setup(config: Config) -> Result<Arc<AppState>, ValidationError> {
    let info = crate::setup::validate_input(&config).await?;
    log::info!("Setting up {} ({})", info.title, info.unique_id);

    let mut state = AppState::with_client(config)
        .map_err(|e| ValidationError::InvalidInput(e.to_string()))?;
    state.setup_info = Some(info);
    let state = Arc::new(state);
    crate::nutrislice::poller::refresh(&state)
        .await
        .map_err(|e| ValidationError::CannotConnect(format!("first refresh failed: {}", e)))?;

    Ok(state)
}

/// Get the canonical config file path (~/.nutrislice/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".nutrislice").join("config.json"))
}

/// Load configuration from the canonical path
pub fn load_config() -> Result<Config, String> {
    let path = config_path()?;
    load_config_from(&path)
}

/// Load and normalize configuration from a file.
pub fn load_config_from(config_path: &Path) -> Result<Config, String> {
    if !config_path.exists() {
        return Err(format!(
            "Config file not found at {}. Create it with: {{ \"district\": \"...\", \"schoolName\": \"...\" }}",
            config_path.display()
        ));
    }

    let content =
        fs::read_to_string(config_path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: Config =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    let config = crate::setup::normalize_config(config);
    crate::setup::validate_config(&config).map_err(|e| e.to_string())?;

    Ok(config)
}
