//! Background menu refresh poller.
//!
//! Sleeps `poll_interval_minutes` between cycles, or wakes early when a manual
//! refresh is requested through `AppState::poller_wake`.

use std::sync::Arc;

use chrono::Utc;

use super::window::fetch_window;
use crate::error::MenuError;
use crate::state::AppState;
use crate::timeline::build_timeline;

/// What a refresh call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Window fetched, timeline replaced, state republished.
    Updated { days: usize },
    /// Another cycle was already in flight; nothing done.
    Skipped,
}

/// Run one refresh cycle.
///
/// On failure the cached timeline and published output are left as they
/// were, the error is recorded in `last_error` and returned to the caller.
/// It is recoverable: the next scheduled cycle tries again.
pub async fn refresh(state: &AppState) -> Result<RefreshOutcome, MenuError> {
    let Ok(_guard) = state.refresh_guard.try_lock() else {
        log::info!("Menu poller: refresh already in flight, skipping");
        return Ok(RefreshOutcome::Skipped);
    };

    let now = state.now();
    match fetch_window(state.source.as_ref(), now.date()).await {
        Ok(snapshot) => {
            let timeline = build_timeline(&snapshot);
            let days = timeline.len();
            log::info!(
                "Menu poller: merged {} days (previous week {}, next week {})",
                days,
                if snapshot.previous.is_present() { "present" } else { "absent" },
                if snapshot.next.is_present() { "present" } else { "absent" },
            );

            *state.timeline.lock() = Some(timeline);
            *state.last_error.lock() = None;
            *state.last_refreshed.lock() = Some(Utc::now());
            state.publish(now);

            Ok(RefreshOutcome::Updated { days })
        }
        Err(e) => {
            log::warn!(
                "Menu poller: refresh failed, keeping last published state: {}",
                e
            );
            *state.last_error.lock() = Some(e.to_string());
            Err(e)
        }
    }
}

pub async fn run_menu_poller(state: Arc<AppState>) {
    let poll_interval = state.config.poll_interval_minutes.max(1) as u64;

    loop {
        // Sleep until next poll or manual wake
        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(poll_interval * 60)) => {},
            _ = state.poller_wake.notified() => {
                log::info!("Menu poller: woken by manual refresh signal");
            },
        }

        match refresh(&state).await {
            Ok(RefreshOutcome::Updated { days }) => {
                log::info!("Menu poller: refreshed {} days", days);
            }
            Ok(RefreshOutcome::Skipped) => {}
            Err(e) if e.is_retryable() => {
                log::warn!("Menu poller: will retry next cycle: {}", e);
            }
            Err(e) => {
                log::error!("Menu poller: refresh failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::nutrislice::client::WeekSource;
    use crate::types::{Config, Day, MealType, MenuItem};

    /// Serves one entree per requested week until switched off.
    struct Toggle {
        up: AtomicBool,
    }

    #[async_trait]
    impl WeekSource for Toggle {
        async fn fetch_week(&self, week_of: NaiveDate) -> Result<Vec<Day>, MenuError> {
            if !self.up.load(Ordering::SeqCst) {
                return Err(MenuError::Network("connection refused".into()));
            }
            Ok(vec![Day {
                date: week_of,
                items: vec![MenuItem {
                    food_name: Some("Pizza".into()),
                    food_category: Some("entree".into()),
                    ..Default::default()
                }],
            }])
        }
    }

    fn state_with(source: Arc<Toggle>) -> AppState {
        let config = Config::new("d", "s", MealType::Lunch, &["entree"]);
        AppState::new(config, source)
    }

    #[tokio::test]
    async fn test_refresh_publishes_three_week_timeline() {
        let source = Arc::new(Toggle { up: AtomicBool::new(true) });
        let state = state_with(source);

        let outcome = refresh(&state).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Updated { days: 3 });
        assert!(state.published().is_some());
        assert!(state.last_error.lock().is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_published_state() {
        let source = Arc::new(Toggle { up: AtomicBool::new(true) });
        let state = state_with(source.clone());
        refresh(&state).await.unwrap();
        let before = state.published();

        source.up.store(false, Ordering::SeqCst);
        let err = refresh(&state).await.unwrap_err();
        assert!(err.is_retryable());

        assert_eq!(state.published(), before);
        assert_eq!(state.timeline.lock().as_ref().map(|t| t.len()), Some(3));
        assert!(state.last_error.lock().as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_skipped() {
        let source = Arc::new(Toggle { up: AtomicBool::new(true) });
        let state = state_with(source);

        let _held = state.refresh_guard.lock().await;
        assert_eq!(refresh(&state).await.unwrap(), RefreshOutcome::Skipped);
        assert!(state.published().is_none());
    }
}
