//! Commands invoked by the host on behalf of the user.
//!
//! Same contract as the rest of the command layer: `Result<T, String>` with a
//! message fit for display.

use chrono::{DateTime, Utc};

use crate::nutrislice::poller::{refresh, RefreshOutcome};
use crate::state::AppState;
use crate::types::MenuState;

/// Set the date the display state is computed for.
///
/// Accepts "today", "tomorrow" or `YYYY-MM-DD`. Malformed input is logged and
/// ignored: the current override stays as it was. On success the state is
/// recomputed from the cached timeline and republished, without a fetch.
pub fn set_target_date(state: &AppState, date: &str) -> Result<(), String> {
    let now = state.now();

    let resolved = {
        let mut sensor = state.sensor.lock();
        sensor.set_target_date(date, now.date())
    };

    match resolved {
        Ok(target) => {
            log::info!("Target date set to {}", target);
            state.publish(now);
            Ok(())
        }
        Err(e) => {
            log::error!("{}", e);
            Err(e.to_string())
        }
    }
}

/// Refresh the menu window now, outside the poll schedule.
pub async fn refresh_now(state: &AppState) -> Result<RefreshOutcome, String> {
    refresh(state).await.map_err(|e| e.to_string())
}

/// Ask the background poller to refresh at its next opportunity.
pub fn request_refresh(state: &AppState) {
    state.poller_wake.notify_one();
}

/// Recompute against the current wall clock (the 1 PM cutoff may have passed
/// since the last publish) and republish to subscribers.
pub fn recompute_state(state: &AppState) -> Option<MenuState> {
    state.publish(state.now())
}

/// Last published output, without recomputing.
pub fn get_menu_state(state: &AppState) -> Option<MenuState> {
    state.published()
}

pub fn get_last_error(state: &AppState) -> Option<String> {
    state.last_error.lock().clone()
}

/// When the last successful refresh finished.
pub fn get_last_refreshed(state: &AppState) -> Option<DateTime<Utc>> {
    *state.last_refreshed.lock()
}
