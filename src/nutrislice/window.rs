//! Three-week fetch window.
//!
//! Fetches previous, current and next week concurrently. The current week is
//! mandatory: any failure there fails the cycle. Adjacent weeks degrade to
//! `WeekSnapshot::Absent` (a district may not have published next week yet).

use chrono::NaiveDate;

use super::client::WeekSource;
use crate::error::MenuError;
use crate::types::{Day, Snapshot3, WeekRole, WeekSnapshot};

/// Offset between the current week's anchor date and its neighbours.
const WEEK_DAYS: i64 = 7;

/// The anchor date requested for each role.
pub fn window_dates(today: NaiveDate) -> [(WeekRole, NaiveDate); 3] {
    let week = chrono::Duration::days(WEEK_DAYS);
    [
        (WeekRole::Previous, today - week),
        (WeekRole::Current, today),
        (WeekRole::Next, today + week),
    ]
}

/// Fetch the window around `today`.
///
/// All three requests are in flight together and combined only after each
/// has settled. No retries; the next scheduled refresh is the retry.
pub async fn fetch_window(
    source: &dyn WeekSource,
    today: NaiveDate,
) -> Result<Snapshot3, MenuError> {
    let [(_, previous_date), (_, current_date), (_, next_date)] = window_dates(today);

    let (previous, current, next) = tokio::join!(
        source.fetch_week(previous_date),
        source.fetch_week(current_date),
        source.fetch_week(next_date),
    );

    let current = current.map_err(|e| {
        log::warn!("Nutrislice: error fetching {}: {}", WeekRole::Current.as_str(), e);
        e
    })?;

    Ok(Snapshot3 {
        previous: optional_week(WeekRole::Previous, previous),
        current,
        next: optional_week(WeekRole::Next, next),
    })
}

fn optional_week(role: WeekRole, result: Result<Vec<Day>, MenuError>) -> WeekSnapshot {
    match result {
        Ok(days) => WeekSnapshot::Present(days),
        Err(e) => {
            log::debug!("Nutrislice: could not fetch {}: {}", role.as_str(), e);
            WeekSnapshot::Absent
        }
    }
}
