//! Three-week timeline merge
//!
//! Adjacent Nutrislice weeks can overlap (a fetch for a Sunday may return a
//! week that another role also covers). The merged timeline keeps exactly one
//! Day per date. Precedence is current → previous → next: the current week is
//! the source of truth for any date it contains, and the first version seen in
//! that order wins.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{Day, Snapshot3, WeekRole};

/// Order in which roles claim dates.
const PRECEDENCE: [WeekRole; 3] = [WeekRole::Current, WeekRole::Previous, WeekRole::Next];

fn days_for(snapshot: &Snapshot3, role: WeekRole) -> &[Day] {
    match role {
        WeekRole::Previous => snapshot.previous.days(),
        WeekRole::Current => &snapshot.current,
        WeekRole::Next => snapshot.next.days(),
    }
}

/// Merge the three weekly snapshots into one ascending, deduplicated timeline.
pub fn build_timeline(snapshot: &Snapshot3) -> Vec<Day> {
    let mut by_date: BTreeMap<NaiveDate, &Day> = BTreeMap::new();

    for role in PRECEDENCE {
        for day in days_for(snapshot, role) {
            by_date.entry(day.date).or_insert(day);
        }
    }

    by_date.into_values().cloned().collect()
}

/// Locate the Day for a date in a timeline built by `build_timeline`.
pub fn find_day(timeline: &[Day], date: NaiveDate) -> Option<&Day> {
    timeline
        .binary_search_by(|d| d.date.cmp(&date))
        .ok()
        .map(|idx| &timeline[idx])
}
