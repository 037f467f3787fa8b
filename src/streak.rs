use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::dates::to_date_key;
use crate::store::{KvStore, STREAK_KEY};

/// Streaks worth celebrating, in ascending order.
pub const MILESTONES: [u32; 6] = [3, 7, 14, 30, 50, 100];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub streak: u32,
    /// Day key of the most recent logged day, or empty when streak is 0.
    #[serde(rename = "lastLogDate")]
    pub last_log_date: String,
}

impl Default for StreakRecord {
    fn default() -> Self {
        StreakRecord {
            streak: 0,
            last_log_date: String::new(),
        }
    }
}

/// Outcome of one logging event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakUpdate {
    pub record: StreakRecord,
    /// Set when this event advanced the streak onto a milestone value.
    /// A same-day re-log never re-fires a milestone.
    pub milestone: Option<u32>,
}

/// Consecutive-day streak counter over the persisted record.
pub struct StreakTracker;

impl StreakTracker {
    /// Load the record, falling back to the default on any store problem.
    pub fn load(store: &dyn KvStore) -> StreakRecord {
        match store.get(STREAK_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                eprintln!("Could not parse streak data: {}", e);
                StreakRecord::default()
            }),
            Ok(None) => StreakRecord::default(),
            Err(e) => {
                eprintln!("Could not load streak data: {}", e);
                StreakRecord::default()
            }
        }
    }

    fn save(store: &mut dyn KvStore, record: &StreakRecord) {
        match serde_json::to_string(record) {
            Ok(serialized) => {
                if let Err(e) = store.set(STREAK_KEY, &serialized) {
                    eprintln!("Could not save streak data: {}", e);
                }
            }
            Err(e) => eprintln!("Could not serialize streak data: {}", e),
        }
    }

    /// Record one logging event at `now`.
    ///
    /// Same local day: no-op. Day after the last logged day: streak extends
    /// by one. Anything else (gap, or the very first log): streak resets
    /// to 1. The updated record is persisted before returning.
    pub fn record_log_event(store: &mut dyn KvStore, now: DateTime<Local>) -> StreakUpdate {
        let today_key = to_date_key(now);
        let current = Self::load(store);

        if current.last_log_date == today_key {
            // Already logged today; streak does not change.
            return StreakUpdate {
                record: current,
                milestone: None,
            };
        }

        let yesterday_key = to_date_key(now - Duration::days(1));
        let new_streak = if current.last_log_date == yesterday_key {
            current.streak + 1
        } else {
            1
        };

        let record = StreakRecord {
            streak: new_streak,
            last_log_date: today_key,
        };
        Self::save(store, &record);

        let milestone = MILESTONES.contains(&new_streak).then_some(new_streak);
        StreakUpdate { record, milestone }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKvStore;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_first_log_starts_streak_at_one() {
        let mut store = MemoryKvStore::new();
        let update = StreakTracker::record_log_event(&mut store, day(1));
        assert_eq!(update.record.streak, 1);
        assert_eq!(update.record.last_log_date, "2024-06-01");
        assert_eq!(update.milestone, None);
    }

    #[test]
    fn test_same_day_logging_is_idempotent() {
        let mut store = MemoryKvStore::new();
        let first = StreakTracker::record_log_event(&mut store, day(1));
        let second =
            StreakTracker::record_log_event(&mut store, day(1) + Duration::hours(5));
        assert_eq!(first.record, second.record);
        assert_eq!(second.milestone, None);
    }

    #[test]
    fn test_consecutive_days_extend_streak() {
        let mut store = MemoryKvStore::new();
        let streaks: Vec<u32> = (1..=3)
            .map(|d| StreakTracker::record_log_event(&mut store, day(d)).record.streak)
            .collect();
        assert_eq!(streaks, vec![1, 2, 3]);
    }

    #[test]
    fn test_gap_resets_streak() {
        let mut store = MemoryKvStore::new();
        let first = StreakTracker::record_log_event(&mut store, day(1));
        let after_gap = StreakTracker::record_log_event(&mut store, day(3));
        assert_eq!(first.record.streak, 1);
        assert_eq!(after_gap.record.streak, 1);
        assert_eq!(after_gap.record.last_log_date, "2024-06-03");
    }

    #[test]
    fn test_milestone_fires_exactly_on_membership() {
        let mut store = MemoryKvStore::new();
        let mut milestones = Vec::new();
        for d in 1..=4 {
            milestones.push(StreakTracker::record_log_event(&mut store, day(d)).milestone);
        }
        assert_eq!(milestones, vec![None, None, Some(3), None]);
    }

    #[test]
    fn test_milestone_not_refired_on_same_day_relog() {
        let mut store = MemoryKvStore::new();
        for d in 1..=3 {
            StreakTracker::record_log_event(&mut store, day(d));
        }
        // Streak is 3; logging again the same day must not re-signal.
        let relog = StreakTracker::record_log_event(&mut store, day(3) + Duration::hours(2));
        assert_eq!(relog.record.streak, 3);
        assert_eq!(relog.milestone, None);
    }

    #[test]
    fn test_corrupt_record_falls_back_to_default() {
        let mut store = MemoryKvStore::new();
        store.set(STREAK_KEY, "garbage").unwrap();
        let update = StreakTracker::record_log_event(&mut store, day(1));
        assert_eq!(update.record.streak, 1);
    }

    #[test]
    fn test_default_record_invariant() {
        let record = StreakRecord::default();
        assert_eq!(record.streak, 0);
        assert!(record.last_log_date.is_empty());
    }
}
