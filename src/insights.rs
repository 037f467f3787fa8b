use chrono::{DateTime, Duration, Local};
use serde::Serialize;

use crate::dates::local_midnight;
use crate::mood::{Mood, MoodEntry, ALL_MOODS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodCount {
    pub mood: Mood,
    pub count: usize,
}

/// Aggregate mood-frequency summary over one window. Derived on demand,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodInsight {
    pub total_entries: usize,
    pub most_frequent_mood: Option<Mood>,
    /// Sorted descending by count; ties broken by the fixed mood priority
    /// order (declaration order of `Mood`).
    pub mood_counts: Vec<MoodCount>,
}

impl PeriodInsight {
    fn empty() -> Self {
        PeriodInsight {
            total_entries: 0,
            most_frequent_mood: None,
            mood_counts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodInsights {
    pub last_7_days: PeriodInsight,
    pub last_30_days: PeriodInsight,
}

/// Summarize the entries of the last `window_days` days before `now`.
///
/// The window starts at local midnight of `now` minus `window_days` days,
/// so "7 days" means the current partial day plus the 7 calendar days
/// before it.
pub fn summarize(log: &[MoodEntry], window_days: i64, now: DateTime<Local>) -> PeriodInsight {
    let cutoff = (local_midnight(now) - Duration::days(window_days)).timestamp_millis();

    let relevant: Vec<&MoodEntry> = log
        .iter()
        .filter(|entry| entry.timestamp >= cutoff)
        .collect();

    if relevant.is_empty() {
        return PeriodInsight::empty();
    }

    let mut counts = [0usize; ALL_MOODS.len()];
    for entry in &relevant {
        counts[entry.mood.priority()] += 1;
    }

    let mut mood_counts: Vec<MoodCount> = ALL_MOODS
        .iter()
        .zip(counts.iter())
        .filter(|&(_, &count)| count > 0)
        .map(|(&mood, &count)| MoodCount { mood, count })
        .collect();

    // Stable sort over the priority-ordered groups keeps the documented
    // tie-break deterministic.
    mood_counts.sort_by(|a, b| b.count.cmp(&a.count));

    let most_frequent_mood = mood_counts.first().map(|mc| mc.mood);

    PeriodInsight {
        total_entries: relevant.len(),
        most_frequent_mood,
        mood_counts,
    }
}

/// The two windows callers need, computed independently from the same log.
pub fn generate_insights(log: &[MoodEntry], now: DateTime<Local>) -> MoodInsights {
    MoodInsights {
        last_7_days: summarize(log, 7, now),
        last_30_days: summarize(log, 30, now),
    }
}
