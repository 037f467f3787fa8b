use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::dates::to_date_key;
use crate::store::{KvStore, MOOD_HISTORY_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Anxious,
    Stressed,
    Calm,
}

/// All moods, in declaration order. This order doubles as the documented
/// tie-break priority when insight counts are equal.
pub const ALL_MOODS: [Mood; 5] = [
    Mood::Happy,
    Mood::Sad,
    Mood::Anxious,
    Mood::Stressed,
    Mood::Calm,
];

impl Mood {
    /// Position in the fixed priority order.
    pub fn priority(&self) -> usize {
        ALL_MOODS.iter().position(|m| m == self).unwrap_or(ALL_MOODS.len())
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mood::Happy => write!(f, "Happy"),
            Mood::Sad => write!(f, "Sad"),
            Mood::Anxious => write!(f, "Anxious"),
            Mood::Stressed => write!(f, "Stressed"),
            Mood::Calm => write!(f, "Calm"),
        }
    }
}

impl std::str::FromStr for Mood {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "happy" => Ok(Mood::Happy),
            "sad" => Ok(Mood::Sad),
            "anxious" => Ok(Mood::Anxious),
            "stressed" => Ok(Mood::Stressed),
            "calm" => Ok(Mood::Calm),
            _ => Err(anyhow::anyhow!("Unknown mood: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood: Mood,
    /// Local day key, YYYY-MM-DD.
    pub date: String,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
}

/// Historical entries may predate the timestamp field.
#[derive(Debug, Deserialize)]
struct StoredMoodEntry {
    mood: Mood,
    date: String,
    #[serde(default)]
    timestamp: Option<i64>,
}

/// Append-only mood-event log. Insertion order is chronological for entries
/// created by this process.
#[derive(Debug, Clone, Default)]
pub struct MoodLog {
    pub entries: Vec<MoodEntry>,
}

impl MoodLog {
    /// Load the log from the store, backfilling timestamps for old entries.
    ///
    /// Store or parse failures fall back to an empty log; they are logged
    /// and never surfaced.
    pub fn load(store: &dyn KvStore) -> Self {
        let raw = match store.get(MOOD_HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return MoodLog::default(),
            Err(e) => {
                eprintln!("Could not load mood history: {}", e);
                return MoodLog::default();
            }
        };

        let stored: Vec<StoredMoodEntry> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                eprintln!("Could not parse mood history: {}", e);
                return MoodLog::default();
            }
        };

        let entries = stored
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let timestamp = entry
                    .timestamp
                    .unwrap_or_else(|| synthetic_timestamp(&entry.date, index));
                MoodEntry {
                    mood: entry.mood,
                    date: entry.date,
                    timestamp,
                }
            })
            .collect();

        MoodLog { entries }
    }

    pub fn save(&self, store: &mut dyn KvStore) {
        match serde_json::to_string_pretty(&self.entries) {
            Ok(serialized) => {
                if let Err(e) = store.set(MOOD_HISTORY_KEY, &serialized) {
                    eprintln!("Could not save mood history: {}", e);
                }
            }
            Err(e) => eprintln!("Could not serialize mood history: {}", e),
        }
    }

    /// Append a new entry for `mood` at `now`.
    pub fn append(&mut self, mood: Mood, now: DateTime<Local>) {
        self.entries.push(MoodEntry {
            mood,
            date: to_date_key(now),
            timestamp: now.timestamp_millis(),
        });
    }
}

/// Migration rule for entries without a timestamp: local noon of their date
/// plus the entry's index in milliseconds, so relative order is preserved
/// and timestamps stay unique.
fn synthetic_timestamp(date: &str, index: usize) -> i64 {
    let noon = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).single());

    match noon {
        Some(noon) => (noon + Duration::milliseconds(index as i64)).timestamp_millis(),
        None => index as i64,
    }
}
