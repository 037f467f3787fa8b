use chrono::{DateTime, Local};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::dates::to_date_key;
use crate::store::{KvStore, QUOTE_KEY};

pub const MOTIVATIONAL_QUOTES: [&str; 10] = [
    "You don't have to control your thoughts. You just have to stop letting them control you.",
    "Almost everything will work again if you unplug it for a few minutes, including you.",
    "Feelings are just visitors. Let them come and go.",
    "Be gentle with yourself, you're doing the best you can.",
    "Nothing diminishes anxiety faster than action.",
    "Small steps every day add up to big changes.",
    "You are allowed to be both a masterpiece and a work in progress.",
    "Rest is not idleness. It is part of the work.",
    "This too shall pass. It might pass like a kidney stone, but it will pass.",
    "Breathe. You are exactly where you need to be.",
];

/// Daily-quote cache, keyed by local day. Regenerated when the stored date
/// is not today's day key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuote {
    pub quote: String,
    /// Day key, YYYY-MM-DD.
    pub date: String,
}

/// Return today's quote, picking and caching a fresh one when the cache is
/// missing, stale or unreadable.
pub fn daily_quote(store: &mut dyn KvStore, now: DateTime<Local>) -> StoredQuote {
    let today_key = to_date_key(now);

    match store.get(QUOTE_KEY) {
        Ok(Some(raw)) => {
            if let Ok(stored) = serde_json::from_str::<StoredQuote>(&raw) {
                if stored.date == today_key {
                    return stored;
                }
            }
        }
        Ok(None) => {}
        Err(e) => eprintln!("Could not load daily quote: {}", e),
    }

    let quote = MOTIVATIONAL_QUOTES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(MOTIVATIONAL_QUOTES[0])
        .to_string();
    let fresh = StoredQuote {
        quote,
        date: today_key,
    };

    match serde_json::to_string(&fresh) {
        Ok(serialized) => {
            if let Err(e) = store.set(QUOTE_KEY, &serialized) {
                eprintln!("Could not save daily quote: {}", e);
            }
        }
        Err(e) => eprintln!("Could not serialize daily quote: {}", e),
    }

    fresh
}
