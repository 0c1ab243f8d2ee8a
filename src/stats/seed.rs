//! Sample data for trying the dashboard on an empty store

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::event::HistoryEntry;
use super::keys::{self, date_str};
use super::store::{KeyValueStore, StoreError};

const GAME_COUNTS: [(&str, u32); 3] = [("city-dx", 5), ("robot-solution", 7), ("it-operations-excellence", 3)];
const EVENT_COUNTS: [(&str, u32); 3] = [("game_selection", 8), ("output_generation", 5), ("evaluation", 2)];
const ACCESS_KEY_COUNTS: [(&str, u32); 3] = [("demo****", 8), ("work****", 5), ("test****", 2)];
const TODAY_TOTAL: u32 = 15;
const HISTORY_ENTRIES: i64 = 10;

/// Write counters for today, ten history entries five minutes apart, per-key
/// stats and random daily totals (0 to 5) for the previous 30 days.
/// Returns the number of keys written.
pub fn insert_test_data<R: Rng + ?Sized>(
    store: &dyn KeyValueStore,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<usize, StoreError> {
    let today = date_str(now.date_naive());
    let mut written = 0;

    store.set(&keys::daily(&today), &TODAY_TOTAL.to_string())?;
    written += 1;

    for (game_id, count) in GAME_COUNTS {
        store.set(&keys::game(game_id, &today), &count.to_string())?;
        written += 1;
    }

    for (event_type, count) in EVENT_COUNTS {
        store.set(&keys::event_type(event_type, &today), &count.to_string())?;
        written += 1;
    }

    for i in 0..HISTORY_ENTRIES {
        let idx = i as usize % GAME_COUNTS.len();
        let entry = HistoryEntry {
            timestamp: (now - Duration::minutes(5 * i)).timestamp_millis(),
            event_type: "game_selection".to_string(),
            game_id: Some(GAME_COUNTS[idx].0.to_string()),
            access_key: Some(ACCESS_KEY_COUNTS[idx].0.to_string()),
            success: Some(true),
            error: None,
            location: None,
        };
        let raw = serde_json::to_string(&entry).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        store.lpush(keys::HISTORY, &raw)?;
        written += 1;
    }
    store.ltrim(keys::HISTORY, 0, keys::HISTORY_LIMIT - 1)?;

    for (masked, count) in ACCESS_KEY_COUNTS {
        store.set(&keys::access_key_count(masked), &count.to_string())?;
        store.set(&keys::access_key_last_used(masked), &now.timestamp_millis().to_string())?;
        store.sadd(keys::ACCESS_KEYS, masked)?;
        written += 2;
    }

    for days_ago in 1..=30 {
        let date = date_str((now - Duration::days(days_ago)).date_naive());
        let count: u32 = rng.random_range(0..=5);
        if count > 0 {
            store.set(&keys::daily(&date), &count.to_string())?;
            written += 1;
        }
    }

    Ok(written)
}
