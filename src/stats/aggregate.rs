//! Read-side views over the stats store.
//!
//! Every fan-out read goes through [`KeyValueStore::get_many`]. A key that fails
//! to read is logged and counted as zero; one bad key never fails a whole view.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::keys::{self, date_str, last_days};
use super::store::KeyValueStore;

pub const WEEK_DAYS: u32 = 7;
pub const MONTH_DAYS: u32 = 30;
pub const ERROR_LOG_DAYS: u32 = 7;
pub const ERROR_LOG_VIEW_LIMIT: usize = 10;
pub const HISTORY_VIEW_LIMIT: i64 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: u64,
    pub today: u64,
    pub week: u64,
    pub month: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStat {
    pub game_id: String,
    pub game_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyStat {
    pub access_key: String,
    pub count: u64,
    pub last_used: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeStat {
    pub event_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub summary: Summary,
    pub game_stats: Vec<GameStat>,
    pub time_series: Vec<DailyCount>,
    pub access_key_stats: Vec<AccessKeyStat>,
    pub event_type_stats: Vec<EventTypeStat>,
    pub error_logs: Vec<Value>,
    pub history: Vec<Value>,
    /// Unix millis when the report was built
    pub timestamp: i64,
}

/// Counts for `keys`, in order. Missing, unreadable and unparsable values count as 0.
pub fn read_counts(store: &dyn KeyValueStore, keys: &[String]) -> Vec<u64> {
    store
        .get_many(keys)
        .into_iter()
        .zip(keys)
        .map(|(result, key)| match result {
            Ok(None) => 0,
            Ok(Some(value)) => value.trim().parse::<u64>().unwrap_or_else(|_| {
                log::warn!("Stats key {} holds a non-numeric value '{}'", key, value);
                0
            }),
            Err(e) => {
                log::error!("Failed to read stats key {}: {}", key, e);
                0
            }
        })
        .collect()
}

/// `total` is the history length, `today`, `week` and `month` sum the daily counters
pub fn summary(store: &dyn KeyValueStore, today: NaiveDate) -> Summary {
    let daily = daily_counts(store, today);
    let total = store.llen(keys::HISTORY).unwrap_or_else(|e| {
        log::error!("Failed to read history length: {}", e);
        0
    });

    Summary {
        total: total as u64,
        today: daily.first().copied().unwrap_or(0),
        week: daily.iter().take(WEEK_DAYS as usize).sum(),
        month: daily.iter().sum(),
    }
}

/// Daily counters for the last 30 days, newest first
fn daily_counts(store: &dyn KeyValueStore, today: NaiveDate) -> Vec<u64> {
    let day_keys: Vec<String> = last_days(today, MONTH_DAYS)
        .into_iter()
        .map(|d| keys::daily(&date_str(d)))
        .collect();
    read_counts(store, &day_keys)
}

/// 30-day totals per game, highest first. Ties keep the order of `games`.
pub fn game_stats(store: &dyn KeyValueStore, games: &[(String, String)], today: NaiveDate) -> Vec<GameStat> {
    let dates: Vec<String> = last_days(today, MONTH_DAYS).into_iter().map(date_str).collect();
    let game_keys: Vec<String> = games
        .iter()
        .flat_map(|(game_id, _)| dates.iter().map(move |date| keys::game(game_id, date)))
        .collect();
    let counts = read_counts(store, &game_keys);

    let mut stats: Vec<GameStat> = games
        .iter()
        .zip(counts.chunks(dates.len().max(1)))
        .map(|((game_id, game_name), chunk)| GameStat {
            game_id: game_id.clone(),
            game_name: game_name.clone(),
            count: chunk.iter().sum(),
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

/// One point per day for the last 30 days, oldest first
pub fn time_series(store: &dyn KeyValueStore, today: NaiveDate) -> Vec<DailyCount> {
    let dates = last_days(today, MONTH_DAYS);
    let counts = daily_counts(store, today);

    dates
        .into_iter()
        .zip(counts)
        .rev()
        .map(|(date, count)| DailyCount {
            date: date_str(date),
            count,
        })
        .collect()
}

/// Every access key seen so far, most used first
pub fn access_key_stats(store: &dyn KeyValueStore) -> Vec<AccessKeyStat> {
    let members = store.smembers(keys::ACCESS_KEYS).unwrap_or_else(|e| {
        log::error!("Failed to read access key set: {}", e);
        Vec::new()
    });

    let count_keys: Vec<String> = members.iter().map(|k| keys::access_key_count(k)).collect();
    let last_used_keys: Vec<String> = members.iter().map(|k| keys::access_key_last_used(k)).collect();
    let counts = read_counts(store, &count_keys);
    let last_used = store.get_many(&last_used_keys);

    let mut stats: Vec<AccessKeyStat> = members
        .into_iter()
        .zip(counts)
        .zip(last_used)
        .map(|((access_key, count), last_used)| AccessKeyStat {
            last_used: match last_used {
                Ok(value) => value.and_then(|v| v.trim().parse().ok()),
                Err(e) => {
                    log::error!("Failed to read lastUsed for {}: {}", access_key, e);
                    None
                }
            },
            access_key,
            count,
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

/// 30-day totals for the event types the game emits
pub fn event_type_stats(store: &dyn KeyValueStore, today: NaiveDate) -> Vec<EventTypeStat> {
    let dates: Vec<String> = last_days(today, MONTH_DAYS).into_iter().map(date_str).collect();

    keys::KNOWN_EVENT_TYPES
        .iter()
        .map(|event_type| {
            let type_keys: Vec<String> = dates.iter().map(|d| keys::event_type(event_type, d)).collect();
            EventTypeStat {
                event_type: event_type.to_string(),
                count: read_counts(store, &type_keys).iter().sum(),
            }
        })
        .collect()
}

/// Error entries of the last 7 days, newest first
pub fn error_logs(store: &dyn KeyValueStore, today: NaiveDate, limit: usize) -> Vec<Value> {
    let mut logs: Vec<Value> = last_days(today, ERROR_LOG_DAYS)
        .into_iter()
        .flat_map(|date| {
            let key = keys::errors(&date_str(date));
            store.lrange(&key, 0, -1).unwrap_or_else(|e| {
                log::error!("Failed to read {}: {}", key, e);
                Vec::new()
            })
        })
        .filter_map(|raw| parse_entry(&raw))
        .collect();

    logs.sort_by_key(|entry| std::cmp::Reverse(entry_timestamp(entry)));
    logs.truncate(limit);
    logs
}

/// Latest history entries, newest first
pub fn history(store: &dyn KeyValueStore, limit: i64) -> Vec<Value> {
    store
        .lrange(keys::HISTORY, 0, limit - 1)
        .unwrap_or_else(|e| {
            log::error!("Failed to read history: {}", e);
            Vec::new()
        })
        .iter()
        .filter_map(|raw| parse_entry(raw))
        .collect()
}

/// Build every view for the day of `now` (UTC)
pub fn build_report(store: &dyn KeyValueStore, games: &[(String, String)], now: DateTime<Utc>) -> StatsReport {
    let today = now.date_naive();

    StatsReport {
        summary: summary(store, today),
        game_stats: game_stats(store, games, today),
        time_series: time_series(store, today),
        access_key_stats: access_key_stats(store),
        event_type_stats: event_type_stats(store, today),
        error_logs: error_logs(store, today, ERROR_LOG_VIEW_LIMIT),
        history: history(store, HISTORY_VIEW_LIMIT),
        timestamp: now.timestamp_millis(),
    }
}

fn parse_entry(raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Failed to parse stats entry: {}", e);
            None
        }
    }
}

fn entry_timestamp(entry: &Value) -> i64 {
    entry.get("timestamp").and_then(Value::as_i64).unwrap_or(0)
}
