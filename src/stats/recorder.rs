//! Writes usage events into the store

use chrono::DateTime;

use super::event::{ErrorEntry, HistoryEntry, StatsEvent};
use super::keys;
use super::store::{KeyValueStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Missing required fields: eventType, timestamp")]
    MissingFields,

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Record one event. Validation failures are reported before anything is written.
pub fn record_event(store: &dyn KeyValueStore, event: &StatsEvent) -> Result<(), RecordError> {
    let (Some(event_type), Some(timestamp)) = (
        event.event_type.as_deref().filter(|t| !t.is_empty()),
        event.timestamp.as_deref().filter(|t| !t.is_empty()),
    ) else {
        return Err(RecordError::MissingFields);
    };

    let millis = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| RecordError::InvalidTimestamp(timestamp.to_string()))?
        .timestamp_millis();
    // calendar day as written by the client, offset not applied
    let date = timestamp.get(..10).unwrap_or(timestamp);

    let history = HistoryEntry {
        timestamp: millis,
        event_type: event_type.to_string(),
        game_id: event.game_id.clone(),
        access_key: event.access_key.clone(),
        success: event.success,
        error: event.error.as_ref().and_then(|e| e.message.clone()),
        location: event.location.clone(),
    };
    store.lpush(keys::HISTORY, &to_json(&history))?;
    store.ltrim(keys::HISTORY, 0, keys::HISTORY_LIMIT - 1)?;

    store.incr(&keys::daily(date))?;

    if let Some(game_id) = event.game_id.as_deref().filter(|id| !id.is_empty()) {
        store.incr(&keys::game(game_id, date))?;
    }

    if event.is_error() {
        let entry = ErrorEntry {
            timestamp: millis,
            event_type: event_type.to_string(),
            game_id: event.game_id.clone(),
            location: event.location.clone(),
            error: event.error.clone(),
        };
        let key = keys::errors(date);
        store.lpush(&key, &to_json(&entry))?;
        store.ltrim(&key, 0, keys::ERROR_LOG_LIMIT - 1)?;
    }

    store.incr(&keys::event_type(event_type, date))?;

    if let Some(access_key) = event.access_key.as_deref().filter(|k| !k.is_empty()) {
        store.set(&keys::access_key_last_used(access_key), &millis.to_string())?;
        store.incr(&keys::access_key_count(access_key))?;
        store.sadd(keys::ACCESS_KEYS, access_key)?;
    }

    Ok(())
}

/// Fire-and-forget variant for server-side events: failures are logged, never returned
pub fn record_quietly(store: &dyn KeyValueStore, event: &StatsEvent) {
    if let Err(e) = record_event(store, event) {
        log::warn!(
            "Failed to record stats event {}: {}",
            event.event_type.as_deref().unwrap_or("?"),
            e
        );
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Failed to serialize stats entry: {}", e);
        "{}".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::event::EventError;
    use crate::stats::memory_store::MemoryStore;
    use assert_matches::assert_matches;

    fn event(event_type: &str, timestamp: &str) -> StatsEvent {
        StatsEvent {
            event_type: Some(event_type.to_string()),
            timestamp: Some(timestamp.to_string()),
            ..StatsEvent::default()
        }
    }

    #[test]
    fn test_missing_fields_write_nothing() {
        let store = MemoryStore::new();
        let mut no_timestamp = event("evaluation", "");
        no_timestamp.timestamp = None;
        assert_matches!(record_event(&store, &no_timestamp), Err(RecordError::MissingFields));
        assert_matches!(
            record_event(&store, &StatsEvent::default()),
            Err(RecordError::MissingFields)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_timestamp() {
        let store = MemoryStore::new();
        assert_matches!(
            record_event(&store, &event("evaluation", "yesterday")),
            Err(RecordError::InvalidTimestamp(_))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_counters_and_history() {
        let store = MemoryStore::new();
        let mut e = event("game_selection", "2025-01-15T09:30:00.000Z");
        e.game_id = Some("city-dx".to_string());
        e.access_key = Some("demo****".to_string());
        record_event(&store, &e).unwrap();
        record_event(&store, &e).unwrap();

        assert_eq!(store.get("stats:daily:2025-01-15").unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("stats:game:city-dx:2025-01-15").unwrap().as_deref(), Some("2"));
        assert_eq!(
            store.get("stats:eventType:game_selection:2025-01-15").unwrap().as_deref(),
            Some("2")
        );
        assert_eq!(store.get("stats:accessKey:demo****:count").unwrap().as_deref(), Some("2"));
        assert_eq!(
            store.get("stats:accessKey:demo****:lastUsed").unwrap().as_deref(),
            Some("1736933400000")
        );
        assert_eq!(store.smembers(keys::ACCESS_KEYS).unwrap(), vec!["demo****"]);
        assert_eq!(store.llen(keys::HISTORY).unwrap(), 2);
        assert_eq!(store.llen("stats:errors:2025-01-15").unwrap(), 0);

        let entry: HistoryEntry =
            serde_json::from_str(&store.lrange(keys::HISTORY, 0, 0).unwrap()[0]).unwrap();
        assert_eq!(entry.timestamp, 1736933400000);
        assert_eq!(entry.game_id.as_deref(), Some("city-dx"));
    }

    #[test]
    fn test_error_events_are_logged() {
        let store = MemoryStore::new();
        let mut failed = event("output_generation", "2025-01-15T10:00:00Z");
        failed.success = Some(false);
        failed.error = Some(EventError {
            message: Some("timeout".to_string()),
            ..EventError::default()
        });
        record_event(&store, &failed).unwrap();
        record_event(&store, &event("error", "2025-01-15T10:01:00Z")).unwrap();

        let errors = store.lrange("stats:errors:2025-01-15", 0, -1).unwrap();
        assert_eq!(errors.len(), 2);
        let newest: ErrorEntry = serde_json::from_str(&errors[0]).unwrap();
        assert_eq!(newest.event_type, "error");
        let oldest: ErrorEntry = serde_json::from_str(&errors[1]).unwrap();
        assert_eq!(oldest.error.and_then(|e| e.message).as_deref(), Some("timeout"));
    }

    #[test]
    fn test_lists_are_capped() {
        let store = MemoryStore::new();
        for _ in 0..(keys::ERROR_LOG_LIMIT + 5) {
            record_event(&store, &event("error", "2025-01-15T10:00:00Z")).unwrap();
        }
        assert_eq!(store.llen("stats:errors:2025-01-15").unwrap(), 100);

        for _ in 0..(keys::HISTORY_LIMIT) {
            record_event(&store, &event("evaluation", "2025-01-16T10:00:00Z")).unwrap();
        }
        assert_eq!(store.llen(keys::HISTORY).unwrap(), 500);
        assert_eq!(store.get("stats:daily:2025-01-16").unwrap().as_deref(), Some("500"));
    }

    #[test]
    fn test_date_uses_written_calendar_day() {
        let store = MemoryStore::new();
        record_event(&store, &event("evaluation", "2025-01-15T23:30:00-05:00")).unwrap();
        assert_eq!(store.get("stats:daily:2025-01-15").unwrap().as_deref(), Some("1"));
    }
}
