//! Key-value store abstraction for usage statistics.
//!
//! The key layout mirrors a Redis schema: plain string counters, capped lists
//! (newest entry at index 0) and sets. List ranges follow Redis semantics, so
//! negative indices count from the end and out-of-range bounds are clamped.

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Key '{0}' holds a value of another type")]
    WrongType(String),

    #[error("Value at '{0}' is not an integer")]
    NotAnInteger(String),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Increment an integer counter, creating it at 0 first. Returns the new value.
    fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// Push to the head of a list. Returns the new length.
    fn lpush(&self, key: &str, value: &str) -> Result<usize, StoreError>;

    /// Keep only the elements in `start..=stop`
    fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError>;

    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError>;

    fn llen(&self, key: &str) -> Result<usize, StoreError>;

    /// Returns true when the member was not already present
    fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// One result per key, in order. A failing key does not affect the others.
    fn get_many(&self, keys: &[String]) -> Vec<Result<Option<String>, StoreError>> {
        keys.iter().map(|key| self.get(key)).collect()
    }
}

/// Resolve Redis-style `start..=stop` over a list of `len` elements.
/// Returns `None` when the range selects nothing.
pub fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}
