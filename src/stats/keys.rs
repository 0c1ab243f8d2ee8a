//! Store key layout

use chrono::NaiveDate;

pub const HISTORY: &str = "stats:history";
pub const ACCESS_KEYS: &str = "stats:accessKeys";

pub const HISTORY_LIMIT: i64 = 500;
pub const ERROR_LOG_LIMIT: i64 = 100;

/// Event types the game itself emits
pub const KNOWN_EVENT_TYPES: [&str; 4] = ["game_selection", "output_generation", "evaluation", "error"];

pub fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn daily(date: &str) -> String {
    format!("stats:daily:{}", date)
}

pub fn game(game_id: &str, date: &str) -> String {
    format!("stats:game:{}:{}", game_id, date)
}

pub fn errors(date: &str) -> String {
    format!("stats:errors:{}", date)
}

pub fn event_type(event_type: &str, date: &str) -> String {
    format!("stats:eventType:{}:{}", event_type, date)
}

pub fn access_key_last_used(masked_key: &str) -> String {
    format!("stats:accessKey:{}:lastUsed", masked_key)
}

pub fn access_key_count(masked_key: &str) -> String {
    format!("stats:accessKey:{}:count", masked_key)
}

/// `today` and the `days - 1` days before it, newest first
pub fn last_days(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days)
        .filter_map(|i| today.checked_sub_days(chrono::Days::new(u64::from(i))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(daily("2025-03-01"), "stats:daily:2025-03-01");
        assert_eq!(game("city-dx", "2025-03-01"), "stats:game:city-dx:2025-03-01");
        assert_eq!(event_type("evaluation", "2025-03-01"), "stats:eventType:evaluation:2025-03-01");
        assert_eq!(access_key_count("demo****"), "stats:accessKey:demo****:count");
    }

    #[test]
    fn test_last_days_crosses_month() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let days: Vec<String> = last_days(today, 3).into_iter().map(date_str).collect();
        assert_eq!(days, vec!["2025-03-02", "2025-03-01", "2025-02-28"]);
    }
}
