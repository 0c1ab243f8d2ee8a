use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Usage event as posted by clients or emitted by the play routes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsEvent {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub game_id: Option<String>,
    /// Already masked, see [`mask_access_key`]
    #[serde(default)]
    pub access_key: Option<String>,
    /// RFC 3339
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<EventError>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Stack traces are cut to this many characters
pub const MAX_STACK_CHARS: usize = 500;

impl StatsEvent {
    pub fn new(event_type: &str, at: DateTime<Utc>) -> Self {
        Self {
            event_type: Some(event_type.to_string()),
            timestamp: Some(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ..Self::default()
        }
    }

    pub fn with_game(mut self, game_id: Option<&str>) -> Self {
        self.game_id = game_id.map(str::to_string);
        self
    }

    /// Stores the masked form of `access_key`
    pub fn with_access_key(mut self, access_key: &str) -> Self {
        self.access_key = Some(mask_access_key(access_key));
        self
    }

    pub fn with_masked_key(mut self, masked_key: &str) -> Self {
        self.access_key = Some(masked_key.to_string());
        self
    }

    pub fn with_outcome(mut self, error: Option<&dyn std::error::Error>) -> Self {
        self.success = Some(error.is_none());
        self.error = error.map(|e| EventError {
            message: Some(e.to_string()),
            stack: e
                .source()
                .map(|s| s.to_string().chars().take(MAX_STACK_CHARS).collect()),
            name: None,
        });
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some() || self.event_type.as_deref() == Some("error")
    }
}

/// Entry of the `stats:history` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unix millis
    pub timestamp: i64,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Entry of a `stats:errors:{date}` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub timestamp: i64,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub error: Option<EventError>,
}

/// First four characters followed by up to eight `*`. Keys of four characters or
/// fewer are reported as `unknown`.
pub fn mask_access_key(access_key: &str) -> String {
    let len = access_key.chars().count();
    if len <= 4 {
        return "unknown".to_string();
    }
    let visible: String = access_key.chars().take(4).collect();
    format!("{}{}", visible, "*".repeat((len - 4).min(8)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mask_access_key() {
        assert_eq!(mask_access_key("demo-key-2024"), "demo********");
        assert_eq!(mask_access_key("work1"), "work*");
        assert_eq!(mask_access_key("abcd"), "unknown");
        assert_eq!(mask_access_key(""), "unknown");
        assert_eq!(mask_access_key("ABCD-EFGH-IJKL-MNOP"), "ABCD********");
    }

    #[test]
    fn test_event_builder() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        let event = StatsEvent::new("game_selection", at)
            .with_game(Some("city-dx"))
            .with_access_key("demo-key-2024");
        assert_eq!(event.timestamp.as_deref(), Some("2025-01-15T09:30:00.000Z"));
        assert_eq!(event.access_key.as_deref(), Some("demo********"));
        assert!(!event.is_error());
    }

    #[test]
    fn test_outcome_marks_error() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        let failure = std::io::Error::other("upstream down");
        let event = StatsEvent::new("output_generation", at).with_outcome(Some(&failure));
        assert_eq!(event.success, Some(false));
        assert!(event.is_error());
        assert_eq!(
            event.error.and_then(|e| e.message).as_deref(),
            Some("upstream down")
        );
    }

    #[test]
    fn test_deserializes_client_payload() {
        let event: StatsEvent = serde_json::from_str(
            r#"{"eventType":"error","location":"OutputGenerator","error":{"message":"boom","name":"TypeError"},"timestamp":"2025-01-15T09:30:00.000Z"}"#,
        )
        .unwrap();
        assert!(event.is_error());
        assert_eq!(event.error.unwrap().name.as_deref(), Some("TypeError"));
    }
}
