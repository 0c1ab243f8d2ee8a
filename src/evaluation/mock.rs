//! Canned evaluations served when no AI backend is billed.

use serde_json::{Map, Value};

pub const FALLBACK_GAME_ID: &str = "city-dx";

const MOCK_EVALUATIONS: &str = include_str!("mock_evaluations.json");

fn mock_table() -> Map<String, Value> {
    match serde_json::from_str::<Value>(MOCK_EVALUATIONS) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            log::error!("Embedded mock evaluations are not a JSON object");
            Map::new()
        }
    }
}

/// Canned evaluation for `game_id`, falling back to the default game.
/// The returned object carries `mockMode: true`.
pub fn mock_evaluation(game_id: Option<&str>) -> Value {
    let mut table = mock_table();
    let evaluation = game_id
        .and_then(|id| table.remove(id))
        .or_else(|| table.remove(FALLBACK_GAME_ID))
        .unwrap_or_else(|| Value::Object(Map::new()));

    match evaluation {
        Value::Object(mut object) => {
            object.insert("mockMode".to_string(), Value::Bool(true));
            Value::Object(object)
        }
        other => other,
    }
}

/// Canned evaluation as the text a model would reply with
pub fn mock_evaluation_text(game_id: Option<&str>) -> String {
    let mut evaluation = mock_evaluation(game_id);
    if let Value::Object(object) = &mut evaluation {
        object.remove("mockMode");
    }
    serde_json::to_string_pretty(&evaluation).unwrap_or_default()
}

/// Game ids that have their own canned evaluation
pub fn mock_game_ids() -> Vec<String> {
    mock_table().keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::result::{parse_evaluation, validate_evaluation};

    #[test]
    fn test_every_canned_evaluation_is_valid() {
        let ids = mock_game_ids();
        assert_eq!(ids.len(), 4);
        for id in ids {
            let value = mock_evaluation(Some(&id));
            assert!(validate_evaluation(&value).is_ok(), "{} is invalid", id);
        }
    }

    #[test]
    fn test_unknown_game_falls_back() {
        let fallback = mock_evaluation(Some("no-such-game"));
        assert_eq!(fallback, mock_evaluation(Some(FALLBACK_GAME_ID)));
        assert_eq!(mock_evaluation(None), fallback);
        assert_eq!(fallback["mockMode"], Value::Bool(true));
        assert_eq!(fallback["overallScore"], 89);
    }

    #[test]
    fn test_text_form_parses() {
        let text = mock_evaluation_text(Some("robot-solution"));
        assert!(!text.contains("mockMode"));
        let result = parse_evaluation(&text).unwrap();
        assert_eq!(result.scores["marketNeed"], 90.0);
    }
}
