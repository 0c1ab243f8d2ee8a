//! Validation of the player's free-text and numeric inputs against a game's field rules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::game::definition::{FieldType, GameDefinition, InputField};

/// Raw input values keyed by field id, as sent by the client
pub type UserInputs = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_id: String,
    pub field_name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputValidation {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// Missing, null, blank text or an empty list
pub fn is_empty(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.trim().is_empty(),
        Some(serde_json::Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Display form of an input value: strings unquoted, everything else as JSON
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn field_error(field: &InputField, message: String) -> FieldError {
    FieldError {
        field_id: field.field_id.clone(),
        field_name: field.field_name.clone(),
        message,
    }
}

fn validate_field(field: &InputField, value: Option<&serde_json::Value>, errors: &mut Vec<FieldError>) {
    if is_empty(value) {
        if field.required {
            errors.push(field_error(field, format!("{} is required", field.field_name)));
        }
        return;
    }
    let Some(value) = value else { return };
    let rules = &field.validation;

    match field.field_type {
        FieldType::Text | FieldType::Textarea => {
            if let serde_json::Value::String(text) = value {
                let length = text.chars().count();
                if let Some(min) = rules.min_length.filter(|&min| length < min) {
                    errors.push(field_error(
                        field,
                        format!(
                            "{} must be at least {} characters (currently {})",
                            field.field_name, min, length
                        ),
                    ));
                }
                if let Some(max) = rules.max_length.filter(|&max| length > max) {
                    errors.push(field_error(
                        field,
                        format!(
                            "{} must be at most {} characters (currently {})",
                            field.field_name, max, length
                        ),
                    ));
                }
            }
        }
        FieldType::Number => {
            let Some(number) = as_number(value) else {
                errors.push(field_error(field, format!("{} must be a number", field.field_name)));
                return;
            };
            if let Some(min) = rules.min.filter(|&min| number < min) {
                errors.push(field_error(
                    field,
                    format!("{} must be at least {}", field.field_name, min),
                ));
            }
            if let Some(max) = rules.max.filter(|&max| number > max) {
                errors.push(field_error(
                    field,
                    format!("{} must be at most {}", field.field_name, max),
                ));
            }
        }
        FieldType::Select | FieldType::Other => {}
    }
}

/// Check every field the game declares; values for undeclared fields are ignored
pub fn validate_inputs(game: &GameDefinition, inputs: &UserInputs) -> InputValidation {
    let mut errors = Vec::new();
    for field in &game.input_fields {
        validate_field(field, inputs.get(&field.field_id), &mut errors);
    }
    InputValidation {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::definition::fixtures::sample_game;
    use serde_json::json;

    fn inputs(pairs: &[(&str, serde_json::Value)]) -> UserInputs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_valid_inputs() {
        let game = sample_game();
        let result = validate_inputs(
            &game,
            &inputs(&[("title", json!("Smart bus")), ("budget", json!("5000"))]),
        );
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn test_required_fields() {
        let game = sample_game();
        let result = validate_inputs(&game, &inputs(&[("title", json!("   "))]));
        assert!(!result.valid);
        let ids: Vec<&str> = result.errors.iter().map(|e| e.field_id.as_str()).collect();
        assert_eq!(ids, vec!["budget", "title"]);
    }

    #[test]
    fn test_length_bounds_count_characters() {
        let game = sample_game();
        let short = validate_inputs(&game, &inputs(&[("title", json!("ab")), ("budget", json!(1))]));
        assert_eq!(short.errors.len(), 1);
        assert!(short.errors[0].message.contains("at least 3"));

        // three multibyte characters satisfy minLength 3
        let kana = validate_inputs(&game, &inputs(&[("title", json!("ゲーム")), ("budget", json!(1))]));
        assert!(kana.valid);

        let long = validate_inputs(
            &game,
            &inputs(&[("title", json!("x".repeat(41))), ("budget", json!(1))]),
        );
        assert!(long.errors[0].message.contains("at most 40"));
    }

    #[test]
    fn test_number_rules() {
        let game = sample_game();
        let nan = validate_inputs(&game, &inputs(&[("title", json!("Plan")), ("budget", json!("lots"))]));
        assert_eq!(nan.errors[0].message, "Budget must be a number");

        let negative = validate_inputs(&game, &inputs(&[("title", json!("Plan")), ("budget", json!(-1))]));
        assert_eq!(negative.errors[0].message, "Budget must be at least 0");

        let huge = validate_inputs(&game, &inputs(&[("title", json!("Plan")), ("budget", json!(1e9))]));
        assert_eq!(huge.errors[0].message, "Budget must be at most 100000");
    }

    #[test]
    fn test_optional_empty_field_skips_rules() {
        let game = sample_game();
        let result = validate_inputs(
            &game,
            &inputs(&[("title", json!("Plan")), ("budget", json!(10)), ("notes", json!(""))]),
        );
        assert!(result.valid);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("text")), "text");
        assert_eq!(display_value(&json!(5000)), "5000");
    }
}
