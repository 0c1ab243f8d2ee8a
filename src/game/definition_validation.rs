//! Offline checks for game definition files.
//!
//! Works on untyped JSON so that missing fields are reported instead of
//! stopping at the first deserialization error.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::game::definition::{FieldType, WEIGHT_SUM_TOLERANCE};

const REQUIRED_TOP_LEVEL: [&str; 6] = [
    "gameId",
    "gameName",
    "cardCategories",
    "cards",
    "inputFields",
    "evaluationCriteria",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Bool(b)) => !b,
        _ => false,
    }
}

fn check_required(report: &mut ValidationReport, item: &Value, prefix: &str, fields: &[&str], allow_falsy: bool) {
    for field in fields {
        let missing = if allow_falsy {
            item.get(field).is_none()
        } else {
            is_blank(item.get(field))
        };
        if missing {
            report.error(format!("{}: missing required field {}", prefix, field));
        }
    }
}

/// Collect an id, reporting duplicates
fn track_unique<'a>(report: &mut ValidationReport, seen: &mut HashSet<&'a str>, id: Option<&'a str>, prefix: &str, name: &str) {
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        if !seen.insert(id) {
            report.error(format!("{}: {} \"{}\" is duplicated", prefix, name, id));
        }
    }
}

fn validate_categories(report: &mut ValidationReport, data: &Value) {
    let Some(categories) = data.get("cardCategories").and_then(Value::as_array) else {
        report.error("cardCategories must be an array");
        return;
    };
    if categories.is_empty() {
        report.warning("cardCategories is empty");
    }
    for (index, category) in categories.iter().enumerate() {
        let prefix = format!("cardCategories[{}]", index);
        check_required(
            report,
            category,
            &prefix,
            &["categoryId", "categoryName", "description", "minSelect", "maxSelect"],
            true,
        );
        let min = category.get("minSelect").and_then(Value::as_f64);
        let max = category.get("maxSelect").and_then(Value::as_f64);
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                report.error(format!(
                    "{}: minSelect ({}) is greater than maxSelect ({})",
                    prefix, min, max
                ));
            }
        }
    }
}

fn validate_cards(report: &mut ValidationReport, data: &Value) {
    let Some(cards) = data.get("cards").and_then(Value::as_array) else {
        report.error("cards must be an array");
        return;
    };
    if cards.is_empty() {
        report.warning("cards is empty");
        return;
    }

    let category_ids: HashSet<&str> = data
        .get("cardCategories")
        .and_then(Value::as_array)
        .map(|categories| {
            categories
                .iter()
                .filter_map(|c| c.get("categoryId").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    let mut card_ids = HashSet::new();

    for (index, card) in cards.iter().enumerate() {
        let prefix = format!("cards[{}]", index);
        check_required(report, card, &prefix, &["cardId", "categoryId", "cardName", "description"], false);

        if let Some(category_id) = card.get("categoryId").and_then(Value::as_str) {
            if !category_id.is_empty() && !category_ids.contains(category_id) {
                report.error(format!(
                    "{}: categoryId \"{}\" does not exist in cardCategories",
                    prefix, category_id
                ));
            }
        }
        track_unique(report, &mut card_ids, card.get("cardId").and_then(Value::as_str), &prefix, "cardId");
    }
}

fn validate_input_fields(report: &mut ValidationReport, data: &Value) {
    let Some(fields) = data.get("inputFields").and_then(Value::as_array) else {
        report.error("inputFields must be an array");
        return;
    };
    if fields.is_empty() {
        report.warning("inputFields is empty");
    }

    let mut field_ids = HashSet::new();
    for (index, field) in fields.iter().enumerate() {
        let prefix = format!("inputFields[{}]", index);
        check_required(report, field, &prefix, &["fieldId", "fieldName", "fieldType"], false);

        if let Some(field_type) = field.get("fieldType").and_then(Value::as_str) {
            if !field_type.is_empty() && FieldType::from_str(field_type).is_none() {
                report.warning(format!(
                    "{}: fieldType \"{}\" is not recommended (use text, textarea, number, select)",
                    prefix, field_type
                ));
            }
        }
        track_unique(report, &mut field_ids, field.get("fieldId").and_then(Value::as_str), &prefix, "fieldId");
    }
}

fn validate_criteria(report: &mut ValidationReport, data: &Value) {
    let Some(criteria) = data.get("evaluationCriteria").and_then(Value::as_array) else {
        report.error("evaluationCriteria must be an array");
        return;
    };
    if criteria.is_empty() {
        report.error("evaluationCriteria is empty (at least one is required)");
        return;
    }

    let mut criteria_ids = HashSet::new();
    let mut total_weight = 0.0;
    for (index, criterion) in criteria.iter().enumerate() {
        let prefix = format!("evaluationCriteria[{}]", index);
        check_required(
            report,
            criterion,
            &prefix,
            &["criteriaId", "criteriaName", "description", "weight"],
            true,
        );

        if let Some(weight) = criterion.get("weight").and_then(Value::as_f64) {
            if !(0.0..=1.0).contains(&weight) {
                report.error(format!(
                    "{}: weight must be between 0.0 and 1.0 (found {})",
                    prefix, weight
                ));
            }
            total_weight += weight;
        }
        track_unique(
            report,
            &mut criteria_ids,
            criterion.get("criteriaId").and_then(Value::as_str),
            &prefix,
            "criteriaId",
        );
    }

    if (total_weight - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        report.warning(format!(
            "evaluationCriteria: weights sum to {:.2}, expected 1.0",
            total_weight
        ));
    }
}

fn validate_templates(report: &mut ValidationReport, data: &Value) {
    match data.get("outputPromptTemplate") {
        None | Some(Value::Null) => report.error("outputPromptTemplate is required"),
        Some(Value::String(_)) => {}
        Some(_) => report.error("outputPromptTemplate must be a string"),
    }
    match data.get("evaluationPromptTemplate") {
        None | Some(Value::Null) => report.warning("evaluationPromptTemplate is missing; evaluation will be unavailable"),
        Some(Value::String(_)) => {}
        Some(_) => report.error("evaluationPromptTemplate must be a string"),
    }
}

/// Validate one parsed game definition
pub fn validate_game_value(data: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    for field in REQUIRED_TOP_LEVEL {
        if is_blank(data.get(field)) {
            report.error(format!("missing required field: {}", field));
        }
    }
    validate_templates(&mut report, data);
    validate_categories(&mut report, data);
    validate_cards(&mut report, data);
    validate_input_fields(&mut report, data);
    validate_criteria(&mut report, data);

    report
}

/// Read, parse and validate a game definition file
pub fn validate_game_file(path: &Path) -> ValidationReport {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let mut report = ValidationReport::default();
            report.error(format!("cannot read {}: {}", path.display(), e));
            return report;
        }
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(data) => validate_game_value(&data),
        Err(e) => {
            let mut report = ValidationReport::default();
            report.error(format!("JSON syntax error: {}", e));
            report
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::definition::fixtures::SAMPLE_GAME_JSON;
    use serde_json::json;

    fn sample() -> Value {
        serde_json::from_str(SAMPLE_GAME_JSON).unwrap()
    }

    #[test]
    fn test_sample_game_passes() {
        let report = validate_game_value(&sample());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_weight_sum_is_warning_only() {
        let mut data = sample();
        data["evaluationCriteria"] = json!([
            {"criteriaId": "a", "criteriaName": "A", "description": "", "weight": 0.3},
            {"criteriaId": "b", "criteriaName": "B", "description": "", "weight": 0.3},
            {"criteriaId": "c", "criteriaName": "C", "description": "", "weight": 0.3}
        ]);
        let report = validate_game_value(&data);
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("0.90"));
    }

    #[test]
    fn test_weight_out_of_range_is_error() {
        let mut data = sample();
        data["evaluationCriteria"][0]["weight"] = json!(1.5);
        let report = validate_game_value(&data);
        assert!(report.errors.iter().any(|e| e.contains("between 0.0 and 1.0")));
    }

    #[test]
    fn test_referential_integrity_and_duplicates() {
        let mut data = sample();
        data["cards"][0]["categoryId"] = json!("nowhere");
        data["cards"][1]["cardId"] = json!("tech-1");
        data["inputFields"][1]["fieldId"] = json!("budget");
        let report = validate_game_value(&data);
        assert_eq!(report.errors.len(), 3, "{:?}", report.errors);
        assert!(report.errors[0].contains("\"nowhere\" does not exist"));
        assert!(report.errors[1].contains("cardId \"tech-1\" is duplicated"));
        assert!(report.errors[2].contains("fieldId \"budget\" is duplicated"));
    }

    #[test]
    fn test_missing_fields() {
        let report = validate_game_value(&json!({"gameId": "x"}));
        assert!(report.errors.contains(&"missing required field: gameName".to_string()));
        assert!(report.errors.contains(&"outputPromptTemplate is required".to_string()));
        assert!(report.errors.contains(&"cards must be an array".to_string()));
    }

    #[test]
    fn test_min_greater_than_max() {
        let mut data = sample();
        data["cardCategories"][0]["minSelect"] = json!(4);
        let report = validate_game_value(&data);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("cardCategories[0]: minSelect (4)"));
    }

    #[test]
    fn test_unknown_field_type_warns() {
        let mut data = sample();
        data["inputFields"][2]["fieldType"] = json!("date");
        let report = validate_game_value(&data);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_validate_game_file_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let report = validate_game_file(&path);
        assert!(report.errors[0].starts_with("JSON syntax error"));
    }
}
