//! Evaluation objects returned by the scoring model.
//!
//! The model answers in free text that should contain a single JSON object.
//! [`parse_evaluation`] cuts that object out of the reply and
//! [`validate_evaluation`] checks its shape:
//!
//! - `scores`, `reasons`, `improvements` and `overallScore` are present
//! - every score is a number in `[0, 100]`
//! - there are at least [`MIN_IMPROVEMENTS`] improvement suggestions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::definition::EvaluationCriterion;

pub const MIN_IMPROVEMENTS: usize = 3;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

const REQUIRED_FIELDS: [&str; 4] = ["scores", "reasons", "improvements", "overallScore"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Failed to parse evaluation: {0}")]
    ParseFailed(String),

    #[error("Evaluation is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Evaluation field '{field}' has the wrong type, expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("Score out of range: {criterion} = {score}")]
    ScoreOutOfRange { criterion: String, score: f64 },

    #[error("Not enough improvement suggestions: {count} (at least {min} required)", min = MIN_IMPROVEMENTS)]
    NotEnoughImprovements { count: usize },
}

impl EvaluationError {
    /// Short machine-readable tag used in HTTP error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::ParseFailed(_) => "parse_failed",
            EvaluationError::MissingField(_) => "missing_field",
            EvaluationError::WrongType { .. } => "wrong_type",
            EvaluationError::ScoreOutOfRange { .. } => "score_out_of_range",
            EvaluationError::NotEnoughImprovements { .. } => "not_enough_improvements",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub scores: BTreeMap<String, f64>,
    pub reasons: BTreeMap<String, String>,
    pub improvements: Vec<String>,
    pub overall_score: f64,
    #[serde(default)]
    pub feedback: String,
}

impl EvaluationResult {
    /// Σ score × weight over the criteria that were scored
    pub fn weighted_score(&self, criteria: &[EvaluationCriterion]) -> f64 {
        criteria
            .iter()
            .filter_map(|c| self.scores.get(&c.criteria_id).map(|s| s * c.weight))
            .sum()
    }

    /// Criteria of the game that the evaluation did not score
    pub fn unscored<'a>(&self, criteria: &'a [EvaluationCriterion]) -> Vec<&'a str> {
        criteria
            .iter()
            .filter(|c| !self.scores.contains_key(&c.criteria_id))
            .map(|c| c.criteria_id.as_str())
            .collect()
    }
}

/// Extract the outermost `{ ... }` span of a model reply and validate it
pub fn parse_evaluation(text: &str) -> Result<EvaluationResult, EvaluationError> {
    let start = text
        .find('{')
        .ok_or_else(|| EvaluationError::ParseFailed("no JSON object in response".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| EvaluationError::ParseFailed("no JSON object in response".to_string()))?;

    let value: Value = serde_json::from_str(&text[start..=end])
        .map_err(|e| EvaluationError::ParseFailed(e.to_string()))?;

    validate_evaluation(&value)
}

pub fn validate_evaluation(value: &Value) -> Result<EvaluationResult, EvaluationError> {
    let object = value
        .as_object()
        .ok_or_else(|| EvaluationError::ParseFailed("evaluation is not a JSON object".to_string()))?;

    for field in REQUIRED_FIELDS {
        if object.get(field).is_none_or(Value::is_null) {
            return Err(EvaluationError::MissingField(field));
        }
    }

    let scores = object["scores"]
        .as_object()
        .ok_or_else(|| wrong_type("scores", "an object"))?
        .iter()
        .map(|(criterion, score)| {
            let score = score
                .as_f64()
                .ok_or_else(|| wrong_type(&format!("scores.{}", criterion), "a number"))?;
            check_range(criterion, score)?;
            Ok((criterion.clone(), score))
        })
        .collect::<Result<BTreeMap<_, _>, EvaluationError>>()?;

    let reasons = object["reasons"]
        .as_object()
        .ok_or_else(|| wrong_type("reasons", "an object"))?
        .iter()
        .map(|(criterion, reason)| (criterion.clone(), value_text(reason)))
        .collect();

    let improvements: Vec<String> = match &object["improvements"] {
        Value::Array(items) => items.iter().map(value_text).collect(),
        _ => return Err(EvaluationError::NotEnoughImprovements { count: 0 }),
    };
    if improvements.len() < MIN_IMPROVEMENTS {
        return Err(EvaluationError::NotEnoughImprovements {
            count: improvements.len(),
        });
    }

    let overall_score = object["overallScore"]
        .as_f64()
        .ok_or_else(|| wrong_type("overallScore", "a number"))?;
    check_range("overallScore", overall_score)?;

    let feedback = object.get("feedback").map(value_text).unwrap_or_default();

    Ok(EvaluationResult {
        scores,
        reasons,
        improvements,
        overall_score,
        feedback,
    })
}

fn check_range(criterion: &str, score: f64) -> Result<(), EvaluationError> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(EvaluationError::ScoreOutOfRange {
            criterion: criterion.to_string(),
            score,
        })
    }
}

fn wrong_type(field: &str, expected: &'static str) -> EvaluationError {
    EvaluationError::WrongType {
        field: field.to_string(),
        expected,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::definition::fixtures::sample_game;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn well_formed() -> Value {
        json!({
            "scores": {"feasibility": 80, "resident_benefit": 90, "sustainability": 70, "innovation": 60},
            "reasons": {"feasibility": "ok", "resident_benefit": "good", "sustainability": "fine", "innovation": "meh"},
            "improvements": ["one", "two", "three"],
            "overallScore": 78,
            "feedback": "Solid"
        })
    }

    #[test]
    fn test_accepts_well_formed() {
        let result = validate_evaluation(&well_formed()).unwrap();
        assert_eq!(result.scores.len(), 4);
        assert_eq!(result.improvements.len(), 3);
        assert_eq!(result.overall_score, 78.0);
        assert_eq!(result.feedback, "Solid");
    }

    #[test]
    fn test_rejects_missing_overall_score() {
        let mut value = well_formed();
        value.as_object_mut().unwrap().remove("overallScore");
        assert_matches!(
            validate_evaluation(&value),
            Err(EvaluationError::MissingField("overallScore"))
        );
    }

    #[test]
    fn test_rejects_each_missing_field() {
        for field in REQUIRED_FIELDS {
            let mut value = well_formed();
            value.as_object_mut().unwrap().remove(field);
            assert_eq!(
                validate_evaluation(&value),
                Err(EvaluationError::MissingField(field))
            );
        }
    }

    #[test]
    fn test_rejects_score_150() {
        let mut value = well_formed();
        value["scores"]["innovation"] = json!(150);
        assert_matches!(
            validate_evaluation(&value),
            Err(EvaluationError::ScoreOutOfRange { criterion, score }) if criterion == "innovation" && score == 150.0
        );
    }

    #[test]
    fn test_rejects_negative_score() {
        let mut value = well_formed();
        value["scores"]["feasibility"] = json!(-1);
        assert_matches!(
            validate_evaluation(&value),
            Err(EvaluationError::ScoreOutOfRange { .. })
        );
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let mut value = well_formed();
        value["scores"]["feasibility"] = json!(0);
        value["scores"]["innovation"] = json!(100);
        assert!(validate_evaluation(&value).is_ok());
    }

    #[test]
    fn test_zero_overall_score_is_present() {
        let mut value = well_formed();
        value["overallScore"] = json!(0);
        assert_eq!(validate_evaluation(&value).unwrap().overall_score, 0.0);
    }

    #[test]
    fn test_rejects_two_improvements() {
        let mut value = well_formed();
        value["improvements"] = json!(["one", "two"]);
        assert_matches!(
            validate_evaluation(&value),
            Err(EvaluationError::NotEnoughImprovements { count: 2 })
        );
    }

    #[test]
    fn test_rejects_non_array_improvements() {
        let mut value = well_formed();
        value["improvements"] = json!("do better");
        assert_matches!(
            validate_evaluation(&value),
            Err(EvaluationError::NotEnoughImprovements { count: 0 })
        );
    }

    #[test]
    fn test_rejects_non_numeric_score() {
        let mut value = well_formed();
        value["scores"]["feasibility"] = json!("high");
        assert_matches!(
            validate_evaluation(&value),
            Err(EvaluationError::WrongType { field, .. }) if field == "scores.feasibility"
        );
    }

    #[test]
    fn test_parse_extracts_object_from_prose() {
        let text = format!(
            "Here is my evaluation:\n```json\n{}\n```\nThanks!",
            well_formed()
        );
        let result = parse_evaluation(&text).unwrap();
        assert_eq!(result.scores["resident_benefit"], 90.0);
    }

    #[test]
    fn test_parse_without_object_fails() {
        assert_matches!(
            parse_evaluation("I cannot evaluate this."),
            Err(EvaluationError::ParseFailed(_))
        );
        assert_matches!(parse_evaluation("} oops {"), Err(EvaluationError::ParseFailed(_)));
        assert_matches!(parse_evaluation("{not json}"), Err(EvaluationError::ParseFailed(_)));
    }

    #[test]
    fn test_weighted_score() {
        let game = sample_game();
        let result = validate_evaluation(&well_formed()).unwrap();
        // 80*0.3 + 90*0.3 + 70*0.2 + 60*0.2
        let weighted = result.weighted_score(&game.evaluation_criteria);
        assert!((weighted - 77.0).abs() < 1e-9);
        assert!(result.unscored(&game.evaluation_criteria).is_empty());
    }

    #[test]
    fn test_unscored_criteria() {
        let game = sample_game();
        let mut value = well_formed();
        value["scores"].as_object_mut().unwrap().remove("innovation");
        let result = validate_evaluation(&value).unwrap();
        assert_eq!(result.unscored(&game.evaluation_criteria), vec!["innovation"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = validate_evaluation(&well_formed()).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["overallScore"], json!(78.0));
    }
}
