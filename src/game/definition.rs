//! Game definition model, loaded from the per-game JSON files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tolerance used when checking that criterion weights add up to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Static configuration of one proposal game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDefinition {
    pub game_id: String,
    pub game_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub output_type: String,
    #[serde(default)]
    pub card_categories: Vec<CardCategory>,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub input_fields: Vec<InputField>,
    #[serde(default)]
    pub evaluation_criteria: Vec<EvaluationCriterion>,
    #[serde(default)]
    pub output_prompt_template: String,
    #[serde(default)]
    pub evaluation_prompt_template: String,
    #[serde(default)]
    pub guidelines: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub output_structure: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCategory {
    pub category_id: String,
    pub category_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub min_select: usize,
    #[serde(default = "default_max_select")]
    pub max_select: usize,
}

fn default_max_select() -> usize {
    usize::MAX
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub card_id: String,
    pub category_id: String,
    pub card_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Select,
    /// Any type the game file names that the server does not know; treated as free text
    #[serde(other)]
    Other,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(FieldType::Text),
            "textarea" => Some(FieldType::Textarea),
            "number" => Some(FieldType::Number),
            "select" => Some(FieldType::Select),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    pub field_id: String,
    pub field_name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub validation: FieldValidation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationCriterion {
    pub criteria_id: String,
    pub criteria_name: String,
    #[serde(default)]
    pub description: String,
    pub weight: f64,
}

impl GameDefinition {
    pub fn category(&self, category_id: &str) -> Option<&CardCategory> {
        self.card_categories
            .iter()
            .find(|c| c.category_id == category_id)
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.card_id == card_id)
    }

    pub fn cards_in_category<'a>(&'a self, category_id: &'a str) -> impl Iterator<Item = &'a Card> {
        self.cards
            .iter()
            .filter(move |card| card.category_id == category_id)
    }

    pub fn input_field(&self, field_id: &str) -> Option<&InputField> {
        self.input_fields.iter().find(|f| f.field_id == field_id)
    }

    /// Input fields in display order
    pub fn ordered_input_fields(&self) -> Vec<&InputField> {
        let mut fields: Vec<&InputField> = self.input_fields.iter().collect();
        fields.sort_by_key(|f| f.display_order);
        fields
    }

    /// Index of cards by id, for repeated lookups
    pub fn card_index(&self) -> HashMap<&str, &Card> {
        self.cards.iter().map(|c| (c.card_id.as_str(), c)).collect()
    }

    pub fn weight_sum(&self) -> f64 {
        self.evaluation_criteria.iter().map(|c| c.weight).sum()
    }

    pub fn weights_balanced(&self) -> bool {
        (self.weight_sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample_game() -> GameDefinition {
        serde_json::from_str(SAMPLE_GAME_JSON).unwrap()
    }

    pub const SAMPLE_GAME_JSON: &str = r#"{
        "gameId": "city-dx",
        "gameName": "Municipal DX",
        "description": "Digital transformation for a small city",
        "role": "public sector consultant",
        "outputType": "proposal",
        "cardCategories": [
            {"categoryId": "issue", "categoryName": "Issue", "description": "", "minSelect": 1, "maxSelect": 2},
            {"categoryId": "tech", "categoryName": "Technology", "description": "", "minSelect": 1, "maxSelect": 3}
        ],
        "cards": [
            {"cardId": "issue-1", "categoryId": "issue", "cardName": "Aging population", "description": "More residents over 65"},
            {"cardId": "issue-2", "categoryId": "issue", "cardName": "Traffic", "description": "Congested roads"},
            {"cardId": "issue-3", "categoryId": "issue", "cardName": "Paper workflows", "description": "Forms filed on paper"},
            {"cardId": "tech-1", "categoryId": "tech", "cardName": "Chatbot", "description": "Conversational assistant"},
            {"cardId": "tech-2", "categoryId": "tech", "cardName": "IoT sensors", "description": "Connected sensors"},
            {"cardId": "tech-3", "categoryId": "tech", "cardName": "Open data", "description": "Published datasets"},
            {"cardId": "tech-4", "categoryId": "tech", "cardName": "Cloud", "description": "Managed infrastructure"}
        ],
        "inputFields": [
            {"fieldId": "budget", "fieldName": "Budget", "fieldType": "number", "required": true, "displayOrder": 2,
             "validation": {"min": 0, "max": 100000}},
            {"fieldId": "title", "fieldName": "Title", "fieldType": "text", "required": true, "displayOrder": 1,
             "validation": {"minLength": 3, "maxLength": 40}},
            {"fieldId": "notes", "fieldName": "Notes", "fieldType": "textarea", "required": false, "displayOrder": 3}
        ],
        "evaluationCriteria": [
            {"criteriaId": "feasibility", "criteriaName": "Feasibility", "description": "Can it be built", "weight": 0.3},
            {"criteriaId": "resident_benefit", "criteriaName": "Resident benefit", "description": "Who gains", "weight": 0.3},
            {"criteriaId": "sustainability", "criteriaName": "Sustainability", "description": "Does it last", "weight": 0.2},
            {"criteriaId": "innovation", "criteriaName": "Innovation", "description": "Is it new", "weight": 0.2}
        ],
        "outputPromptTemplate": "You are a {role}. Write a {outputType}.\nCards:\n{cardInfo}\nInputs:\n{userInputs}\nGuidelines:\n{guidelines}\nRequirements:\n{requirements}\nStructure:\n{structure}",
        "evaluationPromptTemplate": "Evaluate this {outputType}:\n{output}\nCards:\n{cardInfo}\nInputs:\n{userInputs}\nCriteria:\n{criteria}",
        "guidelines": ["Be concrete", "Cite numbers"],
        "requirements": [],
        "outputStructure": ["Summary", "Plan", "Budget"]
    }"#;
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_game;
    use super::*;

    #[test]
    fn test_parse_sample_game() {
        let game = sample_game();
        assert_eq!(game.game_id, "city-dx");
        assert_eq!(game.card_categories.len(), 2);
        assert_eq!(game.cards_in_category("tech").count(), 4);
        assert_eq!(game.input_fields[0].field_type, FieldType::Number);
        assert_eq!(game.input_fields[1].validation.max_length, Some(40));
    }

    #[test]
    fn test_ordered_input_fields() {
        let game = sample_game();
        let ids: Vec<&str> = game
            .ordered_input_fields()
            .iter()
            .map(|f| f.field_id.as_str())
            .collect();
        assert_eq!(ids, vec!["title", "budget", "notes"]);
    }

    #[test]
    fn test_weights_balanced() {
        let mut game = sample_game();
        assert!(game.weights_balanced());

        game.evaluation_criteria.pop();
        assert!(!game.weights_balanced());
    }

    #[test]
    fn test_missing_max_select_is_unbounded() {
        let category: CardCategory =
            serde_json::from_str(r#"{"categoryId": "a", "categoryName": "A"}"#).unwrap();
        assert_eq!(category.min_select, 0);
        assert_eq!(category.max_select, usize::MAX);
    }
}
