//! Text blocks substituted into the prompt templates.

use crate::game::definition::{Card, EvaluationCriterion, GameDefinition};
use crate::game::input_validation::{display_value, is_empty, UserInputs};

pub const NO_ITEMS: &str = "(none)";
pub const FREE_FORM: &str = "(free form)";

/// One line per category, in order of first appearance: `Category: card, card`.
/// Cards whose category the game does not define are skipped.
pub fn format_card_info(game: &GameDefinition, cards: &[&Card]) -> String {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();

    for card in cards {
        let Some(category) = game.category(&card.category_id) else {
            continue;
        };
        match groups
            .iter_mut()
            .find(|(name, _)| *name == category.category_name)
        {
            Some((_, names)) => names.push(card.card_name.as_str()),
            None => groups.push((
                category.category_name.as_str(),
                vec![card.card_name.as_str()],
            )),
        }
    }

    groups
        .iter()
        .map(|(category, names)| format!("{}: {}", category, names.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Field name: value` for each declared field that has a value, in display order
pub fn format_user_inputs(game: &GameDefinition, inputs: &UserInputs) -> String {
    game.ordered_input_fields()
        .into_iter()
        .filter_map(|field| {
            let value = inputs.get(&field.field_id);
            if is_empty(value) {
                return None;
            }
            value.map(|v| format!("{}: {}", field.field_name, display_value(v)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `N. name (weight%): description`, weight rounded to a whole percent
pub fn format_criteria(criteria: &[EvaluationCriterion]) -> String {
    criteria
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{}. {} ({}%): {}",
                i + 1,
                c.criteria_name,
                (c.weight * 100.0).round() as i64,
                c.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered list, or `fallback` when there is nothing to list
pub fn format_numbered(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        return fallback.to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}
