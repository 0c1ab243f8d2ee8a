//! Cards and input values chosen during one play session.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::game::definition::{Card, GameDefinition};
use crate::game::input_validation::UserInputs;
use crate::game::GameError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub card_ids: Vec<String>,
    pub inputs: UserInputs,
}

impl Selection {
    pub fn new(card_ids: Vec<String>, inputs: UserInputs) -> Self {
        Self { card_ids, inputs }
    }

    /// Selected cards resolved against the game, first occurrence wins; unknown ids are skipped
    pub fn cards<'g>(&self, game: &'g GameDefinition) -> Vec<&'g Card> {
        let index = game.card_index();
        let mut seen = HashSet::new();
        self.card_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| index.get(id.as_str()).copied())
            .collect()
    }

    /// Every card must exist and appear once, and each category's count must be within min/max
    pub fn validate(&self, game: &GameDefinition) -> Result<(), Vec<GameError>> {
        let index = game.card_index();
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        let mut per_category: HashMap<&str, usize> = HashMap::new();

        for card_id in &self.card_ids {
            if !seen.insert(card_id.as_str()) {
                errors.push(GameError::DuplicateCard(card_id.clone()));
                continue;
            }
            match index.get(card_id.as_str()) {
                Some(card) => *per_category.entry(card.category_id.as_str()).or_default() += 1,
                None => errors.push(GameError::UnknownCard(card_id.clone())),
            }
        }

        for category in &game.card_categories {
            let count = per_category
                .get(category.category_id.as_str())
                .copied()
                .unwrap_or(0);
            if count < category.min_select || count > category.max_select {
                errors.push(GameError::SelectionCount {
                    category: category.category_name.clone(),
                    count,
                    min: category.min_select,
                    max: category.max_select,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::definition::fixtures::sample_game;
    use assert_matches::assert_matches;

    fn selection(ids: &[&str]) -> Selection {
        Selection::new(ids.iter().map(|s| s.to_string()).collect(), UserInputs::new())
    }

    #[test]
    fn test_valid_selection() {
        let game = sample_game();
        assert!(selection(&["issue-1", "tech-2", "tech-3"]).validate(&game).is_ok());
    }

    #[test]
    fn test_unknown_card() {
        let game = sample_game();
        let errors = selection(&["issue-1", "tech-2", "ghost"])
            .validate(&game)
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_matches!(&errors[0], GameError::UnknownCard(id) if id == "ghost");
    }

    #[test]
    fn test_category_bounds() {
        let game = sample_game();
        let errors = selection(&["issue-1", "issue-2", "issue-3"])
            .validate(&game)
            .unwrap_err();
        // too many issues, no technology at all
        assert_eq!(errors.len(), 2);
        assert_matches!(&errors[0], GameError::SelectionCount { count: 3, max: 2, .. });
        assert_matches!(&errors[1], GameError::SelectionCount { count: 0, min: 1, .. });
    }

    #[test]
    fn test_repeated_card_is_rejected_and_counted_once() {
        let game = sample_game();
        let errors = selection(&["issue-1", "issue-1", "tech-1"])
            .validate(&game)
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_matches!(&errors[0], GameError::DuplicateCard(id) if id == "issue-1");

        // issue allows two; the repeat is not counted towards that
        let errors = selection(&["issue-1", "issue-2", "issue-1", "tech-1"])
            .validate(&game)
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_matches!(&errors[0], GameError::DuplicateCard(_));
    }

    #[test]
    fn test_cards_resolution_skips_repeats() {
        let game = sample_game();
        let cards = selection(&["issue-1", "issue-1", "tech-1"]).cards(&game);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].card_id, "issue-1");
    }

    #[test]
    fn test_cards_resolution_keeps_order() {
        let game = sample_game();
        let names: Vec<&str> = selection(&["tech-4", "ghost", "issue-2"])
            .cards(&game)
            .iter()
            .map(|c| c.card_name.as_str())
            .collect();
        assert_eq!(names, vec!["Cloud", "Traffic"]);
    }
}
