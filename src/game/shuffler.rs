//! Per-category card shuffling.
//!
//! Each category of a game is permuted independently with a backward
//! Fisher-Yates pass. The resulting order is kept in [`ShuffleStates`], keyed
//! by game id, so a player sees the same order until the state is reset.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::game::definition::{Card, GameDefinition};

/// Shuffled card ids of one game, keyed by category id
pub type ShuffleState = HashMap<String, Vec<String>>;

/// Unbiased in-place permutation: for i from last down to 1, swap with j in [0, i]
pub fn fisher_yates_shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Partition the game's card ids by category and shuffle each category.
///
/// Returns an empty state (and logs why) when the game has no categories or no cards.
pub fn shuffle_all_cards<R: Rng + ?Sized>(game: &GameDefinition, rng: &mut R) -> ShuffleState {
    if game.card_categories.is_empty() || game.cards.is_empty() {
        log::error!(
            "[CardShuffler] Invalid game data for {}: {} categories, {} cards",
            game.game_id,
            game.card_categories.len(),
            game.cards.len()
        );
        return ShuffleState::new();
    }

    game.card_categories
        .iter()
        .map(|category| {
            let mut ids: Vec<String> = game
                .cards_in_category(&category.category_id)
                .map(|card| card.card_id.clone())
                .collect();
            fisher_yates_shuffle(&mut ids, rng);
            log::debug!(
                "[CardShuffler] Shuffled category \"{}\": {} cards",
                category.category_id,
                ids.len()
            );
            (category.category_id.clone(), ids)
        })
        .collect()
}

/// Shuffle states of every game played in one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShuffleStates {
    by_game: HashMap<String, ShuffleState>,
}

impl ShuffleStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, game_id: &str) -> Option<&ShuffleState> {
        self.by_game.get(game_id)
    }

    /// Persisted order for the game, shuffling first when none exists yet
    pub fn get_or_shuffle<R: Rng + ?Sized>(
        &mut self,
        game: &GameDefinition,
        rng: &mut R,
    ) -> &ShuffleState {
        let needs_shuffle = self
            .by_game
            .get(&game.game_id)
            .is_none_or(|state| state.is_empty());

        if needs_shuffle {
            log::info!(
                "[CardShuffler] No existing shuffle found, creating new shuffle for: {}",
                game.game_id
            );
            let state = shuffle_all_cards(game, rng);
            self.by_game.insert(game.game_id.clone(), state);
        }

        &self.by_game[&game.game_id]
    }

    /// Card objects of one category in shuffled order; ids unknown to the game are dropped
    pub fn shuffled_cards_for_category<'g, R: Rng + ?Sized>(
        &mut self,
        game: &'g GameDefinition,
        category_id: &str,
        rng: &mut R,
    ) -> Vec<&'g Card> {
        let index = game.card_index();
        self.get_or_shuffle(game, rng)
            .get(category_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| index.get(id.as_str()).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn reset(&mut self, game_id: &str) {
        if self.by_game.remove(game_id).is_some() {
            log::info!("[CardShuffler] Reset shuffle state for game: {}", game_id);
        }
    }

    pub fn reset_all(&mut self) {
        self.by_game.clear();
        log::info!("[CardShuffler] Reset all shuffle states");
    }

    pub fn len(&self) -> usize {
        self.by_game.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_game.is_empty()
    }
}
