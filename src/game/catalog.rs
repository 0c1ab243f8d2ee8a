//! Directory-backed list of the playable games.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::game::definition::GameDefinition;
use crate::game::GameError;

/// Short listing entry for the game selection screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_id: String,
    pub game_name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct GameCatalog {
    games: BTreeMap<String, Arc<GameDefinition>>,
}

impl GameCatalog {
    pub fn new(games: Vec<GameDefinition>) -> Self {
        Self {
            games: games
                .into_iter()
                .map(|g| (g.game_id.clone(), Arc::new(g)))
                .collect(),
        }
    }

    /// Load every `*.json` game file in `dir`. Files that fail to load are skipped with a warning.
    pub fn load_dir(dir: &Path) -> Result<Self, GameError> {
        let pattern = dir.join("*.json");
        let pattern = pattern.to_string_lossy();
        let paths = glob::glob(&pattern).map_err(|e| GameError::Catalog(e.to_string()))?;

        let mut games = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Unreadable game file entry: {}", e);
                    continue;
                }
            };
            match load_game_file(&path) {
                Ok(game) => {
                    if !game.weights_balanced() {
                        log::warn!(
                            "Game {}: evaluation weights sum to {:.2}, expected 1.0",
                            game.game_id,
                            game.weight_sum()
                        );
                    }
                    games.push(game);
                }
                Err(e) => log::warn!("Skipping game file {}: {}", path.display(), e),
            }
        }

        log::info!("Loaded {} games from {}", games.len(), dir.display());
        Ok(Self::new(games))
    }

    pub fn get(&self, game_id: &str) -> Option<Arc<GameDefinition>> {
        self.games.get(game_id).cloned()
    }

    pub fn require(&self, game_id: &str) -> Result<Arc<GameDefinition>, GameError> {
        self.get(game_id)
            .ok_or_else(|| GameError::UnknownGame(game_id.to_string()))
    }

    pub fn summaries(&self) -> Vec<GameSummary> {
        self.games
            .values()
            .map(|g| GameSummary {
                game_id: g.game_id.clone(),
                game_name: g.game_name.clone(),
                description: g.description.clone(),
            })
            .collect()
    }

    /// (id, display name) pairs, used by the stats views
    pub fn names(&self) -> Vec<(String, String)> {
        self.games
            .values()
            .map(|g| (g.game_id.clone(), g.game_name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

pub fn load_game_file(path: &Path) -> Result<GameDefinition, GameError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::definition::fixtures::SAMPLE_GAME_JSON;
    use assert_matches::assert_matches;

    #[test]
    fn test_load_dir_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("city-dx.json"), SAMPLE_GAME_JSON).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = GameCatalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("city-dx").is_some());
        assert_eq!(catalog.summaries()[0].game_name, "Municipal DX");
    }

    #[test]
    fn test_require_unknown_game() {
        let catalog = GameCatalog::default();
        assert!(catalog.is_empty());
        assert_matches!(catalog.require("nope"), Err(GameError::UnknownGame(id)) if id == "nope");
    }
}
