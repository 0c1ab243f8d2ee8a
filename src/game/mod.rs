pub mod catalog;
pub mod definition;
pub mod definition_validation;
pub mod input_validation;
pub mod selection;
pub mod shuffler;

pub use catalog::{GameCatalog, GameSummary};
pub use definition::{Card, CardCategory, EvaluationCriterion, FieldType, GameDefinition, InputField};
pub use selection::Selection;
pub use shuffler::{ShuffleState, ShuffleStates};

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Game not found: {0}")]
    UnknownGame(String),

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error("Card selected more than once: {0}")]
    DuplicateCard(String),

    #[error("{category}: {count} cards selected, expected {min} to {max}")]
    SelectionCount {
        category: String,
        count: usize,
        min: usize,
        max: usize,
    },

    #[error("Game catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid game JSON: {0}")]
    Json(#[from] serde_json::Error),
}
