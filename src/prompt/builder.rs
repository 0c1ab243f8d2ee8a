use crate::game::definition::GameDefinition;
use crate::game::selection::Selection;
use crate::prompt::format::{
    format_card_info, format_criteria, format_numbered, format_user_inputs, FREE_FORM, NO_ITEMS,
};
use crate::prompt::template::{render, Replacements};

pub const DEFAULT_ROLE: &str = "business consultant";

/// Prompt asking the model to write the proposal
pub fn build_output_prompt(game: &GameDefinition, selection: &Selection) -> String {
    let cards = selection.cards(game);
    let replacements = Replacements::new()
        .with("role", game.role.as_deref().unwrap_or(DEFAULT_ROLE))
        .with("outputType", game.output_type.as_str())
        .with("cardInfo", format_card_info(game, &cards))
        .with("userInputs", format_user_inputs(game, &selection.inputs))
        .with("guidelines", format_numbered(&game.guidelines, NO_ITEMS))
        .with("requirements", format_numbered(&game.requirements, NO_ITEMS))
        .with("structure", format_numbered(&game.output_structure, FREE_FORM));

    render(&game.output_prompt_template, &replacements)
}

/// Prompt asking the model to score a generated proposal against the game's criteria
pub fn build_evaluation_prompt(game: &GameDefinition, selection: &Selection, output: &str) -> String {
    let cards = selection.cards(game);
    let replacements = Replacements::new()
        .with("outputType", game.output_type.as_str())
        .with("output", output)
        .with("cardInfo", format_card_info(game, &cards))
        .with("userInputs", format_user_inputs(game, &selection.inputs))
        .with("criteria", format_criteria(&game.evaluation_criteria));

    render(&game.evaluation_prompt_template, &replacements)
}
