pub mod mock;
pub mod result;

pub use mock::{mock_evaluation, mock_evaluation_text};
pub use result::{parse_evaluation, validate_evaluation, EvaluationError, EvaluationResult};
