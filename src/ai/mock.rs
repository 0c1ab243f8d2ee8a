//! Canned replies used in mock mode

use crate::evaluation::mock_evaluation_text;

use super::{AiResponse, CallKind, Usage};

pub const MOCK_MODEL: &str = "mock";

pub fn mock_response(kind: CallKind, game_id: Option<&str>) -> AiResponse {
    let content = match kind {
        CallKind::Generation => mock_proposal(game_id),
        CallKind::Evaluation => mock_evaluation_text(game_id),
    };
    log::info!("[{}] mock reply for game {}", kind.label(), game_id.unwrap_or("-"));

    AiResponse {
        content,
        usage: Usage::default(),
        model: MOCK_MODEL.to_string(),
        mock_mode: true,
    }
}

fn mock_proposal(game_id: Option<&str>) -> String {
    let (title, body) = match game_id {
        Some("robot-solution") => (
            "Autonomous picking for mid-sized warehouses",
            "Combine collaborative arms with autonomous mobile robots to automate picking \
             and shelf replenishment. A pilot line runs for three months before a staged rollout.",
        ),
        Some("it-operations-excellence") => (
            "Operations excellence programme",
            "Standardise incident, change and problem management on ITIL, make monitoring \
             transparent across five viewpoints and automate routine recovery steps.",
        ),
        Some("it-security-solution") => (
            "Layered security for connected factories",
            "Protect the plant network with next-generation firewalls, add endpoint detection \
             on every managed device and run round-the-clock monitoring from a shared console.",
        ),
        _ => (
            "Smart mobility and online services for residents",
            "Optimise community bus routes with ride data, move common administrative \
             procedures online and answer routine questions with a chatbot.",
        ),
    };

    format!(
        "# {title}\n\n\
         ## Summary\n{body}\n\n\
         ## Plan\n\
         1. Phase 1 (months 1-6): assessment and pilot\n\
         2. Phase 2 (months 7-18): rollout\n\
         3. Phase 3 (months 19-24): review and expansion\n\n\
         ## Expected results\n\
         - Measurable service improvement within the first year\n\
         - Clear ownership and reporting at every phase\n\n\
         _This is a mock response; no AI model was called._\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::parse_evaluation;

    #[test]
    fn test_mock_generation() {
        let response = mock_response(CallKind::Generation, Some("robot-solution"));
        assert!(response.mock_mode);
        assert_eq!(response.model, MOCK_MODEL);
        assert!(response.content.starts_with("# Autonomous picking"));
    }

    #[test]
    fn test_mock_generation_default() {
        let response = mock_response(CallKind::Generation, None);
        assert!(response.content.contains("Smart mobility"));
    }

    #[test]
    fn test_mock_evaluation_parses() {
        let response = mock_response(CallKind::Evaluation, Some("it-security-solution"));
        let result = parse_evaluation(&response.content).unwrap();
        assert_eq!(result.improvements.len(), 4);
        assert_eq!(result.overall_score, 87.0);
    }
}
