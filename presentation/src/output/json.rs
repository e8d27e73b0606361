//! JSON output formatter

use crate::output::formatter::OutputFormatter;
use decider_application::SessionStatusView;
use decider_domain::{DecisionSession, ParameterSuggestion};
use serde::Serialize;
use serde_json::json;

/// Formats results as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_status(&self, view: &SessionStatusView) -> String {
        Self::pretty(view)
    }

    fn format_session(&self, session: &DecisionSession) -> String {
        Self::pretty(session)
    }

    fn format_list(&self, sessions: &[DecisionSession]) -> String {
        let rows: Vec<_> = sessions
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "status": s.status,
                    "participants": s.setup.participants,
                    "candidates": s.candidate_set.len(),
                    "final_selection": s.final_selection,
                    "is_pinned": s.is_pinned,
                    "created_at": s.created_at,
                })
            })
            .collect();
        Self::pretty(&rows)
    }

    fn format_suggestions(&self, available: usize, suggestions: &[ParameterSuggestion]) -> String {
        Self::pretty(&json!({
            "available": available,
            "suggestions": suggestions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestions_json_shape() {
        let out = JsonFormatter.format_suggestions(
            5,
            &[ParameterSuggestion {
                k: 2,
                m: 1,
                initial_count: 5,
            }],
        );
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["available"], 5);
        assert_eq!(value["suggestions"][0]["k"], 2);
        assert_eq!(value["suggestions"][0]["initial_count"], 5);
    }
}
