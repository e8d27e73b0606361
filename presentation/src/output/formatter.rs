//! Output formatter trait

use decider_application::SessionStatusView;
use decider_domain::{DecisionSession, ParameterSuggestion};

/// Renders use case results for the terminal
pub trait OutputFormatter {
    /// Full status of one session
    fn format_status(&self, view: &SessionStatusView) -> String;

    /// Short confirmation after a session was created or changed
    fn format_session(&self, session: &DecisionSession) -> String;

    /// One line per stored session
    fn format_list(&self, sessions: &[DecisionSession]) -> String;

    /// Feasible (K, M) combinations
    fn format_suggestions(&self, available: usize, suggestions: &[ParameterSuggestion]) -> String;
}
