//! Console output formatter for session results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use decider_application::{CandidateSummary, SessionStatusView};
use decider_domain::{DecisionSession, ParameterSuggestion, SessionStatus};

/// Formats session results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn status_label(status: SessionStatus) -> String {
        let label = status.to_string();
        match status {
            SessionStatus::Configuring => label.normal().to_string(),
            SessionStatus::Eliminating | SessionStatus::CatchUp => label.yellow().bold().to_string(),
            SessionStatus::Completed => label.green().bold().to_string(),
            SessionStatus::Expired | SessionStatus::Cancelled => label.red().to_string(),
        }
    }

    fn candidate_line(candidate: &CandidateSummary) -> String {
        if candidate.category.is_empty() {
            format!("  * {} ({})", candidate.name, candidate.id)
        } else {
            format!(
                "  * {} ({}) {}",
                candidate.name,
                candidate.id,
                format!("[{}]", candidate.category).dimmed()
            )
        }
    }

    /// `1h 05m`, `12m 30s`, `45s`
    pub fn format_duration(secs: u64) -> String {
        let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        if h > 0 {
            format!("{}h {:02}m", h, m)
        } else if m > 0 {
            format!("{}m {:02}s", m, s)
        } else {
            format!("{}s", s)
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_status(&self, view: &SessionStatusView) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Session {}", view.session_id)));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Status:".cyan().bold(),
            Self::status_label(view.status)
        ));
        if let Some(params) = view.params {
            output.push_str(&format!("{} {}\n", "Parameters:".cyan().bold(), params));
        }
        if view.is_pinned {
            output.push_str(&format!("{}\n", "Pinned".dimmed()));
        }

        if let Some(holder) = &view.current_holder {
            output.push_str(&Self::section_header("Current Turn"));
            let whose = if view.is_your_turn {
                "your turn".green().bold().to_string()
            } else {
                holder.to_string()
            };
            output.push_str(&format!("Holder: {}\n", whose));
            if let Some(round) = view.round {
                let phase = if view.status == SessionStatus::CatchUp {
                    " (catch-up)"
                } else {
                    ""
                };
                output.push_str(&format!("Round: {}{}\n", round, phase));
            }
            if let Some(secs) = view.time_remaining_secs {
                output.push_str(&format!("Time left: {}\n", Self::format_duration(secs)));
            }
            output.push_str(&format!(
                "Skips used: {}/{}\n",
                view.skip_quota_used, view.skip_quota_total
            ));
            if view.pending_catch_up > 0 {
                output.push_str(&format!("Deferred turns: {}\n", view.pending_catch_up));
            }
        }

        if let Some(winner) = &view.final_selection {
            output.push_str(&Self::section_header("Final Selection"));
            output.push_str(&format!("{}\n", Self::candidate_line(winner).green().bold()));
            if !view.runners_up.is_empty() {
                output.push_str(&format!("\n{}\n", "Runners-up:".yellow().bold()));
                for candidate in &view.runners_up {
                    output.push_str(&format!("{}\n", Self::candidate_line(candidate)));
                }
            }
        } else if !view.candidates.is_empty() {
            output.push_str(&Self::section_header(&format!(
                "Candidates ({})",
                view.candidates.len()
            )));
            for candidate in &view.candidates {
                output.push_str(&format!("{}\n", Self::candidate_line(candidate)));
            }
        }

        output.push_str(&format!("\n{}\n", "=".repeat(60).cyan()));
        output
    }

    fn format_session(&self, session: &DecisionSession) -> String {
        let mut output = format!(
            "{} {} [{}]",
            "Session".bold(),
            session.id,
            Self::status_label(session.status)
        );
        if let Some(params) = session.params {
            output.push_str(&format!(" {}", params));
        }
        if let Some(winner) = &session.final_selection {
            output.push_str(&format!(" -> {}", winner.to_string().green().bold()));
        }
        output
    }

    fn format_list(&self, sessions: &[DecisionSession]) -> String {
        if sessions.is_empty() {
            return "No sessions.".dimmed().to_string();
        }
        sessions
            .iter()
            .map(|s| {
                let pin = if s.is_pinned { "*" } else { " " };
                format!(
                    "{} {}  {:<12} {:>3} left  {}",
                    pin,
                    s.id,
                    s.status.to_string(),
                    s.candidate_set.len(),
                    s.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_suggestions(&self, available: usize, suggestions: &[ParameterSuggestion]) -> String {
        if suggestions.is_empty() {
            return format!("No feasible parameters for {} candidates.", available);
        }
        let mut output = format!(
            "{}\n",
            format!("Feasible parameters for {} candidates:", available)
                .cyan()
                .bold()
        );
        for s in suggestions {
            output.push_str(&format!(
                "  K={} M={}  (starts with {})\n",
                s.k, s.m, s.initial_count
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(ConsoleFormatter::format_duration(45), "45s");
        assert_eq!(ConsoleFormatter::format_duration(750), "12m 30s");
        assert_eq!(ConsoleFormatter::format_duration(3900), "1h 05m");
    }

    #[test]
    fn test_format_suggestions_lists_each_option() {
        colored::control::set_override(false);
        let out = ConsoleFormatter.format_suggestions(
            5,
            &[
                ParameterSuggestion {
                    k: 2,
                    m: 1,
                    initial_count: 5,
                },
                ParameterSuggestion {
                    k: 1,
                    m: 3,
                    initial_count: 5,
                },
            ],
        );
        assert!(out.contains("K=2 M=1"));
        assert!(out.contains("K=1 M=3"));
        assert_eq!(
            ConsoleFormatter.format_suggestions(0, &[]),
            "No feasible parameters for 0 candidates."
        );
    }
}
