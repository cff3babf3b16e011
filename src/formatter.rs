//! Rendering of assertion sequences and per-scope outcome messages.

use crate::runner::ScopeOutcome;
use crate::Term;

/// Render a term sequence as the sentence it was written as.
pub fn render_sequence(terms: &[Term]) -> String {
    terms
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a scope's aggregated outcome:
/// `"<scope path>: <PASS|FAIL|ERROR>"`, with the first failing sequence
/// and/or error text appended when the scope did not pass.
pub fn format_outcome(path: &str, outcome: &ScopeOutcome) -> String {
    let status = if outcome.error.is_some() {
        "ERROR"
    } else if outcome.failed > 0 {
        "FAIL"
    } else {
        "PASS"
    };

    let mut msg = format!("{}: {}", path, status);
    if !outcome.passed() {
        if let Some(seq) = &outcome.failing_seq {
            msg.push_str(&format!("\n\t{}", seq));
        }
        if let Some(error) = &outcome.error {
            msg.push_str(&format!("\n\tError: {}", error));
        }
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::val;
    use crate::{equal, Should};

    #[test]
    fn test_render_sequence() {
        let seq = vec![val(1), Should.into(), equal(), val(2)];
        assert_eq!(render_sequence(&seq), "1 Should Equal 2");
    }

    #[test]
    fn test_format_pass() {
        let outcome = ScopeOutcome {
            ran: 2,
            failed: 0,
            error: None,
            failing_seq: None,
        };
        assert_eq!(format_outcome("A SpecTest call", &outcome), "A SpecTest call: PASS");
    }

    #[test]
    fn test_format_fail_includes_sequence() {
        let outcome = ScopeOutcome {
            ran: 2,
            failed: 1,
            error: None,
            failing_seq: Some("1 Should Equal 2".to_string()),
        };
        assert_eq!(
            format_outcome("A B", &outcome),
            "A B: FAIL\n\t1 Should Equal 2"
        );
    }

    #[test]
    fn test_format_error_includes_error_text() {
        let outcome = ScopeOutcome {
            ran: 1,
            failed: 1,
            error: Some("missing matcher".to_string()),
            failing_seq: Some("1 Should".to_string()),
        };
        assert_eq!(
            format_outcome("A", &outcome),
            "A: ERROR\n\t1 Should\n\tError: missing matcher"
        );
    }
}
