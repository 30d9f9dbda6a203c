//! Interactive confirmation before the export starts.

use async_trait::async_trait;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use board_export::{ConfirmGate, RunSummary};

/// Asks on the terminal whether to proceed with the discovered workload.
///
/// Anything other than `y`/`yes` declines, as do Ctrl+C and Ctrl+D.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptGate;

#[async_trait]
impl ConfirmGate for PromptGate {
    async fn confirm(&self, summary: &RunSummary) -> bool {
        let question = confirmation_question(summary);
        match tokio::task::spawn_blocking(move || ask(&question)).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                tracing::warn!("Confirmation prompt failed: {e}");
                false
            }
            Err(e) => {
                tracing::warn!("Confirmation prompt task failed: {e}");
                false
            }
        }
    }
}

pub fn confirmation_question(summary: &RunSummary) -> String {
    format!(
        "  Found {} tasks across {} groups. Proceed? [y/N] ",
        summary.total_items, summary.total_groups
    )
}

pub fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn ask(question: &str) -> rustyline::Result<bool> {
    let mut rl = DefaultEditor::new()?;
    eprintln!();
    match rl.readline(question) {
        Ok(line) => Ok(parse_answer(&line)),
        Err(ReadlineError::Interrupted) => {
            eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Cancelled.");
            Ok(false)
        }
        Err(ReadlineError::Eof) => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert!(parse_answer("y"));
        assert!(parse_answer(" YES \n"));
        assert!(!parse_answer(""));
        assert!(!parse_answer("n"));
        assert!(!parse_answer("yep"));
    }

    #[test]
    fn test_question_wording() {
        let summary = RunSummary {
            total_items: 42,
            total_groups: 5,
        };
        assert_eq!(
            confirmation_question(&summary).trim(),
            "Found 42 tasks across 5 groups. Proceed? [y/N]"
        );
    }
}
