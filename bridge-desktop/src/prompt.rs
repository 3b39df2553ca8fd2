//! Confirmation prompts for desktop hosts.

use async_trait::async_trait;
use bridge_traits::ConfirmationPrompt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Answers every prompt the same way without asking anyone.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl ConfirmationPrompt for AutoConfirm {
    async fn confirm(&self, message: &str) -> bool {
        debug!(answer = self.0, message, "Auto-answering download prompt");
        self.0
    }
}

/// Replays queued answers and records every message shown.
///
/// Once the queue is empty every prompt is declined.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    shown: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.shown.lock().clone()
    }
}

#[async_trait]
impl ConfirmationPrompt for ScriptedPrompt {
    async fn confirm(&self, message: &str) -> bool {
        self.shown.lock().push(message.to_string());
        self.answers.lock().pop_front().unwrap_or(false)
    }
}

/// Asks on the controlling terminal and waits for `y`/`n`.
///
/// Reading happens on the blocking pool so the runtime keeps driving other
/// tracks while the question is open. Anything but an explicit yes declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

#[async_trait]
impl ConfirmationPrompt for TerminalPrompt {
    async fn confirm(&self, message: &str) -> bool {
        let message = message.to_string();
        let answer = core_async::task::spawn_blocking(move || -> std::io::Result<String> {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", message)?;
            write!(stdout, "[y/N] ")?;
            stdout.flush()?;

            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => is_yes(&line),
            Ok(Err(e)) => {
                warn!(error = %e, "Could not read prompt answer");
                false
            }
            Err(e) => {
                warn!(error = %e, "Prompt task failed");
                false
            }
        }
    }
}

fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_auto_confirm() {
        assert!(AutoConfirm(true).confirm("download?").await);
        assert!(!AutoConfirm(false).confirm("download?").await);
    }

    #[tokio::test]
    async fn test_scripted_prompt_replays_then_declines() {
        let prompt = ScriptedPrompt::new([true, false]);

        assert!(prompt.confirm("first").await);
        assert!(!prompt.confirm("second").await);
        assert!(!prompt.confirm("third").await);
        assert_eq!(prompt.messages(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_answer_parsing() {
        assert!(is_yes("y\n"));
        assert!(is_yes("  YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
        assert!(!is_yes("yep"));
    }
}
