//! Terminal interaction: password prompts and notices

use std::io::{self, BufRead, IsTerminal};

use async_trait::async_trait;
use pdfunlock_batch::{Notifier, PasswordPrompt};
use tracing::debug;

/// Asks for passwords on the terminal without echoing them
///
/// When stdin is not a terminal the answer is read as a plain line instead.
/// End of input or an unreadable terminal counts as a cancelled prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl StdinPrompt {
    pub async fn read_password(&self, question: &str) -> Option<String> {
        let question = question.to_string();
        tokio::task::spawn_blocking(move || prompt_blocking(&question))
            .await
            .ok()
            .flatten()
    }
}

fn prompt_blocking(question: &str) -> Option<String> {
    if io::stdin().is_terminal() {
        return rpassword::prompt_password(question)
            .map_err(|err| debug!(error = %err, "password prompt failed"))
            .ok();
    }

    eprint!("{}", question);
    read_answer(&mut io::stdin().lock())
}

/// One line of `input` without its line ending, `None` at end of input
fn read_answer(input: &mut impl BufRead) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

#[async_trait]
impl PasswordPrompt for StdinPrompt {
    async fn ask(&self, file_name: &str) -> Option<String> {
        self.read_password(&format!("Password for {}: ", file_name)).await
    }
}

/// Prints notices on stderr
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }
}
