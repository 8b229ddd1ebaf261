use std::io::{self, BufRead, Write};

use admin_core::interaction::{Confirmer, Notifier};
use async_trait::async_trait;

/// Asks on the terminal; anything but `y`/`yes` declines.
pub struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || ask(&prompt, &mut io::stdin().lock()))
            .await
            .unwrap_or(false)
    }
}

fn ask(prompt: &str, input: &mut impl BufRead) -> bool {
    print!("{prompt} [y/N] ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn closed_input_declines() {
        let mut empty: &[u8] = b"";
        assert!(!ask("Delete?", &mut empty));
    }
}
