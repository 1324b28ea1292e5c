//! Interactive prompt.
//!
//! Every line is parsed as a regular command and run against the same
//! [`Stockroom`], so the product list is fetched once and reused until a
//! change or a logout clears it.

use clap::Parser;
use stockroom_client::Stockroom;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CommandError, emit};
use crate::Commands;

const PROMPT: &str = "stockroom> ";

#[derive(Parser)]
#[command(name = "stockroom", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

/// A line had an opening quote without a closing one.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unclosed quote")]
struct UnclosedQuote;

/// Read and run commands until `exit`, `quit` or end of input.
///
/// Command failures are printed and the prompt continues.
///
/// # Errors
///
/// Returns `CommandError::Output` if stdin or stdout fails.
pub async fn run(app: &Stockroom) -> Result<(), CommandError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    emit(&app.nav_menu().render())?;
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "exit" | "quit" => break,
            line => match split_words(line) {
                Err(e) => emit(&format!("error: {e}"))?,
                Ok(words) => match ShellLine::try_parse_from(words) {
                    Err(e) => emit(&e.render().to_string())?,
                    Ok(ShellLine { command }) => {
                        if let Err(e) = crate::execute(app, command).await {
                            emit(&format!("error: {e}"))?;
                        }
                    }
                },
            },
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> Result<(), CommandError> {
    use std::io::Write as _;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(PROMPT.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Split a line on whitespace, keeping single- or double-quoted text
/// together.
fn split_words(line: &str) -> Result<Vec<String>, UnclosedQuote> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = None;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(UnclosedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
