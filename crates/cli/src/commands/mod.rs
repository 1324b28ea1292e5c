//! CLI command implementations.

pub mod account;
pub mod products;
pub mod shell;

use std::io::Write as _;

use stockroom_client::{ClientError, Route};
use stockroom_core::ProductId;

/// Errors from command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("not allowed here, redirected to {0}")]
    Redirected(Route),

    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("already in a shell")]
    NestedShell,
}

/// Write rendered text to stdout.
///
/// # Errors
///
/// Returns `CommandError::Output` if stdout is closed.
pub fn emit(text: &str) -> Result<(), CommandError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
