// booking_cli/src/prompt.rs

use fitbook::error::{FitbookError, Result};
use std::io::{self, BufRead, Write};

/// Prints `prompt` and reads one line from stdin off the async runtime.
/// The trailing newline is stripped.
pub async fn read_line(prompt: impl Into<String>) -> Result<String> {
  let prompt = prompt.into();
  let line = tokio::task::spawn_blocking(move || -> io::Result<String> {
    let mut stdout = io::stdout();
    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
  })
  .await
  .map_err(|e| FitbookError::Internal(format!("Prompt failed: {}", e)))??;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Asks for a password so it never lands in shell history or the process list.
pub async fn password(label: &str) -> Result<String> {
  let value = read_line(format!("{}: ", label)).await?;
  if value.is_empty() {
    return Err(FitbookError::Validation(format!("{} is required", label)));
  }
  Ok(value)
}
