// booking_cli/src/main.rs

mod cli;
mod commands;
mod prompt;
mod render;
mod terminal_processor;

use crate::cli::Cli;
use crate::commands::App;
use clap::Parser;
use fitbook::{ApiClient, ClientConfig, Dispatcher, FileSessionStore, SessionContext, Store};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
  // Logs go to stderr so they never mix with command output.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_span_events(FmtSpan::CLOSE)
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      tracing::debug!(error = ?err, "Command failed.");
      render::banner(&err);
      ExitCode::FAILURE
    }
  }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
  let config = ClientConfig::from_env()?;

  let session = SessionContext::new(Arc::new(FileSessionStore::new(config.session_file.clone())));
  let client = ApiClient::http(&config, session)?;
  let dispatcher = Dispatcher::new(client, Store::new());
  dispatcher.restore_session().await?;

  let app = App {
    config,
    dispatcher,
    today: cli.today.unwrap_or_else(|| chrono::Local::now().date_naive()),
    mock_payments: cli.mock_payments,
  };
  commands::execute(&app, cli.command).await
}
