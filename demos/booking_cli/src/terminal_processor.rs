// booking_cli/src/terminal_processor.rs

use crate::prompt;
use async_trait::async_trait;
use fitbook::checkout::{ChargeReceipt, ChargeRequest, PaymentProcessor};
use fitbook::error::{FitbookError, Result};

/// Stands in for the card form: shows the amount and asks the user to
/// authorize it. Anything but "y" declines.
#[derive(Debug, Default)]
pub struct TerminalProcessor;

#[async_trait]
impl PaymentProcessor for TerminalProcessor {
  async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt> {
    let question = format!("Authorize a charge of ${:.2} for booking {}? [y/N] ", request.amount, request.booking_id);
    let answer = prompt::read_line(question).await?;

    if answer.trim().eq_ignore_ascii_case("y") {
      Ok(ChargeReceipt {
        intent_id: request.intent_id.clone(),
        status: "succeeded".to_string(),
      })
    } else {
      Err(FitbookError::Charge("The charge was not authorized".into()))
    }
  }
}
