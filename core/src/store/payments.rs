// fitbook/src/store/payments.rs

use super::status::SliceStatus;
use crate::model::{Payment, PaymentIntent, PaymentRecordStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentsState {
  pub payments: Vec<Payment>,
  pub current: Option<Payment>,
  /// The intent awaiting the external charge, if any.
  pub intent: Option<PaymentIntent>,
  pub status: SliceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentsAction {
  Pending,
  IntentCreated(PaymentIntent),
  Confirmed(Payment),
  Refunded { payment_id: String },
  History(Vec<Payment>),
  Loaded(Payment),
  Rejected(String),
  ClearIntent,
  ClearCurrent,
  Reset,
}

impl PaymentsState {
  pub fn reduce(&mut self, action: PaymentsAction) {
    match action {
      PaymentsAction::Pending => self.status.pending(),
      PaymentsAction::IntentCreated(intent) => {
        self.intent = Some(intent);
        self.status.fulfilled();
      }
      PaymentsAction::Confirmed(payment) => {
        self.current = Some(payment);
        self.intent = None;
        self.status.fulfilled();
      }
      PaymentsAction::Refunded { payment_id } => {
        for payment in self.payments.iter_mut().filter(|p| p.id == payment_id) {
          payment.status = PaymentRecordStatus::Refunded;
        }
        if let Some(current) = self.current.as_mut().filter(|p| p.id == payment_id) {
          current.status = PaymentRecordStatus::Refunded;
        }
        self.status.fulfilled();
      }
      PaymentsAction::History(payments) => {
        self.payments = payments;
        self.status.fulfilled();
      }
      PaymentsAction::Loaded(payment) => {
        self.current = Some(payment);
        self.status.fulfilled();
      }
      PaymentsAction::Rejected(message) => self.status.rejected(message),
      PaymentsAction::ClearIntent => self.intent = None,
      PaymentsAction::ClearCurrent => self.current = None,
      PaymentsAction::Reset => self.status.reset(),
    }
  }
}
