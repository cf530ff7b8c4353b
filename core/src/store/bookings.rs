// fitbook/src/store/bookings.rs

use super::status::{replace_by_id, SliceStatus};
use crate::model::{Booking, BookingStats};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingsState {
  /// The signed-in client's bookings, newest first after a create.
  pub bookings: Vec<Booking>,
  pub trainer_bookings: Vec<Booking>,
  pub current: Option<Booking>,
  pub stats: Option<BookingStats>,
  pub status: SliceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingsAction {
  Pending,
  Listed(Vec<Booking>),
  TrainerListed(Vec<Booking>),
  Loaded(Booking),
  Created(Booking),
  /// A client cancellation came back.
  Cancelled(Booking),
  /// A trainer status change came back.
  StatusUpdated(Booking),
  Stats(BookingStats),
  Rejected(String),
  ClearCurrent,
  Reset,
}

impl BookingsState {
  pub fn reduce(&mut self, action: BookingsAction) {
    match action {
      BookingsAction::Pending => self.status.pending(),
      BookingsAction::Listed(bookings) => {
        self.bookings = bookings;
        self.status.fulfilled();
      }
      BookingsAction::TrainerListed(bookings) => {
        self.trainer_bookings = bookings;
        self.status.fulfilled();
      }
      BookingsAction::Loaded(booking) => {
        self.current = Some(booking);
        self.status.fulfilled();
      }
      BookingsAction::Created(booking) => {
        self.bookings.insert(0, booking);
        self.status.fulfilled();
      }
      BookingsAction::Cancelled(booking) => {
        replace_by_id(&mut self.bookings, &booking);
        self.refresh_current(booking);
        self.status.fulfilled();
      }
      BookingsAction::StatusUpdated(booking) => {
        replace_by_id(&mut self.trainer_bookings, &booking);
        self.refresh_current(booking);
        self.status.fulfilled();
      }
      BookingsAction::Stats(stats) => {
        self.stats = Some(stats);
        self.status.fulfilled();
      }
      BookingsAction::Rejected(message) => self.status.rejected(message),
      BookingsAction::ClearCurrent => self.current = None,
      BookingsAction::Reset => self.status.reset(),
    }
  }

  fn refresh_current(&mut self, booking: Booking) {
    if self.current.as_ref().is_some_and(|c| c.id == booking.id) {
      self.current = Some(booking);
    }
  }
}
