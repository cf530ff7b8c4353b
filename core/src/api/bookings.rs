// fitbook/src/api/bookings.rs

use super::client::ApiClient;
use super::TRAINER_CANCEL_NOTE;
use crate::error::Result;
use crate::model::{Booking, BookingQuery, BookingStats, BookingStatus, NewBooking};
use serde_json::json;

impl ApiClient {
  pub async fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>> {
    self.get("bookings", query.to_pairs()).await
  }

  pub async fn get_booking(&self, booking_id: &str) -> Result<Booking> {
    self.get(format!("bookings/{}", booking_id), Vec::new()).await
  }

  /// The backend answers with the new booking in `pending`.
  pub async fn create_booking(&self, booking: &NewBooking) -> Result<Booking> {
    self.post("bookings", booking).await
  }

  /// Client-side cancellation.
  pub async fn cancel_booking(&self, booking_id: &str) -> Result<Booking> {
    self
      .put(format!("bookings/{}", booking_id), &json!({ "status": BookingStatus::Cancelled }))
      .await
  }

  pub async fn trainer_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>> {
    self.get("bookings/trainer", query.to_pairs()).await
  }

  /// Trainer-side status change.
  pub async fn update_booking_status(&self, booking_id: &str, status: BookingStatus) -> Result<Booking> {
    let notes = if status == BookingStatus::Cancelled { TRAINER_CANCEL_NOTE } else { "" };
    self
      .put(format!("bookings/trainer/{}", booking_id), &json!({ "status": status, "notes": notes }))
      .await
  }

  pub async fn booking_stats(&self) -> Result<BookingStats> {
    self.get("bookings/stats", Vec::new()).await
  }
}
