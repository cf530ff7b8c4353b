// fitbook/src/store/dispatcher.rs

use super::{Action, AuthAction, BookingsAction, ClassesAction, PaymentsAction, ProfileAction, SliceKind, Store, TrainersAction};
use crate::api::{ApiClient, RefundReceipt};
use crate::error::{FitbookError, Result};
use crate::model::{
  Actor, Booking, BookingQuery, BookingStats, BookingStatus, ClassDraft, ClassFilters, ClassOffering, Payment, Profile,
  ProfileUpdate, Registration, Review, ReviewDraft, Role, Trainer, TrainerFilters, User,
};
use crate::session::{SessionState, SignOutReason};
use chrono::NaiveDate;
use std::future::Future;
use tracing::{event, Level};

/// Async actions: each one dispatches `Pending`, runs its client-side guard
/// and the API call, then dispatches the outcome into the store.
#[derive(Debug, Clone)]
pub struct Dispatcher {
  client: ApiClient,
  store: Store,
}

impl Dispatcher {
  pub fn new(client: ApiClient, store: Store) -> Self {
    Self { client, store }
  }

  pub fn client(&self) -> &ApiClient {
    &self.client
  }

  pub fn store(&self) -> &Store {
    &self.store
  }

  async fn run<T, Fut>(&self, kind: SliceKind, work: Fut, done: impl FnOnce(T) -> Action) -> Result<T>
  where
    T: Clone,
    Fut: Future<Output = Result<T>>,
  {
    self.store.dispatch(Action::pending(kind));
    match work.await {
      Ok(value) => {
        self.store.dispatch(done(value.clone()));
        Ok(value)
      }
      Err(err) => {
        if err.is_unauthorized() {
          self.store.dispatch(Action::Auth(AuthAction::SignedOut(SignOutReason::Unauthorized)));
        }
        event!(Level::DEBUG, slice = ?kind, error = %err, "Action rejected.");
        self.store.dispatch(Action::rejected(kind, err.user_message()));
        Err(err)
      }
    }
  }

  // ---- auth ----

  /// Loads the persisted session and mirrors it into the auth slice.
  pub async fn restore_session(&self) -> Result<SessionState> {
    let state = self.client.session().restore().await?;
    match &state {
      SessionState::SignedIn(user) => self.store.dispatch(Action::Auth(AuthAction::SignedIn(user.clone()))),
      SessionState::SignedOut { reason } => self.store.dispatch(Action::Auth(AuthAction::SignedOut(*reason))),
    }
    Ok(state)
  }

  pub async fn login(&self, email: &str, password: &str) -> Result<User> {
    let work = async {
      if email.trim().is_empty() || password.is_empty() {
        return Err(FitbookError::Validation("Please enter your email and password".into()));
      }
      self.client.login(email, password).await
    };
    self
      .run(SliceKind::Auth, work, |user| Action::Auth(AuthAction::SignedIn(user)))
      .await
  }

  pub async fn register(&self, registration: &Registration) -> Result<User> {
    let work = async {
      registration.validate()?;
      self.client.register(registration).await
    };
    self
      .run(SliceKind::Auth, work, |user| Action::Auth(AuthAction::SignedIn(user)))
      .await
  }

  pub async fn logout(&self) -> Result<()> {
    self.client.logout().await?;
    self.store.dispatch(Action::Auth(AuthAction::SignedOut(SignOutReason::LoggedOut)));
    Ok(())
  }

  pub async fn refresh_user(&self) -> Result<User> {
    self
      .run(SliceKind::Auth, self.client.current_user(), |user| {
        Action::Auth(AuthAction::SignedIn(user))
      })
      .await
  }

  // ---- classes ----

  pub async fn load_classes(&self, filters: &ClassFilters) -> Result<Vec<ClassOffering>> {
    self
      .run(SliceKind::Classes, self.client.list_classes(filters), |c| {
        Action::Classes(ClassesAction::Listed(c))
      })
      .await
  }

  pub async fn load_class(&self, class_id: &str) -> Result<ClassOffering> {
    self
      .run(SliceKind::Classes, self.client.get_class(class_id), |c| {
        Action::Classes(ClassesAction::Loaded(c))
      })
      .await
  }

  pub async fn load_trainer_classes(&self, trainer_id: &str) -> Result<Vec<ClassOffering>> {
    self
      .run(SliceKind::Classes, self.client.trainer_classes(trainer_id), |c| {
        Action::Classes(ClassesAction::Listed(c))
      })
      .await
  }

  pub async fn load_recommendations(&self, limit: u32) -> Result<Vec<ClassOffering>> {
    self
      .run(SliceKind::Classes, self.client.recommended_classes(limit), |c| {
        Action::Classes(ClassesAction::Recommended(c))
      })
      .await
  }

  pub async fn create_class(&self, draft: &ClassDraft) -> Result<ClassOffering> {
    let work = async {
      self.client.session().require_role(Role::Trainer)?;
      draft.validate()?;
      self.client.create_class(draft).await
    };
    self
      .run(SliceKind::Classes, work, |c| Action::Classes(ClassesAction::Created(c)))
      .await
  }

  pub async fn update_class(&self, class_id: &str, draft: &ClassDraft) -> Result<ClassOffering> {
    let work = async {
      self.client.session().require_role(Role::Trainer)?;
      draft.validate()?;
      self.client.update_class(class_id, draft).await
    };
    self
      .run(SliceKind::Classes, work, |c| Action::Classes(ClassesAction::Updated(c)))
      .await
  }

  pub async fn delete_class(&self, class_id: &str) -> Result<()> {
    let work = async {
      self.client.session().require_role(Role::Trainer)?;
      self.client.delete_class(class_id).await
    };
    let deleted = class_id.to_string();
    self
      .run(SliceKind::Classes, work, move |()| Action::Classes(ClassesAction::Deleted(deleted)))
      .await
  }

  // ---- trainers ----

  pub async fn load_trainers(&self, filters: &TrainerFilters) -> Result<Vec<Trainer>> {
    self
      .run(SliceKind::Trainers, self.client.list_trainers(filters), |t| {
        Action::Trainers(TrainersAction::Listed(t))
      })
      .await
  }

  pub async fn load_trainer(&self, trainer_id: &str) -> Result<Trainer> {
    self
      .run(SliceKind::Trainers, self.client.get_trainer(trainer_id), |t| {
        Action::Trainers(TrainersAction::Loaded(t))
      })
      .await
  }

  pub async fn load_reviews(&self, trainer_id: &str) -> Result<Vec<Review>> {
    self
      .run(SliceKind::Trainers, self.client.trainer_reviews(trainer_id), |r| {
        Action::Trainers(TrainersAction::Reviews(r))
      })
      .await
  }

  /// Clients review trainers other than themselves.
  pub async fn add_review(&self, trainer_id: &str, draft: &ReviewDraft) -> Result<Review> {
    let work = async {
      let user = self.client.session().require_role(Role::Client)?;
      if user.id == trainer_id {
        return Err(FitbookError::Validation("You cannot review yourself".into()));
      }
      draft.validate()?;
      self.client.add_review(trainer_id, draft).await
    };
    self
      .run(SliceKind::Trainers, work, |r| Action::Trainers(TrainersAction::ReviewAdded(r)))
      .await
  }

  pub async fn respond_to_review(&self, review_id: &str, response: &str) -> Result<Review> {
    let work = async {
      self.client.session().require_role(Role::Trainer)?;
      if response.trim().is_empty() {
        return Err(FitbookError::Validation("Reply cannot be empty".into()));
      }
      self.client.respond_to_review(review_id, response).await
    };
    self
      .run(SliceKind::Trainers, work, |r| Action::Trainers(TrainersAction::ReviewUpdated(r)))
      .await
  }

  // ---- bookings ----

  pub async fn load_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>> {
    self
      .run(SliceKind::Bookings, self.client.list_bookings(query), |b| {
        Action::Bookings(BookingsAction::Listed(b))
      })
      .await
  }

  pub async fn load_booking(&self, booking_id: &str) -> Result<Booking> {
    self
      .run(SliceKind::Bookings, self.client.get_booking(booking_id), |b| {
        Action::Bookings(BookingsAction::Loaded(b))
      })
      .await
  }

  /// Client cancellation. Rejected locally when the class date is today or
  /// earlier, or the booking can no longer be cancelled.
  pub async fn cancel_booking(&self, booking: &Booking, today: NaiveDate) -> Result<Booking> {
    let work = async {
      booking.check_cancel(today)?;
      self.client.cancel_booking(&booking.id).await
    };
    self
      .run(SliceKind::Bookings, work, |b| Action::Bookings(BookingsAction::Cancelled(b)))
      .await
  }

  pub async fn load_trainer_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>> {
    let work = async {
      self.client.session().require_role(Role::Trainer)?;
      self.client.trainer_bookings(query).await
    };
    self
      .run(SliceKind::Bookings, work, |b| Action::Bookings(BookingsAction::TrainerListed(b)))
      .await
  }

  /// Trainer status change, checked against the booking lifecycle first.
  pub async fn update_booking_status(&self, booking: &Booking, status: BookingStatus) -> Result<Booking> {
    let work = async {
      self.client.session().require_role(Role::Trainer)?;
      booking.check_transition(status, Actor::Trainer)?;
      self.client.update_booking_status(&booking.id, status).await
    };
    self
      .run(SliceKind::Bookings, work, |b| Action::Bookings(BookingsAction::StatusUpdated(b)))
      .await
  }

  pub async fn load_booking_stats(&self) -> Result<BookingStats> {
    self
      .run(SliceKind::Bookings, self.client.booking_stats(), |s| {
        Action::Bookings(BookingsAction::Stats(s))
      })
      .await
  }

  // ---- payments ----

  pub async fn load_payment_history(&self) -> Result<Vec<Payment>> {
    self
      .run(SliceKind::Payments, self.client.payment_history(), |p| {
        Action::Payments(PaymentsAction::History(p))
      })
      .await
  }

  pub async fn load_payment(&self, payment_id: &str) -> Result<Payment> {
    self
      .run(SliceKind::Payments, self.client.payment_details(payment_id), |p| {
        Action::Payments(PaymentsAction::Loaded(p))
      })
      .await
  }

  /// Refunds a completed payment. The booking's own status is left alone.
  pub async fn refund_payment(&self, payment: &Payment, reason: Option<&str>) -> Result<RefundReceipt> {
    let work = async {
      if !payment.can_refund() {
        return Err(FitbookError::Validation(format!(
          "Only completed payments can be refunded (this one is {})",
          payment.status
        )));
      }
      self.client.refund_payment(&payment.id, reason).await
    };
    self
      .run(SliceKind::Payments, work, |receipt| {
        Action::Payments(PaymentsAction::Refunded {
          payment_id: receipt.payment_id,
        })
      })
      .await
  }

  // ---- profile ----

  pub async fn load_profile(&self) -> Result<Profile> {
    self
      .run(SliceKind::Profile, self.client.get_profile(), |p| {
        Action::Profile(ProfileAction::Loaded(p))
      })
      .await
  }

  pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
    let work = async {
      let user = self.client.session().require_user()?;
      update.validate(user.role)?;
      self.client.update_profile(update).await
    };
    self
      .run(SliceKind::Profile, work, |p| Action::Profile(ProfileAction::Updated(p)))
      .await
  }
}
