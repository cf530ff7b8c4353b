// fitbook/src/store/mod.rs

//! Unidirectional application state.
//!
//! [`Store`] holds one [`AppState`] made of resource slices. The only way to
//! change it is [`Store::dispatch`] with an [`Action`]; each slice reduces its
//! own actions. [`Dispatcher`] runs the async side: it dispatches `Pending`,
//! performs the call, then dispatches the result or `Rejected(message)`.

mod auth;
mod bookings;
mod classes;
mod dispatcher;
mod payments;
mod profile;
mod status;
mod trainers;

pub use auth::{AuthAction, AuthState};
pub use bookings::{BookingsAction, BookingsState};
pub use classes::{ClassesAction, ClassesState};
pub use dispatcher::Dispatcher;
pub use payments::{PaymentsAction, PaymentsState};
pub use profile::{ProfileAction, ProfileState};
pub use status::SliceStatus;
pub use trainers::{TrainersAction, TrainersState};

use crate::flow::ContextData;
use parking_lot::MappedRwLockReadGuard;
use tracing::{event, Level};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
  pub auth: AuthState,
  pub classes: ClassesState,
  pub trainers: TrainersState,
  pub bookings: BookingsState,
  pub payments: PaymentsState,
  pub profile: ProfileState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
  Auth(AuthAction),
  Classes(ClassesAction),
  Trainers(TrainersAction),
  Bookings(BookingsAction),
  Payments(PaymentsAction),
  Profile(ProfileAction),
}

/// Names a slice so async actions can emit its `Pending`/`Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceKind {
  Auth,
  Classes,
  Trainers,
  Bookings,
  Payments,
  Profile,
}

impl Action {
  pub fn pending(kind: SliceKind) -> Self {
    match kind {
      SliceKind::Auth => Action::Auth(AuthAction::Pending),
      SliceKind::Classes => Action::Classes(ClassesAction::Pending),
      SliceKind::Trainers => Action::Trainers(TrainersAction::Pending),
      SliceKind::Bookings => Action::Bookings(BookingsAction::Pending),
      SliceKind::Payments => Action::Payments(PaymentsAction::Pending),
      SliceKind::Profile => Action::Profile(ProfileAction::Pending),
    }
  }

  pub fn rejected(kind: SliceKind, message: String) -> Self {
    match kind {
      SliceKind::Auth => Action::Auth(AuthAction::Rejected(message)),
      SliceKind::Classes => Action::Classes(ClassesAction::Rejected(message)),
      SliceKind::Trainers => Action::Trainers(TrainersAction::Rejected(message)),
      SliceKind::Bookings => Action::Bookings(BookingsAction::Rejected(message)),
      SliceKind::Payments => Action::Payments(PaymentsAction::Rejected(message)),
      SliceKind::Profile => Action::Profile(ProfileAction::Rejected(message)),
    }
  }

  fn kind(&self) -> SliceKind {
    match self {
      Action::Auth(_) => SliceKind::Auth,
      Action::Classes(_) => SliceKind::Classes,
      Action::Trainers(_) => SliceKind::Trainers,
      Action::Bookings(_) => SliceKind::Bookings,
      Action::Payments(_) => SliceKind::Payments,
      Action::Profile(_) => SliceKind::Profile,
    }
  }
}

impl AppState {
  pub fn reduce(&mut self, action: Action) {
    match action {
      Action::Auth(a) => self.auth.reduce(a),
      Action::Classes(a) => self.classes.reduce(a),
      Action::Trainers(a) => self.trainers.reduce(a),
      Action::Bookings(a) => self.bookings.reduce(a),
      Action::Payments(a) => self.payments.reduce(a),
      Action::Profile(a) => self.profile.reduce(a),
    }
  }
}

/// Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct Store {
  state: ContextData<AppState>,
}

impl Store {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn dispatch(&self, action: Action) {
    event!(Level::TRACE, slice = ?action.kind(), "Dispatching action.");
    self.state.update(|state| state.reduce(action));
  }

  pub fn snapshot(&self) -> AppState {
    self.state.snapshot()
  }

  /// Borrow one part of the state, e.g. `store.select(|s| &s.bookings)`.
  /// Drop the guard before dispatching.
  pub fn select<U: ?Sized>(&self, f: impl FnOnce(&AppState) -> &U) -> MappedRwLockReadGuard<'_, U> {
    self.state.map_read(f)
  }
}
