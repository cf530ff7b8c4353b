// fitbook/src/store/trainers.rs

use super::status::{replace_by_id, SliceStatus};
use crate::model::{Review, Trainer};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainersState {
  pub trainers: Vec<Trainer>,
  pub current: Option<Trainer>,
  pub reviews: Vec<Review>,
  pub status: SliceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainersAction {
  Pending,
  Listed(Vec<Trainer>),
  Loaded(Trainer),
  Reviews(Vec<Review>),
  ReviewAdded(Review),
  ReviewUpdated(Review),
  Rejected(String),
  ClearCurrent,
  Reset,
}

impl TrainersState {
  pub fn reduce(&mut self, action: TrainersAction) {
    match action {
      TrainersAction::Pending => self.status.pending(),
      TrainersAction::Listed(trainers) => {
        self.trainers = trainers;
        self.status.fulfilled();
      }
      TrainersAction::Loaded(trainer) => {
        self.current = Some(trainer);
        self.status.fulfilled();
      }
      TrainersAction::Reviews(reviews) => {
        self.reviews = reviews;
        self.status.fulfilled();
      }
      TrainersAction::ReviewAdded(review) => {
        self.reviews.push(review);
        self.status.fulfilled();
      }
      TrainersAction::ReviewUpdated(review) => {
        replace_by_id(&mut self.reviews, &review);
        self.status.fulfilled();
      }
      TrainersAction::Rejected(message) => self.status.rejected(message),
      TrainersAction::ClearCurrent => self.current = None,
      TrainersAction::Reset => self.status.reset(),
    }
  }
}
