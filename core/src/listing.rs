// fitbook/src/listing.rs

//! Client-side list views: booking tabs, class ordering, free-text search.
//! All functions are pure and keep the input order for equal keys.

use crate::error::FitbookError;
use crate::model::{Booking, BookingStatus, ClassOffering, Payment, PaymentRecordStatus, Trainer};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingTab {
  /// Neither cancelled nor completed.
  #[default]
  Upcoming,
  Completed,
  Cancelled,
}

impl BookingTab {
  pub const ALL: [BookingTab; 3] = [BookingTab::Upcoming, BookingTab::Completed, BookingTab::Cancelled];

  pub fn matches(self, booking: &Booking) -> bool {
    match self {
      BookingTab::Upcoming => booking.is_upcoming(),
      BookingTab::Completed => booking.status == BookingStatus::Completed,
      BookingTab::Cancelled => booking.status == BookingStatus::Cancelled,
    }
  }
}

impl fmt::Display for BookingTab {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      BookingTab::Upcoming => "upcoming",
      BookingTab::Completed => "completed",
      BookingTab::Cancelled => "cancelled",
    })
  }
}

impl FromStr for BookingTab {
  type Err = FitbookError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    BookingTab::ALL
      .into_iter()
      .find(|tab| tab.to_string().eq_ignore_ascii_case(s))
      .ok_or_else(|| FitbookError::Validation(format!("Unknown booking tab '{s}'")))
  }
}

pub fn filter_bookings(bookings: &[Booking], tab: BookingTab) -> Vec<&Booking> {
  bookings.iter().filter(|b| tab.matches(b)).collect()
}

/// Splits into (upcoming, completed, cancelled).
pub fn partition_bookings(bookings: &[Booking]) -> (Vec<&Booking>, Vec<&Booking>, Vec<&Booking>) {
  (
    filter_bookings(bookings, BookingTab::Upcoming),
    filter_bookings(bookings, BookingTab::Completed),
    filter_bookings(bookings, BookingTab::Cancelled),
  )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassSort {
  /// Most recently created first; undated classes last.
  #[default]
  Newest,
  PriceLow,
  PriceHigh,
  DurationShort,
  DurationLong,
  /// Trainer rating, best first; unrated counts as 0.
  Rating,
}

impl ClassSort {
  pub const ALL: [ClassSort; 6] = [
    ClassSort::Newest,
    ClassSort::PriceLow,
    ClassSort::PriceHigh,
    ClassSort::DurationShort,
    ClassSort::DurationLong,
    ClassSort::Rating,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      ClassSort::Newest => "newest",
      ClassSort::PriceLow => "price-low",
      ClassSort::PriceHigh => "price-high",
      ClassSort::DurationShort => "duration-short",
      ClassSort::DurationLong => "duration-long",
      ClassSort::Rating => "rating",
    }
  }

  fn compare(self, a: &ClassOffering, b: &ClassOffering) -> Ordering {
    match self {
      ClassSort::Newest => b.created_at.cmp(&a.created_at),
      ClassSort::PriceLow => a.price.total_cmp(&b.price),
      ClassSort::PriceHigh => b.price.total_cmp(&a.price),
      ClassSort::DurationShort => a.duration.cmp(&b.duration),
      ClassSort::DurationLong => b.duration.cmp(&a.duration),
      ClassSort::Rating => b.trainer_rating().total_cmp(&a.trainer_rating()),
    }
  }
}

impl fmt::Display for ClassSort {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ClassSort {
  type Err = FitbookError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ClassSort::ALL
      .into_iter()
      .find(|sort| sort.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| FitbookError::Validation(format!("Unknown sort option '{s}'")))
  }
}

/// Stable sort in place.
pub fn sort_classes(classes: &mut [ClassOffering], sort: ClassSort) {
  classes.sort_by(|a, b| sort.compare(a, b));
}

pub fn sorted_classes(classes: &[ClassOffering], sort: ClassSort) -> Vec<ClassOffering> {
  let mut sorted = classes.to_vec();
  sort_classes(&mut sorted, sort);
  sorted
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
  haystack.to_lowercase().contains(needle_lower)
}

/// Name, specialties or bio contain `term`, ignoring case. A blank term keeps
/// everything.
pub fn search_trainers<'a>(trainers: &'a [Trainer], term: &str) -> Vec<&'a Trainer> {
  let term = term.trim().to_lowercase();
  trainers
    .iter()
    .filter(|t| {
      term.is_empty()
        || contains_ci(&t.name, &term)
        || t.profile.specialties.iter().any(|s| contains_ci(s, &term))
        || contains_ci(&t.profile.bio, &term)
    })
    .collect()
}

pub fn search_classes<'a>(classes: &'a [ClassOffering], term: &str) -> Vec<&'a ClassOffering> {
  let term = term.trim().to_lowercase();
  classes
    .iter()
    .filter(|c| {
      term.is_empty()
        || contains_ci(&c.title, &term)
        || contains_ci(&c.class_type, &term)
        || contains_ci(&c.description, &term)
    })
    .collect()
}

/// Distinct specialties across `trainers`, sorted. Feeds the specialty filter.
pub fn collect_specialties(trainers: &[Trainer]) -> Vec<String> {
  trainers
    .iter()
    .flat_map(|t| t.profile.specialties.iter().cloned())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

pub fn collect_class_types(classes: &[ClassOffering]) -> Vec<String> {
  classes
    .iter()
    .map(|c| c.class_type.clone())
    .filter(|t| !t.is_empty())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// `None` keeps the whole history.
pub fn filter_payments(payments: &[Payment], status: Option<PaymentRecordStatus>) -> Vec<&Payment> {
  payments
    .iter()
    .filter(|p| status.map_or(true, |s| p.status == s))
    .collect()
}
