// fitbook/src/model/class.rs

use super::serde_fmt::hhmm;
use super::trainer::Trainer;
use super::{Identified, Ref};
use crate::error::{FitbookError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of a weekly schedule slot, spelled out in full on the wire
/// (`"Monday"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Day {
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
  Saturday,
  Sunday,
}

impl Day {
  pub const ALL: [Day; 7] = [
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
    Day::Friday,
    Day::Saturday,
    Day::Sunday,
  ];

  pub fn weekday(self) -> Weekday {
    match self {
      Day::Monday => Weekday::Mon,
      Day::Tuesday => Weekday::Tue,
      Day::Wednesday => Weekday::Wed,
      Day::Thursday => Weekday::Thu,
      Day::Friday => Weekday::Fri,
      Day::Saturday => Weekday::Sat,
      Day::Sunday => Weekday::Sun,
    }
  }

  pub fn from_weekday(weekday: Weekday) -> Self {
    Day::ALL[weekday.num_days_from_monday() as usize]
  }
}

impl fmt::Display for Day {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

impl std::str::FromStr for Day {
  type Err = FitbookError;

  fn from_str(s: &str) -> Result<Self> {
    s.parse::<Weekday>()
      .map(Day::from_weekday)
      .map_err(|_| FitbookError::Validation(format!("Unknown day '{s}'")))
  }
}

/// The next date on `day`, strictly after `today`. A slot that falls on
/// today's weekday is booked for the same weekday next week.
pub fn next_occurrence(day: Day, today: NaiveDate) -> NaiveDate {
  let current = today.weekday().num_days_from_monday() as i64;
  let target = day.weekday().num_days_from_monday() as i64;
  let mut ahead = (target - current).rem_euclid(7);
  if ahead == 0 {
    ahead = 7;
  }
  today + Duration::days(ahead)
}

/// The next `count` dates on `day`, one week apart.
pub fn upcoming_dates(day: Day, today: NaiveDate, count: usize) -> Vec<NaiveDate> {
  let first = next_occurrence(day, today);
  (0..count).map(|i| first + Duration::weeks(i as i64)).collect()
}

/// A recurring weekly window published by a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
  pub day: Day,
  #[serde(with = "hhmm")]
  pub start_time: NaiveTime,
  #[serde(with = "hhmm")]
  pub end_time: NaiveTime,
}

impl ScheduleSlot {
  pub fn new(day: Day, start_time: NaiveTime, end_time: NaiveTime) -> Self {
    Self {
      day,
      start_time,
      end_time,
    }
  }

  /// Parses `"Monday 09:00-10:00"`.
  pub fn parse(raw: &str) -> Result<Self> {
    let invalid = || FitbookError::Validation(format!("Expected '<Day> HH:MM-HH:MM', got '{raw}'"));
    let (day, window) = raw.trim().split_once(' ').ok_or_else(invalid)?;
    let (start, end) = window.trim().split_once('-').ok_or_else(invalid)?;
    let parse_time = |t: &str| NaiveTime::parse_from_str(t.trim(), hhmm::FORMAT).map_err(|_| invalid());
    Ok(Self::new(day.parse()?, parse_time(start)?, parse_time(end)?))
  }

  pub fn validate(&self) -> Result<()> {
    if self.end_time <= self.start_time {
      return Err(FitbookError::Validation("End time must be after start time".to_string()));
    }
    Ok(())
  }

  pub fn overlaps(&self, other: &ScheduleSlot) -> bool {
    self.day == other.day && self.start_time < other.end_time && other.start_time < self.end_time
  }

  pub fn duration_minutes(&self) -> i64 {
    (self.end_time - self.start_time).num_minutes()
  }
}

impl fmt::Display for ScheduleSlot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} {}-{}",
      self.day,
      self.start_time.format(hhmm::FORMAT),
      self.end_time.format(hhmm::FORMAT)
    )
  }
}

/// Validates a whole weekly schedule: every slot well-formed, no two slots on
/// the same day overlapping.
pub fn validate_schedule(schedule: &[ScheduleSlot]) -> Result<()> {
  for (idx, slot) in schedule.iter().enumerate() {
    slot.validate()?;
    if schedule[..idx].iter().any(|earlier| earlier.overlaps(slot)) {
      return Err(FitbookError::Validation(format!(
        "The time slot {slot} overlaps with an existing schedule"
      )));
    }
  }
  Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOffering {
  #[serde(rename = "_id", alias = "id")]
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(rename = "type", default)]
  pub class_type: String,
  /// Minutes.
  #[serde(default)]
  pub duration: u32,
  #[serde(default)]
  pub price: f64,
  #[serde(default)]
  pub location: String,
  #[serde(default = "default_active")]
  pub is_active: bool,
  #[serde(default)]
  pub schedule: Vec<ScheduleSlot>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub trainer: Option<Ref<Trainer>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
  true
}

impl Identified for ClassOffering {
  fn id(&self) -> &str {
    &self.id
  }
}

impl ClassOffering {
  /// The published slot matching `slot`, if the class offers it.
  pub fn find_slot(&self, slot: &ScheduleSlot) -> Option<&ScheduleSlot> {
    self.schedule.iter().find(|s| *s == slot)
  }

  pub fn trainer_rating(&self) -> f64 {
    self
      .trainer
      .as_ref()
      .and_then(Ref::doc)
      .and_then(|t| t.profile.rating)
      .unwrap_or(0.0)
  }
}

/// Body of `POST /classes` and `PUT /classes/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDraft {
  pub title: String,
  pub description: String,
  #[serde(rename = "type")]
  pub class_type: String,
  pub duration: u32,
  pub price: f64,
  pub location: String,
  pub is_active: bool,
  pub schedule: Vec<ScheduleSlot>,
}

impl Default for ClassDraft {
  fn default() -> Self {
    Self {
      title: String::new(),
      description: String::new(),
      class_type: String::new(),
      duration: 60,
      price: 0.0,
      location: "Virtual".to_string(),
      is_active: true,
      schedule: Vec::new(),
    }
  }
}

impl ClassDraft {
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(FitbookError::Validation("Title is required".to_string()));
    }
    if self.class_type.trim().is_empty() {
      return Err(FitbookError::Validation("Class type is required".to_string()));
    }
    if self.duration == 0 {
      return Err(FitbookError::Validation("Duration must be greater than 0".to_string()));
    }
    if !self.price.is_finite() || self.price < 0.0 {
      return Err(FitbookError::Validation("Price cannot be negative".to_string()));
    }
    if self.schedule.is_empty() {
      return Err(FitbookError::Validation("Add at least one schedule slot".to_string()));
    }
    validate_schedule(&self.schedule)
  }
}

impl From<&ClassOffering> for ClassDraft {
  fn from(class: &ClassOffering) -> Self {
    Self {
      title: class.title.clone(),
      description: class.description.clone(),
      class_type: class.class_type.clone(),
      duration: class.duration,
      price: class.price,
      location: class.location.clone(),
      is_active: class.is_active,
      schedule: class.schedule.clone(),
    }
  }
}

/// Server-side filters for `GET /classes`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassFilters {
  pub class_type: Option<String>,
  pub location: Option<String>,
  pub trainer_id: Option<String>,
  pub search: Option<String>,
}

impl ClassFilters {
  pub fn to_pairs(&self) -> Vec<(String, String)> {
    [
      ("type", &self.class_type),
      ("location", &self.location),
      ("trainerId", &self.trainer_id),
      ("search", &self.search),
    ]
    .into_iter()
    .filter_map(|(key, value)| {
      value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| (key.to_string(), v.to_string()))
    })
    .collect()
  }
}
