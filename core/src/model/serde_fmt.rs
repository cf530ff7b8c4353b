// fitbook/src/model/serde_fmt.rs

//! Date and time encodings used on the wire.

/// `YYYY-MM-DD`. Deserialization also accepts a full RFC 3339 timestamp and
/// keeps its calendar date, which is what the backend returns for stored
/// bookings.
pub mod ymd {
  use chrono::NaiveDate;
  use serde::{de::Error, Deserialize, Deserializer, Serializer};

  pub const FORMAT: &str = "%Y-%m-%d";

  pub fn parse(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10)?;
    NaiveDate::parse_from_str(date_part, FORMAT).ok()
  }

  pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format(FORMAT).to_string())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date '{raw}'")))
  }
}

/// `HH:MM`, 24-hour.
pub mod hhmm {
  use chrono::NaiveTime;
  use serde::{de::Error, Deserialize, Deserializer, Serializer};

  pub const FORMAT: &str = "%H:%M";

  pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format(FORMAT).to_string())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&raw, FORMAT).map_err(|e| D::Error::custom(format!("invalid time '{raw}': {e}")))
  }
}
