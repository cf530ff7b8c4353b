// fitbook/src/model/user.rs

use super::Identified;
use crate::error::{FitbookError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Client,
  Trainer,
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Role::Client => f.write_str("client"),
      Role::Trainer => f.write_str("trainer"),
    }
  }
}

impl std::str::FromStr for Role {
  type Err = FitbookError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "client" => Ok(Role::Client),
      "trainer" => Ok(Role::Trainer),
      other => Err(FitbookError::Validation(format!("Unknown account type '{other}'"))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  #[serde(rename = "_id", alias = "id")]
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(rename = "userType", default)]
  pub role: Role,
}

impl Identified for User {
  fn id(&self) -> &str {
    &self.id
  }
}

impl User {
  pub fn is_trainer(&self) -> bool {
    self.role == Role::Trainer
  }
}

/// Sign-up form. `password_confirmation` is checked locally and never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
  pub name: String,
  pub email: String,
  pub password: String,
  #[serde(skip)]
  pub password_confirmation: String,
  #[serde(rename = "userType")]
  pub role: Role,
}

impl Registration {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(FitbookError::Validation("Name is required".into()));
    }
    if self.email.is_empty() {
      return Err(FitbookError::Validation("Email is required".into()));
    }
    if !is_valid_email(&self.email) {
      return Err(FitbookError::Validation("Please enter a valid email address".into()));
    }
    if self.password.is_empty() {
      return Err(FitbookError::Validation("Password is required".into()));
    }
    if self.password.chars().count() < 8 {
      return Err(FitbookError::Validation("Password must be at least 8 characters".into()));
    }
    if self.password != self.password_confirmation {
      return Err(FitbookError::Validation("Passwords do not match".into()));
    }
    Ok(())
  }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  domain
    .char_indices()
    .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// North-American style numbers: `(555) 123-4567`, `555.123.4567`,
/// `5551234567`.
pub fn is_valid_phone(phone: &str) -> bool {
  fn digits<'a>(s: &'a str, n: usize) -> Option<&'a str> {
    let head = s.get(..n)?;
    head.bytes().all(|b| b.is_ascii_digit()).then(|| &s[n..])
  }
  fn separator(s: &str) -> &str {
    s.strip_prefix(&['-', '.', ' '][..]).unwrap_or(s)
  }

  let rest = phone.strip_prefix('(').unwrap_or(phone);
  let Some(rest) = digits(rest, 3) else {
    return false;
  };
  let rest = separator(rest.strip_prefix(')').unwrap_or(rest));
  let Some(rest) = digits(rest, 3) else {
    return false;
  };
  matches!(digits(separator(rest), 4), Some(""))
}

/// Editable profile as returned by `GET /profile`. Client and trainer fields
/// share one document; the unused half stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
  pub phone: String,
  pub bio: String,
  pub fitness_preferences: Vec<String>,
  pub fitness_goals: String,
  pub availability_preferences: Vec<String>,
  pub qualifications: String,
  pub specialties: Vec<String>,
  pub teaching_style: String,
}

/// Body of `PUT /profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
  pub name: String,
  pub email: String,
  #[serde(flatten)]
  pub profile: Profile,
}

impl ProfileUpdate {
  /// Starts an edit from the signed-in user and their stored profile.
  pub fn from_current(user: &User, profile: &Profile) -> Self {
    Self {
      name: user.name.clone(),
      email: user.email.clone(),
      profile: profile.clone(),
    }
  }

  pub fn validate(&self, role: Role) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(FitbookError::Validation("Name is required".into()));
    }
    if !self.profile.phone.is_empty() && !is_valid_phone(&self.profile.phone) {
      return Err(FitbookError::Validation("Please enter a valid phone number".into()));
    }
    match role {
      Role::Client if self.profile.fitness_preferences.is_empty() => Err(FitbookError::Validation(
        "Please select at least one fitness preference".into(),
      )),
      Role::Trainer if self.profile.qualifications.trim().is_empty() => {
        Err(FitbookError::Validation("Please enter your qualifications".into()))
      }
      Role::Trainer if self.profile.specialties.is_empty() => {
        Err(FitbookError::Validation("Please select at least one specialty".into()))
      }
      _ => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn registration() -> Registration {
    Registration {
      name: "Jo".into(),
      email: "jo@example.com".into(),
      password: "hunter2hunter2".into(),
      password_confirmation: "hunter2hunter2".into(),
      role: Role::Client,
    }
  }

  #[test]
  fn registration_body_omits_confirmation() {
    assert_eq!(
      serde_json::to_value(registration()).unwrap(),
      json!({"name": "Jo", "email": "jo@example.com", "password": "hunter2hunter2", "userType": "client"})
    );
  }

  #[test]
  fn registration_rules_report_first_failure() {
    let check = |r: Registration| r.validate().err().map(|e| e.user_message());
    assert_eq!(check(registration()), None);
    assert_eq!(check(Registration { name: " ".into(), ..registration() }).as_deref(), Some("Name is required"));
    assert_eq!(
      check(Registration { email: "jo@example".into(), ..registration() }).as_deref(),
      Some("Please enter a valid email address")
    );
    assert_eq!(
      check(Registration { password: "short".into(), password_confirmation: "short".into(), ..registration() })
        .as_deref(),
      Some("Password must be at least 8 characters")
    );
    assert_eq!(
      check(Registration { password_confirmation: "different1".into(), ..registration() }).as_deref(),
      Some("Passwords do not match")
    );
  }

  #[test]
  fn phone_formats() {
    for ok in ["5551234567", "(555) 123-4567", "555.123.4567", "555-123 4567"] {
      assert!(is_valid_phone(ok), "{ok}");
    }
    for bad in ["555-1234", "55512345678", "abc-def-ghij", "(555)--123-4567"] {
      assert!(!is_valid_phone(bad), "{bad}");
    }
  }

  #[test]
  fn profile_rules_depend_on_role() {
    let user = User { id: "u1".into(), name: "Jo".into(), email: "jo@example.com".into(), role: Role::Trainer };
    let mut update = ProfileUpdate::from_current(&user, &Profile::default());
    assert_eq!(
      update.validate(Role::Client).unwrap_err().user_message(),
      "Please select at least one fitness preference"
    );
    assert_eq!(update.validate(Role::Trainer).unwrap_err().user_message(), "Please enter your qualifications");
    update.profile.qualifications = "NASM CPT".into();
    assert_eq!(update.validate(Role::Trainer).unwrap_err().user_message(), "Please select at least one specialty");
    update.profile.specialties = vec!["Strength".into()];
    assert!(update.validate(Role::Trainer).is_ok());

    update.profile.phone = "12".into();
    assert_eq!(update.validate(Role::Trainer).unwrap_err().user_message(), "Please enter a valid phone number");
  }

  #[test]
  fn user_accepts_either_id_key() {
    let u: User = serde_json::from_value(json!({"id": "u1", "name": "Jo", "email": "a@b.co", "userType": "trainer"})).unwrap();
    assert!(u.is_trainer());
  }
}
