// booking_cli/src/render.rs

//! Plain-text views of store state.

use fitbook::checkout::{CheckoutCheckpoint, CheckoutPhase, CheckoutReport};
use fitbook::error::FitbookError;
use fitbook::model::{Booking, BookingStats, ClassOffering, Payment, Profile, Review, Trainer, User};
use fitbook::session::{SessionState, SignOutReason};

pub const LOGIN_HINT: &str = "Run `fitbook-cli login <email>` to continue.";

/// Error banner for a failed command.
pub fn banner(err: &anyhow::Error) {
  match err.downcast_ref::<FitbookError>() {
    Some(e) if e.is_unauthorized() => {
      eprintln!("! {}", e.user_message());
      eprintln!("  {}", LOGIN_HINT);
    }
    Some(FitbookError::NotAuthenticated) => {
      eprintln!("! You need to log in first.");
      eprintln!("  {}", LOGIN_HINT);
    }
    Some(FitbookError::PaymentCapturedUnconfirmed { intent_id, last_error }) => {
      eprintln!("! Your card was charged but the booking could not be confirmed ({}).", last_error);
      eprintln!("  Payment reference: {}", intent_id);
      eprintln!("  Run `fitbook-cli checkout retry-confirmation` to try again, or contact support with the reference.");
    }
    Some(e) => eprintln!("! {}", e.user_message()),
    None => eprintln!("! {:#}", err),
  }
}

pub fn session(state: &SessionState) {
  match state {
    SessionState::SignedIn(user) => print_user(user),
    SessionState::SignedOut { reason } => {
      let why = match reason {
        SignOutReason::NoSession => "Not logged in.",
        SignOutReason::LoggedOut => "Logged out.",
        SignOutReason::Unauthorized => "Your session has expired. Please log in again.",
      };
      println!("{}", why);
    }
  }
}

pub fn print_user(user: &User) {
  println!("{} <{}> ({})", user.name, user.email, user.role);
}

fn rating(value: Option<f64>) -> String {
  value.map_or_else(|| "unrated".to_string(), |r| format!("{:.1}★", r))
}

pub fn classes<'a>(classes: impl IntoIterator<Item = &'a ClassOffering>) {
  let mut any = false;
  for c in classes {
    any = true;
    println!(
      "{:<26} {:<28} {:<10} {:>4} min  ${:>7.2}  {}",
      c.id, c.title, c.class_type, c.duration, c.price, c.location
    );
  }
  if !any {
    println!("No classes found.");
  }
}

pub fn class(c: &ClassOffering) {
  println!("{} [{}]", c.title, c.id);
  if !c.description.is_empty() {
    println!("  {}", c.description);
  }
  println!("  Type: {}   Duration: {} min   Price: ${:.2}", c.class_type, c.duration, c.price);
  println!("  Location: {}{}", c.location, if c.is_active { "" } else { "   (not currently offered)" });
  if let Some(trainer) = c.trainer.as_ref().and_then(|t| t.doc()) {
    println!("  Trainer: {} ({})", trainer.name, rating(trainer.profile.rating));
  }
  println!("  Schedule:");
  for slot in &c.schedule {
    println!("    {}", slot);
  }
}

pub fn trainers<'a>(trainers: impl IntoIterator<Item = &'a Trainer>) {
  let mut any = false;
  for t in trainers {
    any = true;
    println!(
      "{:<26} {:<24} {:<8} {}",
      t.id,
      t.name,
      rating(t.profile.rating),
      t.profile.specialties.join(", ")
    );
  }
  if !any {
    println!("No trainers found.");
  }
}

pub fn trainer(t: &Trainer, reviews: &[Review]) {
  let p = &t.profile;
  println!("{} [{}]", t.name, t.id);
  println!("  Rating: {} from {} review(s)", rating(p.rating), p.review_count);
  if !p.specialties.is_empty() {
    println!("  Specialties: {}", p.specialties.join(", "));
  }
  if p.years_of_experience > 0 {
    println!("  Experience: {} years", p.years_of_experience);
  }
  if !p.bio.is_empty() {
    println!("  {}", p.bio);
  }
  if !reviews.is_empty() {
    println!("  Reviews:");
    for r in reviews {
      println!("    [{}] {}/5 by {}: {}", r.id, r.rating, r.client_name, r.comment);
      if let Some(reply) = &r.trainer_response {
        println!("      ↳ {}", reply);
      }
    }
  }
}

pub fn bookings<'a>(bookings: impl IntoIterator<Item = &'a Booking>) {
  let mut any = false;
  for b in bookings {
    any = true;
    println!(
      "{:<26} {} {}-{}  {:<24} {:<10} {}",
      b.id,
      b.date,
      b.start_time.format("%H:%M"),
      b.end_time.format("%H:%M"),
      b.class_title().unwrap_or("(class)"),
      b.status,
      b.payment_status
    );
  }
  if !any {
    println!("No bookings found.");
  }
}

pub fn booking(b: &Booking) {
  println!("Booking {}", b.id);
  println!("  Class: {}", b.class_title().unwrap_or_else(|| b.class.id()));
  println!(
    "  When: {} {}-{}",
    b.date,
    b.start_time.format("%H:%M"),
    b.end_time.format("%H:%M")
  );
  println!("  Status: {}   Payment: {}", b.status, b.payment_status);
  if let Some(notes) = b.notes.as_deref().filter(|n| !n.is_empty()) {
    println!("  Notes: {}", notes);
  }
}

pub fn stats(stats: &BookingStats) {
  for (key, value) in &stats.0 {
    println!("{:<20} {}", key, value);
  }
}

pub fn payments<'a>(payments: impl IntoIterator<Item = &'a Payment>) {
  let mut any = false;
  for p in payments {
    any = true;
    let when = p.created_at.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
    println!(
      "{:<26} ${:>7.2}  {:<10} {:<10} {}",
      p.id,
      p.amount,
      p.status,
      when,
      p.booking_id().unwrap_or("-")
    );
  }
  if !any {
    println!("No payments found.");
  }
}

pub fn payment(p: &Payment) {
  println!("Payment {}", p.id);
  println!("  Amount: ${:.2}   Status: {}", p.amount, p.status);
  if let Some(booking_id) = p.booking_id() {
    println!("  Booking: {}", booking_id);
  }
  if let Some(tx) = &p.transaction_id {
    println!("  Transaction: {}", tx);
  }
  if let Some(url) = &p.receipt_url {
    println!("  Receipt: {}", url);
  }
}

pub fn profile(user: Option<&User>, profile: &Profile) {
  if let Some(user) = user {
    print_user(user);
  }
  let field = |label: &str, value: &str| {
    if !value.is_empty() {
      println!("  {}: {}", label, value);
    }
  };
  field("Phone", &profile.phone);
  field("Bio", &profile.bio);
  field("Goals", &profile.fitness_goals);
  field("Preferences", &profile.fitness_preferences.join(", "));
  field("Qualifications", &profile.qualifications);
  field("Specialties", &profile.specialties.join(", "));
  field("Teaching style", &profile.teaching_style);
}

pub fn checkpoint(cp: &CheckoutCheckpoint) {
  println!("Checkout for {} on {} ({})", cp.class_title, cp.date, cp.slot);
  println!("  Amount: ${:.2}   State: {}", cp.amount, cp.phase);
  if let Some(booking_id) = &cp.booking_id {
    println!("  Booking: {}", booking_id);
  }
  if cp.charge_attempts > 0 {
    println!("  Charge attempts: {}", cp.charge_attempts);
  }
  if let Some(err) = &cp.last_error {
    println!("  Last error: {}", err);
  }
  let next = match &cp.phase {
    CheckoutPhase::IntentIssued { .. } => Some("retry-charge"),
    CheckoutPhase::CaptureUnconfirmed { .. } => Some("retry-confirmation"),
    phase if !phase.is_finished() => Some("resume"),
    _ => None,
  };
  if let Some(next) = next {
    println!("  Next: `fitbook-cli checkout {}` or `fitbook-cli checkout abort`", next);
  }
}

pub fn checkout_report(report: &CheckoutReport) {
  if let CheckoutPhase::Confirmed { payment_id } = &report.checkpoint.phase {
    println!("Booked and paid. Payment {}.", payment_id);
  }
  match &report.booking {
    Some(b) => booking(b),
    None => checkpoint(&report.checkpoint),
  }
}
