// booking_cli/src/cli.rs

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fitbook::listing::{BookingTab, ClassSort};
use fitbook::model::{BookingStatus, PaymentRecordStatus, Role};

#[derive(Parser)]
#[command(name = "fitbook-cli")]
#[command(about = "Browse, book and pay for fitness classes")]
#[command(
  after_help = "Environment:\n  FITBOOK_API_URL        Backend base URL\n  FITBOOK_SESSION_FILE   Where the session is kept\n  FITBOOK_CHECKOUT_FILE  Where an unfinished checkout is kept\n  RUST_LOG               Log filter (default: warn)"
)]
pub struct Cli {
  /// Charge through the built-in mock processor instead of asking at the terminal.
  #[arg(long, global = true, default_value_t = false)]
  pub mock_payments: bool,
  /// Treat this date (YYYY-MM-DD) as today.
  #[arg(long, global = true)]
  pub today: Option<NaiveDate>,
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
  /// Signs in; the password is read from stdin.
  Login {
    email: String,
  },
  Register {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "client")]
    role: Role,
  },
  Logout,
  Whoami,
  ForgotPassword {
    email: String,
  },
  ResetPassword {
    token: String,
  },
  /// Browse classes.
  Classes {
    #[command(subcommand)]
    command: ClassesCommand,
  },
  /// Manage your own classes (trainers).
  Class {
    #[command(subcommand)]
    command: ClassCommand,
  },
  Trainers {
    #[command(subcommand)]
    command: TrainersCommand,
  },
  Bookings {
    #[command(subcommand)]
    command: BookingsCommand,
  },
  /// Bookings for your classes (trainers).
  TrainerBookings {
    #[command(subcommand)]
    command: TrainerBookingsCommand,
  },
  /// Book a class slot and pay for it.
  Book {
    class_id: String,
    /// e.g. "Monday 09:00-10:00"
    #[arg(long)]
    slot: String,
  },
  /// Inspect or continue an unfinished booking payment.
  Checkout {
    #[command(subcommand)]
    command: CheckoutCommand,
  },
  Payments {
    #[command(subcommand)]
    command: PaymentsCommand,
  },
  Profile {
    #[command(subcommand)]
    command: ProfileCommand,
  },
}

#[derive(Subcommand)]
pub enum ClassesCommand {
  List {
    #[arg(long, default_value = "newest")]
    sort: ClassSort,
    #[arg(long)]
    search: Option<String>,
    #[arg(long = "type")]
    class_type: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    trainer: Option<String>,
  },
  Show {
    id: String,
  },
  Recommended {
    #[arg(long, default_value_t = 5)]
    limit: u32,
  },
}

#[derive(Subcommand)]
pub enum ClassCommand {
  Create {
    #[arg(long)]
    title: String,
    #[arg(long = "type")]
    class_type: String,
    #[arg(long, default_value_t = 60)]
    duration: u32,
    #[arg(long)]
    price: f64,
    #[arg(long, default_value = "Virtual")]
    location: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Repeat for each weekly slot, e.g. --slot "Monday 09:00-10:00".
    #[arg(long = "slot", required = true)]
    slots: Vec<String>,
  },
  Update {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    duration: Option<u32>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Replaces the whole schedule when given.
    #[arg(long = "slot")]
    slots: Vec<String>,
    #[arg(long)]
    active: Option<bool>,
  },
  Delete {
    id: String,
  },
}

#[derive(Subcommand)]
pub enum TrainersCommand {
  List {
    #[arg(long)]
    specialty: Option<String>,
    #[arg(long)]
    availability: Option<String>,
    #[arg(long)]
    min_rating: Option<f64>,
    #[arg(long)]
    search: Option<String>,
  },
  Show {
    id: String,
  },
  Review {
    trainer_id: String,
    #[arg(long)]
    rating: u8,
    #[arg(long)]
    comment: String,
  },
  /// Reply to a review of you (trainers).
  Respond {
    review_id: String,
    response: String,
  },
}

#[derive(Subcommand)]
pub enum BookingsCommand {
  List {
    #[arg(long, default_value = "upcoming")]
    tab: BookingTab,
  },
  Show {
    id: String,
  },
  Cancel {
    id: String,
  },
  Stats,
}

#[derive(Subcommand)]
pub enum TrainerBookingsCommand {
  List {
    #[arg(long)]
    status: Option<BookingStatus>,
  },
  Update {
    id: String,
    status: BookingStatus,
  },
}

#[derive(Subcommand)]
pub enum CheckoutCommand {
  Status,
  Resume,
  RetryCharge,
  RetryConfirmation,
  Abort {
    #[arg(long, default_value = "Cancelled by user")]
    reason: String,
  },
  /// Forget a finished checkout.
  Clear,
}

#[derive(Subcommand)]
pub enum PaymentsCommand {
  History {
    #[arg(long)]
    status: Option<PaymentRecordStatus>,
  },
  Show {
    id: String,
  },
  Refund {
    id: String,
    #[arg(long)]
    reason: Option<String>,
  },
}

#[derive(Subcommand)]
pub enum ProfileCommand {
  Show,
  Update {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    goals: Option<String>,
    /// Replaces fitness preferences when given (clients).
    #[arg(long = "preference")]
    preferences: Vec<String>,
    /// Replaces specialties when given (trainers).
    #[arg(long = "specialty")]
    specialties: Vec<String>,
    #[arg(long)]
    qualifications: Option<String>,
    #[arg(long)]
    teaching_style: Option<String>,
  },
}
