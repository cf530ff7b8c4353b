// booking_cli/src/commands.rs

use crate::cli::{
  BookingsCommand, CheckoutCommand, ClassCommand, ClassesCommand, Command, PaymentsCommand, ProfileCommand,
  TrainerBookingsCommand, TrainersCommand,
};
use crate::prompt;
use crate::render;
use crate::terminal_processor::TerminalProcessor;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use fitbook::checkout::{CheckoutWorkflow, MockProcessor, PaymentProcessor};
use fitbook::listing::{filter_bookings, filter_payments, search_classes, search_trainers, sorted_classes};
use fitbook::model::{
  BookingQuery, ClassDraft, ClassFilters, ProfileUpdate, Registration, ReviewDraft, ScheduleSlot, TrainerFilters,
};
use fitbook::{ClientConfig, Dispatcher};
use std::sync::Arc;
use tracing::info;

/// Everything a command needs.
pub struct App {
  pub config: ClientConfig,
  pub dispatcher: Dispatcher,
  pub today: NaiveDate,
  pub mock_payments: bool,
}

impl App {
  fn checkout(&self) -> Result<CheckoutWorkflow> {
    let processor: Arc<dyn PaymentProcessor> = if self.mock_payments {
      Arc::new(MockProcessor::new())
    } else {
      Arc::new(TerminalProcessor)
    };
    let workflow = CheckoutWorkflow::builder(self.dispatcher.client().clone(), processor)
      .configured(&self.config)
      .store(self.dispatcher.store().clone())
      .build()?;
    Ok(workflow)
  }
}

pub async fn execute(app: &App, command: Command) -> Result<()> {
  let d = &app.dispatcher;
  match command {
    Command::Login { email } => {
      let password = prompt::password("Password").await?;
      let user = d.login(&email, &password).await?;
      println!("Welcome back, {}.", user.name);
    }
    Command::Register { name, email, role } => {
      let password = prompt::password("Password").await?;
      let password_confirmation = prompt::password("Confirm password").await?;
      let registration = Registration {
        name,
        email,
        password,
        password_confirmation,
        role,
      };
      let user = d.register(&registration).await?;
      println!("Account created. Signed in as {} ({}).", user.name, user.role);
    }
    Command::Logout => {
      d.logout().await?;
      println!("Logged out.");
    }
    Command::Whoami => {
      if d.client().session().login_required() {
        render::session(&d.client().session().state());
      } else {
        let user = d.refresh_user().await?;
        render::print_user(&user);
      }
    }
    Command::ForgotPassword { email } => {
      let ack = d.client().forgot_password(&email).await?;
      println!("{}", ack.unwrap_or_else(|| "Check your inbox for a reset link.".into()));
    }
    Command::ResetPassword { token } => {
      let password = prompt::password("New password").await?;
      let ack = d.client().reset_password(&token, &password).await?;
      println!("{}", ack.unwrap_or_else(|| "Password updated. You can log in now.".into()));
    }
    Command::Classes { command } => classes(app, command).await?,
    Command::Class { command } => class(app, command).await?,
    Command::Trainers { command } => trainers(app, command).await?,
    Command::Bookings { command } => bookings(app, command).await?,
    Command::TrainerBookings { command } => trainer_bookings(app, command).await?,
    Command::Book { class_id, slot } => {
      let slot = ScheduleSlot::parse(&slot)?;
      let class = d.load_class(&class_id).await?;
      info!(class_id = %class.id, %slot, "Starting checkout.");
      let report = app.checkout()?.start(&class, slot, app.today).await?;
      render::checkout_report(&report);
    }
    Command::Checkout { command } => checkout(app, command).await?,
    Command::Payments { command } => payments(app, command).await?,
    Command::Profile { command } => profile(app, command).await?,
  }
  Ok(())
}

async fn classes(app: &App, command: ClassesCommand) -> Result<()> {
  let d = &app.dispatcher;
  match command {
    ClassesCommand::List {
      sort,
      search,
      class_type,
      location,
      trainer,
    } => {
      let filters = ClassFilters {
        class_type,
        location,
        trainer_id: trainer,
        search: None,
      };
      let listed = sorted_classes(&d.load_classes(&filters).await?, sort);
      render::classes(search_classes(&listed, search.as_deref().unwrap_or("")));
    }
    ClassesCommand::Show { id } => render::class(&d.load_class(&id).await?),
    ClassesCommand::Recommended { limit } => render::classes(&d.load_recommendations(limit).await?),
  }
  Ok(())
}

fn parse_slots(raw: &[String]) -> Result<Vec<ScheduleSlot>> {
  raw
    .iter()
    .map(|s| ScheduleSlot::parse(s).map_err(anyhow::Error::from))
    .collect()
}

async fn class(app: &App, command: ClassCommand) -> Result<()> {
  let d = &app.dispatcher;
  match command {
    ClassCommand::Create {
      title,
      class_type,
      duration,
      price,
      location,
      description,
      slots,
    } => {
      let draft = ClassDraft {
        title,
        description,
        class_type,
        duration,
        price,
        location,
        is_active: true,
        schedule: parse_slots(&slots)?,
      };
      let created = d.create_class(&draft).await?;
      println!("Class created.");
      render::class(&created);
    }
    ClassCommand::Update {
      id,
      title,
      price,
      duration,
      location,
      description,
      slots,
      active,
    } => {
      let current = d.load_class(&id).await?;
      let mut draft = ClassDraft::from(&current);
      if let Some(title) = title {
        draft.title = title;
      }
      if let Some(price) = price {
        draft.price = price;
      }
      if let Some(duration) = duration {
        draft.duration = duration;
      }
      if let Some(location) = location {
        draft.location = location;
      }
      if let Some(description) = description {
        draft.description = description;
      }
      if !slots.is_empty() {
        draft.schedule = parse_slots(&slots)?;
      }
      if let Some(active) = active {
        draft.is_active = active;
      }
      let updated = d.update_class(&id, &draft).await?;
      println!("Class updated.");
      render::class(&updated);
    }
    ClassCommand::Delete { id } => {
      d.delete_class(&id).await?;
      println!("Class {} deleted.", id);
    }
  }
  Ok(())
}

async fn trainers(app: &App, command: TrainersCommand) -> Result<()> {
  let d = &app.dispatcher;
  match command {
    TrainersCommand::List {
      specialty,
      availability,
      min_rating,
      search,
    } => {
      let filters = TrainerFilters {
        specialty,
        availability,
        rating: min_rating,
      };
      let listed = d.load_trainers(&filters).await?;
      render::trainers(search_trainers(&listed, search.as_deref().unwrap_or("")));
    }
    TrainersCommand::Show { id } => {
      let trainer = d.load_trainer(&id).await?;
      let reviews = d.load_reviews(&id).await?;
      render::trainer(&trainer, &reviews);
    }
    TrainersCommand::Review {
      trainer_id,
      rating,
      comment,
    } => {
      d.add_review(&trainer_id, &ReviewDraft::new(rating, comment)).await?;
      println!("Thanks, your review was posted.");
    }
    TrainersCommand::Respond { review_id, response } => {
      d.respond_to_review(&review_id, &response).await?;
      println!("Reply posted.");
    }
  }
  Ok(())
}

async fn bookings(app: &App, command: BookingsCommand) -> Result<()> {
  let d = &app.dispatcher;
  match command {
    BookingsCommand::List { tab } => {
      let all = d.load_bookings(&BookingQuery::default()).await?;
      println!("{} bookings:", tab);
      render::bookings(filter_bookings(&all, tab));
    }
    BookingsCommand::Show { id } => render::booking(&d.load_booking(&id).await?),
    BookingsCommand::Cancel { id } => {
      let booking = d.load_booking(&id).await?;
      let cancelled = d.cancel_booking(&booking, app.today).await?;
      println!("Booking cancelled.");
      render::booking(&cancelled);
    }
    BookingsCommand::Stats => render::stats(&d.load_booking_stats().await?),
  }
  Ok(())
}

async fn trainer_bookings(app: &App, command: TrainerBookingsCommand) -> Result<()> {
  let d = &app.dispatcher;
  match command {
    TrainerBookingsCommand::List { status } => {
      let query = BookingQuery { status, upcoming: None };
      render::bookings(&d.load_trainer_bookings(&query).await?);
    }
    TrainerBookingsCommand::Update { id, status } => {
      let listed = d.load_trainer_bookings(&BookingQuery::default()).await?;
      let booking = listed
        .iter()
        .find(|b| b.id == id)
        .ok_or_else(|| anyhow!("Booking {} is not one of your bookings", id))?;
      let updated = d.update_booking_status(booking, status).await?;
      render::booking(&updated);
    }
  }
  Ok(())
}

async fn checkout(app: &App, command: CheckoutCommand) -> Result<()> {
  let workflow = app.checkout()?;
  match command {
    CheckoutCommand::Status => match workflow.status().await? {
      Some(cp) => render::checkpoint(&cp),
      None => println!("No checkout in progress."),
    },
    CheckoutCommand::Resume => render::checkout_report(&workflow.resume(app.today).await?),
    CheckoutCommand::RetryCharge => render::checkout_report(&workflow.retry_charge(app.today).await?),
    CheckoutCommand::RetryConfirmation => {
      render::checkout_report(&workflow.retry_confirmation(app.today).await?)
    }
    CheckoutCommand::Abort { reason } => {
      let cp = workflow.abort(app.today, &reason).await?;
      println!("Checkout aborted.");
      render::checkpoint(&cp);
    }
    CheckoutCommand::Clear => {
      workflow.clear().await?;
      println!("Checkout cleared.");
    }
  }
  Ok(())
}

async fn payments(app: &App, command: PaymentsCommand) -> Result<()> {
  let d = &app.dispatcher;
  match command {
    PaymentsCommand::History { status } => {
      let history = d.load_payment_history().await?;
      render::payments(filter_payments(&history, status));
    }
    PaymentsCommand::Show { id } => render::payment(&d.load_payment(&id).await?),
    PaymentsCommand::Refund { id, reason } => {
      let payment = d.load_payment(&id).await?;
      let receipt = d.refund_payment(&payment, reason.as_deref()).await?;
      println!("{}", receipt.message.unwrap_or_else(|| "Refund issued.".into()));
    }
  }
  Ok(())
}

async fn profile(app: &App, command: ProfileCommand) -> Result<()> {
  let d = &app.dispatcher;
  let user = d.client().session().user();
  match command {
    ProfileCommand::Show => render::profile(user.as_ref(), &d.load_profile().await?),
    ProfileCommand::Update {
      name,
      email,
      phone,
      bio,
      goals,
      preferences,
      specialties,
      qualifications,
      teaching_style,
    } => {
      let user = user.context("You need to log in first")?;
      let current = d.load_profile().await?;
      let mut update = ProfileUpdate::from_current(&user, &current);
      if let Some(name) = name {
        update.name = name;
      }
      if let Some(email) = email {
        update.email = email;
      }
      let p = &mut update.profile;
      if let Some(phone) = phone {
        p.phone = phone;
      }
      if let Some(bio) = bio {
        p.bio = bio;
      }
      if let Some(goals) = goals {
        p.fitness_goals = goals;
      }
      if !preferences.is_empty() {
        p.fitness_preferences = preferences;
      }
      if !specialties.is_empty() {
        p.specialties = specialties;
      }
      if let Some(q) = qualifications {
        p.qualifications = q;
      }
      if let Some(style) = teaching_style {
        p.teaching_style = style;
      }
      let saved = d.update_profile(&update).await?;
      println!("Profile updated.");
      render::profile(Some(&user), &saved);
    }
  }
  Ok(())
}
