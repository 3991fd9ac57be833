//! Shared test utilities for `VenueDesk`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        event::{self, NewEvent},
        expense::NewExpense,
        installment::NewInstallment,
        money::Money,
        permissions::Actor,
    },
    entities::{
        event::ReservationStatus,
        expense, installment,
        installment::PaymentState,
        user_profile::{self, Role},
    },
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

pub fn admin() -> Actor {
    Actor::new("admin-1", Role::Admin)
}

pub fn editor() -> Actor {
    Actor::new("editor-1", Role::Editor)
}

pub fn viewer() -> Actor {
    Actor::new("viewer-1", Role::Viewer)
}

/// Shorthand for a calendar date. Panics on an invalid date, which is a bug in the test.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Event form input with sensible defaults.
///
/// # Defaults
/// * `event_date`: 2025-05-10
/// * `event_type`: `"CEV_502"`
/// * `reservation_status`: pre-reservation
/// * `has_contract`: false
pub fn sample_new_event(name: &str) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        event_date: date(2025, 5, 10),
        event_type: "CEV_502".to_string(),
        event_category: None,
        reservation_status: ReservationStatus::PreReservation,
        has_contract: false,
        contract_due_date: None,
        estimated_audience: None,
        observations: None,
        color_override: None,
    }
}

/// An event row that never touched the database, for pure aggregation tests.
pub fn sample_event(id: i64) -> crate::entities::event::Model {
    let now = Utc::now();
    crate::entities::event::Model {
        id,
        name: format!("Evento {id}"),
        event_date: date(2025, 5, 10),
        event_type: "CEV_502".to_string(),
        event_category: None,
        reservation_status: ReservationStatus::PreReservation,
        has_contract: false,
        contract_due_date: None,
        estimated_audience: None,
        observations: None,
        color_override: None,
        created_by: None,
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

/// An installment row of event 1 that never touched the database.
pub fn installment_row(number: i32, amount_cents: i64, state: PaymentState) -> installment::Model {
    installment::Model {
        id: i64::from(number),
        event_id: 1,
        installment_number: number,
        amount_cents,
        due_date: date(2025, 5, 1),
        payment_status: state,
        notes: None,
    }
}

/// Creates a test event without contract on `event_date`.
pub async fn create_test_event(
    db: &DatabaseConnection,
    name: &str,
    event_date: NaiveDate,
) -> Result<crate::entities::event::Model> {
    let mut input = sample_new_event(name);
    input.event_date = event_date;
    event::create_event(db, &editor(), input).await
}

/// Creates a confirmed test event with a contract and no installments yet.
pub async fn create_contract_event(
    db: &DatabaseConnection,
    name: &str,
    event_date: NaiveDate,
) -> Result<crate::entities::event::Model> {
    let mut input = sample_new_event(name);
    input.event_date = event_date;
    input.has_contract = true;
    input.reservation_status = ReservationStatus::Confirmed;
    event::create_event(db, &editor(), input).await
}

pub fn new_installment(amount_cents: i64, due_date: NaiveDate, paid: bool) -> NewInstallment {
    NewInstallment {
        amount: Money::from_cents(amount_cents),
        due_date,
        payment_status: if paid {
            PaymentState::Paid
        } else {
            PaymentState::Unpaid
        },
        notes: None,
    }
}

/// Expense form input dated 2025-05-01, uncategorized and not tied to an event.
pub fn sample_new_expense(description: &str, amount_cents: i64) -> NewExpense {
    NewExpense {
        description: description.to_string(),
        category: None,
        amount: Money::from_cents(amount_cents),
        expense_date: date(2025, 5, 1),
        event_id: None,
    }
}

/// An expense row that never touched the database.
pub fn expense_row(category: &str, amount_cents: i64) -> expense::Model {
    expense::Model {
        id: 0,
        description: format!("{category} {amount_cents}"),
        category: category.to_string(),
        amount_cents,
        expense_date: date(2025, 5, 1),
        event_id: None,
        created_by: None,
        created_at: Utc::now(),
    }
}

/// Inserts a profile directly, skipping the admin check of `create_profile`.
pub async fn seed_profile(
    db: &DatabaseConnection,
    user_id: &str,
    role: Role,
) -> Result<user_profile::Model> {
    let now = Utc::now();
    let model = user_profile::ActiveModel {
        user_id: Set(user_id.to_string()),
        full_name: Set(format!("Pessoa {user_id}")),
        role: Set(role),
        notification_email: Set(None),
        receive_alerts: Set(true),
        receive_reports: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}
