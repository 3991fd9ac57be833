//! Event entity - A bookable occurrence on the venue's calendar.
//!
//! Each event has a date, a type code, a reservation status and an optional contract.
//! Contracted events own a schedule of installments; expenses may point back at an
//! event without owning it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How far the booking of an event has progressed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ReservationStatus {
    /// Date is only noted, nothing is held
    #[sea_orm(string_value = "SEM_RESERVA")]
    #[serde(rename = "SEM_RESERVA")]
    NoReservation,
    /// Date is tentatively held
    #[sea_orm(string_value = "PRE_RESERVA")]
    #[serde(rename = "PRE_RESERVA")]
    PreReservation,
    /// Reservation is being negotiated
    #[sea_orm(string_value = "RESERVA_EM_ANDAMENTO")]
    #[serde(rename = "RESERVA_EM_ANDAMENTO")]
    InProgress,
    /// Reservation is confirmed
    #[sea_orm(string_value = "RESERVA_CONFIRMADA")]
    #[serde(rename = "RESERVA_CONFIRMADA")]
    Confirmed,
}

/// Event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the event
    pub name: String,
    /// Calendar day the event takes place
    pub event_date: Date,
    /// Event type code (e.g. `"CEV_502"`)
    pub event_type: String,
    /// Optional finer category used for revenue breakdowns
    pub event_category: Option<String>,
    /// Booking progress
    pub reservation_status: ReservationStatus,
    /// Whether a contract was signed for this event
    pub has_contract: bool,
    /// Due date written on the contract, if any
    pub contract_due_date: Option<Date>,
    /// Expected number of attendees
    pub estimated_audience: Option<i32>,
    /// Free-form notes
    pub observations: Option<String>,
    /// `#RRGGBB` color that wins over the derived calendar color
    pub color_override: Option<String>,
    /// External user id of the creator
    pub created_by: Option<String>,
    /// Optimistic concurrency counter, bumped on every write
    pub version: i32,
    /// When the event was created
    pub created_at: DateTimeUtc,
    /// When the event or its installment schedule last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One event has many installments
    #[sea_orm(has_many = "super::installment::Entity")]
    Installments,
    /// One event may be referenced by many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
}

impl Related<super::installment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installments.def()
    }
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
