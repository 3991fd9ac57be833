//! Expense entity - An operating cost recorded in the venue's ledger.
//!
//! `event_id` is a weak reference: it is cleared when the event goes away and the
//! expense lives on as a general one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What the money was spent on
    pub description: String,
    /// Ledger category (e.g. `"MANUTENCAO"`, `"OUTROS"`)
    pub category: String,
    /// Amount in cents
    pub amount_cents: i64,
    /// Day the expense was incurred
    pub expense_date: Date,
    /// Event this expense was incurred for, if any
    pub event_id: Option<i64>,
    /// External user id of the creator
    pub created_by: Option<String>,
    /// When the expense was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// An expense may point at one event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
