//! Installment entity - One scheduled payment of an event's contract.
//!
//! Amounts are stored as integer cents. `installment_number` is 1-based and always
//! forms a contiguous `1..=N` range within an event because schedules are only ever
//! written as a whole.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether an installment has been settled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    /// Money received
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Still owed
    #[sea_orm(string_value = "UNPAID")]
    Unpaid,
}

/// Installment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contract_installments")]
pub struct Model {
    /// Unique identifier for the installment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the event whose contract this installment belongs to
    pub event_id: i64,
    /// Position in the schedule, starting at 1
    pub installment_number: i32,
    /// Amount in cents
    pub amount_cents: i64,
    /// Day the payment is due
    pub due_date: Date,
    /// Settlement state
    pub payment_status: PaymentState,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Defines relationships between Installment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each installment belongs to one event
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
