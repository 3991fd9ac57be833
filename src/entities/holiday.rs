//! Holiday entity - Read-only calendar annotation shown next to events.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Holiday database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "holidays")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Holiday name
    pub name: String,
    /// Day of the holiday
    pub date: Date,
    /// National (true) or regional (false)
    pub is_national: bool,
    /// Year of `date`, kept for cheap per-year filtering
    pub year: i32,
}

/// Holidays are not related to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
