//! System setting entity - Stores key to JSON value pairs.
//! Used for the calendar color scheme and alert thresholds.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// System setting database model - stores one JSON document per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Setting key (e.g., `"color_scheme"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Setting value serialized as JSON text
    pub value: String,
    /// External user id of whoever last changed the setting
    pub updated_by: Option<String>,
    /// When this setting was last modified
    pub updated_at: DateTimeUtc,
}

/// `SystemSetting` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
