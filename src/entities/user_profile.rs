//! User profile entity - One row per authenticated account.
//!
//! The account itself lives with the external auth provider; this table only carries
//! the role that gates mutations plus notification preferences.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access level of a user. Variants are declared from least to most privileged so
/// the derived ordering follows the role hierarchy.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Role {
    /// Read-only access
    #[sea_orm(string_value = "VISUALIZADOR")]
    #[serde(rename = "VISUALIZADOR")]
    Viewer,
    /// May create and edit events, installments and expenses
    #[sea_orm(string_value = "EDITOR")]
    #[serde(rename = "EDITOR")]
    Editor,
    /// Everything, including users and system settings
    #[sea_orm(string_value = "ADMIN")]
    #[serde(rename = "ADMIN")]
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Viewer => "VISUALIZADOR",
            Self::Editor => "EDITOR",
            Self::Admin => "ADMIN",
        };
        f.write_str(label)
    }
}

/// User profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier issued by the external auth provider
    #[sea_orm(unique)]
    pub user_id: String,
    /// Display name
    pub full_name: String,
    /// Access level
    pub role: Role,
    /// Address alerts and reports are sent to
    pub notification_email: Option<String>,
    /// Opted into due-date alerts
    pub receive_alerts: bool,
    /// Opted into periodic reports
    pub receive_reports: bool,
    /// When the profile was created
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

/// `UserProfile` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
