//! System settings - JSON documents stored by key in `system_settings`.
//!
//! A key that has never been written is not an error: readers get the documented
//! default for that setting.

use crate::{
    core::{
        event::is_hex_color,
        permissions::{Actor, Capability, require},
    },
    entities::{SystemSetting, system_setting},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{info, instrument};

const COLOR_SCHEME_KEY: &str = "color_scheme";
const ALERT_SETTINGS_KEY: &str = "alert_settings";

/// Longest look-ahead window for due-date alerts, in days.
pub const MAX_DAYS_BEFORE_DUE: u32 = 365;
/// Last day of month the periodic report may be scheduled on; every month has it.
pub const MAX_REPORT_DAY: u32 = 28;

/// Calendar colors, as `#RRGGBB` strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    /// Event with a contract or a confirmed reservation
    pub reserva_com_contrato: String,
    /// Event whose installments are all paid
    pub reserva_paga: String,
    /// Reservation being negotiated
    pub reserva_em_andamento: String,
    /// Tentative reservation
    pub pre_reserva: String,
    /// Nothing held
    pub sem_reserva: String,
}

impl ColorScheme {
    /// Every color must be a `#RRGGBB` string.
    pub fn validate(&self) -> Result<()> {
        let colors = [
            &self.reserva_com_contrato,
            &self.reserva_paga,
            &self.reserva_em_andamento,
            &self.pre_reserva,
            &self.sem_reserva,
        ];
        match colors.into_iter().find(|c| !is_hex_color(c)) {
            Some(bad) => Err(Error::validation(format!(
                "Colors must look like #RRGGBB, got {bad:?}"
            ))),
            None => Ok(()),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            reserva_com_contrato: "#22C55E".to_string(),
            reserva_paga: "#3B82F6".to_string(),
            reserva_em_andamento: "#F59E0B".to_string(),
            pre_reserva: "#9CA3AF".to_string(),
            sem_reserva: "#F3F4F6".to_string(),
        }
    }
}

/// Thresholds for due-date alerts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// How many days ahead of a due date the first alert goes out
    pub days_before_due: u32,
    /// Whether overdue installments are reported as well
    pub send_overdue_alert: bool,
    /// Day of month the periodic report is generated
    pub report_day_of_month: u32,
}

impl AlertSettings {
    /// Keeps the look-ahead within a year and the report day within `1..=28`.
    pub fn validate(&self) -> Result<()> {
        if self.days_before_due > MAX_DAYS_BEFORE_DUE {
            return Err(Error::validation(format!(
                "days_before_due must be at most {MAX_DAYS_BEFORE_DUE}, got {}",
                self.days_before_due
            )));
        }
        if !(1..=MAX_REPORT_DAY).contains(&self.report_day_of_month) {
            return Err(Error::validation(format!(
                "report_day_of_month must be between 1 and {MAX_REPORT_DAY}, got {}",
                self.report_day_of_month
            )));
        }
        Ok(())
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            days_before_due: 10,
            send_overdue_alert: true,
            report_day_of_month: 1,
        }
    }
}

/// Reads the setting stored under `key`, or `T::default()` when there is none.
pub async fn get_setting<T>(db: &DatabaseConnection, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let row = SystemSetting::find()
        .filter(system_setting::Column::Key.eq(key))
        .one(db)
        .await?;

    match row {
        Some(row) => Ok(serde_json::from_str(&row.value)?),
        None => Ok(T::default()),
    }
}

/// Stores `value` under `key`, replacing any previous value.
#[instrument(skip(db, value), fields(user_id = %actor.user_id))]
pub async fn put_setting<T>(db: &DatabaseConnection, actor: &Actor, key: &str, value: &T) -> Result<()>
where
    T: Serialize,
{
    require(actor, Capability::ManageSettings)?;

    let json = serde_json::to_string(value)?;
    let now = Utc::now();

    let existing = SystemSetting::find()
        .filter(system_setting::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(row) = existing {
        let mut active_model: system_setting::ActiveModel = row.into();
        active_model.value = Set(json);
        active_model.updated_by = Set(Some(actor.user_id.clone()));
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        system_setting::ActiveModel {
            key: Set(key.to_string()),
            value: Set(json),
            updated_by: Set(Some(actor.user_id.clone())),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    info!(key, "Setting saved");
    Ok(())
}

/// Stored calendar colors, or the defaults.
pub async fn get_color_scheme(db: &DatabaseConnection) -> Result<ColorScheme> {
    get_setting(db, COLOR_SCHEME_KEY).await
}

/// Validates and stores the calendar colors. Admin only.
pub async fn save_color_scheme(
    db: &DatabaseConnection,
    actor: &Actor,
    scheme: &ColorScheme,
) -> Result<()> {
    scheme.validate()?;
    put_setting(db, actor, COLOR_SCHEME_KEY, scheme).await
}

/// Stored alert thresholds, or the defaults.
pub async fn get_alert_settings(db: &DatabaseConnection) -> Result<AlertSettings> {
    get_setting(db, ALERT_SETTINGS_KEY).await
}

/// Validates and stores the alert thresholds. Admin only.
pub async fn save_alert_settings(
    db: &DatabaseConnection,
    actor: &Actor,
    settings: &AlertSettings,
) -> Result<()> {
    settings.validate()?;
    put_setting(db, actor, ALERT_SETTINGS_KEY, settings).await
}
