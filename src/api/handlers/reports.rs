//! Dashboard, report and alert endpoints.

use crate::{
    api::{AppState, CurrentUser},
    core::{
        event::{list_events_with_payment, year_bounds},
        installment::{DueInstallment, installments_due_within, overdue_installments},
        permissions::{Capability, require},
        report::{DashboardStats, FinancialReport, ReportPeriod, dashboard_stats, generate_report},
        settings::get_alert_settings,
    },
    errors::Result,
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Dashboard filter; defaults to the current year.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Calendar year to summarize
    pub year: Option<i32>,
}

/// Report filters.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Reporting window, relative to today
    #[serde(default)]
    pub period: ReportPeriod,
    /// Exact event type to keep
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

/// Unpaid installments needing attention, using the stored alert thresholds.
#[derive(Debug, Serialize)]
pub struct AlertsOverview {
    /// Look-ahead window used for `upcoming`
    pub days_before_due: u32,
    /// Due between today and today + `days_before_due`
    pub upcoming: Vec<DueInstallment>,
    /// Due before today; empty when overdue alerts are off
    pub overdue: Vec<DueInstallment>,
}

/// `GET /dashboard?year`
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardStats>> {
    require(&actor, Capability::ViewEvents)?;

    let year = query.year.unwrap_or_else(|| super::today().year());
    let (start, end) = year_bounds(year)?;
    let events = list_events_with_payment(&state.database, start, end, None).await?;
    Ok(Json(dashboard_stats(&events)))
}

/// `GET /reports?period&type`: Editor and above.
pub async fn financial_report(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<FinancialReport>> {
    let report = generate_report(
        &state.database,
        &actor,
        query.period,
        super::today(),
        query.event_type.as_deref(),
    )
    .await?;
    Ok(Json(report))
}

/// `GET /alerts`
pub async fn alerts(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<AlertsOverview>> {
    require(&actor, Capability::ViewAlerts)?;
    let db = &state.database;
    let today = super::today();

    let settings = get_alert_settings(db).await?;
    let upcoming = installments_due_within(db, today, settings.days_before_due).await?;
    let overdue = if settings.send_overdue_alert {
        overdue_installments(db, today).await?
    } else {
        Vec::new()
    };

    Ok(Json(AlertsOverview {
        days_before_due: settings.days_before_due,
        upcoming,
        overdue,
    }))
}
