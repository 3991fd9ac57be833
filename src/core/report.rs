//! Report generation business logic.
//!
//! This module provides the dashboard counters and the financial report for a period.
//! Payment figures are always read from each event's [`PaymentSummary`]; nothing in
//! here re-derives payment status from installments.
//!
//! [`PaymentSummary`]: crate::core::payment::PaymentSummary

use crate::{
    core::{
        event::list_events_with_payment,
        expense::{CategoryTotal, list_expenses_in_range, totals_by_category},
        money::{Money, percentage},
        payment::{EventWithPayment, PaymentStatus},
        permissions::{Actor, Capability, require},
    },
    entities::{event::ReservationStatus, expense},
    errors::{Error, Result},
};
use chrono::{Datelike, Months, NaiveDate};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Category used for events without one.
const UNCATEGORIZED: &str = "OUTROS";

/// Reporting window, always anchored on the current date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// Calendar month containing `today`
    Month,
    /// Calendar quarter containing `today`
    Quarter,
    /// Calendar year containing `today`
    #[default]
    Year,
}

impl ReportPeriod {
    /// First and last day (inclusive) of the period containing `today`.
    pub fn bounds(self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let (start_month, length) = match self {
            Self::Month => (today.month(), 1),
            Self::Quarter => ((today.month() - 1) / 3 * 3 + 1, 3),
            Self::Year => (1, 12),
        };

        let start = NaiveDate::from_ymd_opt(today.year(), start_month, 1);
        let end = start
            .and_then(|s| s.checked_add_months(Months::new(length)))
            .and_then(|next| next.pred_opt());

        start
            .zip(end)
            .ok_or_else(|| Error::validation(format!("Date out of range: {today}")))
    }
}

/// Counters shown on the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Events in the year
    pub total_events: usize,
    /// Events with the contract flag
    pub with_contract: usize,
    /// Every installment paid
    pub fully_paid: usize,
    /// At least one installment still owed
    pub pending_payment: usize,
    /// Contract declared but no installment scheduled
    pub awaiting_schedule: usize,
}

/// Counts the dashboard figures from already aggregated events.
#[must_use]
pub fn dashboard_stats(events: &[EventWithPayment]) -> DashboardStats {
    let mut stats = DashboardStats {
        total_events: events.len(),
        ..DashboardStats::default()
    };

    for entry in events {
        if entry.event.has_contract {
            stats.with_contract += 1;
        }
        if entry.payment.awaiting_schedule() {
            stats.awaiting_schedule += 1;
        }
        match entry.payment.status {
            PaymentStatus::FullyPaid => stats.fully_paid += 1,
            PaymentStatus::PartiallyPaid | PaymentStatus::Pending => stats.pending_payment += 1,
            PaymentStatus::NoContract => {}
        }
    }

    stats
}

/// Number of events per reservation status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReservationCounts {
    /// `SEM_RESERVA`
    pub no_reservation: usize,
    /// `PRE_RESERVA`
    pub pre_reservation: usize,
    /// `RESERVA_EM_ANDAMENTO`
    pub in_progress: usize,
    /// `RESERVA_CONFIRMADA`
    pub confirmed: usize,
}

impl ReservationCounts {
    fn record(&mut self, status: ReservationStatus) {
        match status {
            ReservationStatus::NoReservation => self.no_reservation += 1,
            ReservationStatus::PreReservation => self.pre_reservation += 1,
            ReservationStatus::InProgress => self.in_progress += 1,
            ReservationStatus::Confirmed => self.confirmed += 1,
        }
    }
}

/// Received revenue of one event category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryRevenue {
    /// Event category, `OUTROS` when missing
    pub category: String,
    /// Events in the category
    pub events: usize,
    /// Paid installments of those events
    pub revenue: Money,
    /// Share of all received revenue
    pub percentage: f64,
}

/// Activity of one calendar month.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    /// `YYYY-MM`
    pub month: String,
    /// Events dated in the month
    pub events: usize,
    /// Received revenue of the month's events
    pub revenue: Money,
    /// Expenses dated in the month
    pub expenses: Money,
}

/// Financial overview of a period.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinancialReport {
    /// First day of the period
    pub start: NaiveDate,
    /// Last day of the period
    pub end: NaiveDate,
    /// Events in the period
    pub total_events: usize,
    /// Events with the contract flag
    pub with_contract: usize,
    /// Event count per type
    pub events_by_type: BTreeMap<String, usize>,
    /// Event count per reservation status
    pub reservations: ReservationCounts,
    /// Sum of all scheduled installments
    pub total_revenue: Money,
    /// Sum of paid installments
    pub total_paid: Money,
    /// Sum of unpaid installments
    pub total_pending: Money,
    /// Sum of expenses in the period
    pub total_expenses: Money,
    /// `total_paid - total_expenses`
    pub net_result: Money,
    /// Paid share of total revenue, 0 when nothing is scheduled
    pub payment_rate: f64,
    /// Sum of estimated audiences
    pub total_audience: i64,
    /// Sorted by revenue, largest first
    pub revenue_by_category: Vec<CategoryRevenue>,
    /// Months with any event or expense, in chronological order
    pub monthly: Vec<MonthSummary>,
    /// Sorted by total, largest first
    pub expenses_by_category: Vec<CategoryTotal>,
}

fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Builds the financial report from already fetched events and expenses.
#[must_use]
pub fn financial_report(
    start: NaiveDate,
    end: NaiveDate,
    events: &[EventWithPayment],
    expenses: &[expense::Model],
) -> FinancialReport {
    let mut total_revenue = Money::ZERO;
    let mut total_paid = Money::ZERO;
    let mut total_audience = 0_i64;
    let mut with_contract = 0;
    let mut reservations = ReservationCounts::default();
    let mut events_by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_category: HashMap<&str, (usize, Money)> = HashMap::new();
    let mut by_month: BTreeMap<String, MonthSummary> = BTreeMap::new();

    for entry in events {
        let event = &entry.event;
        let payment = &entry.payment;

        total_revenue += payment.total_amount;
        total_paid += payment.paid_amount;
        total_audience += i64::from(event.estimated_audience.unwrap_or(0));
        if event.has_contract {
            with_contract += 1;
        }
        reservations.record(event.reservation_status);
        *events_by_type.entry(event.event_type.clone()).or_default() += 1;

        let category = event.event_category.as_deref().unwrap_or(UNCATEGORIZED);
        let slot = by_category.entry(category).or_default();
        slot.0 += 1;
        slot.1 += payment.paid_amount;

        let key = month_key(event.event_date);
        let month = by_month.entry(key.clone()).or_insert_with(|| MonthSummary {
            month: key,
            ..MonthSummary::default()
        });
        month.events += 1;
        month.revenue += payment.paid_amount;
    }

    let mut total_expenses = Money::ZERO;
    for exp in expenses {
        let amount = Money::from_cents(exp.amount_cents);
        total_expenses += amount;

        let key = month_key(exp.expense_date);
        let month = by_month.entry(key.clone()).or_insert_with(|| MonthSummary {
            month: key,
            ..MonthSummary::default()
        });
        month.expenses += amount;
    }

    let mut revenue_by_category: Vec<CategoryRevenue> = by_category
        .into_iter()
        .map(|(category, (count, revenue))| CategoryRevenue {
            category: category.to_string(),
            events: count,
            revenue,
            percentage: percentage(revenue, total_paid),
        })
        .collect();
    revenue_by_category.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.category.cmp(&b.category))
    });

    FinancialReport {
        start,
        end,
        total_events: events.len(),
        with_contract,
        events_by_type,
        reservations,
        total_revenue,
        total_paid,
        total_pending: total_revenue - total_paid,
        total_expenses,
        net_result: total_paid - total_expenses,
        payment_rate: percentage(total_paid, total_revenue),
        total_audience,
        revenue_by_category,
        monthly: by_month.into_values().collect(),
        expenses_by_category: totals_by_category(expenses),
    }
}

/// Loads the data of a period and builds its financial report.
pub async fn generate_report(
    db: &DatabaseConnection,
    actor: &Actor,
    period: ReportPeriod,
    today: NaiveDate,
    event_type: Option<&str>,
) -> Result<FinancialReport> {
    require(actor, Capability::ViewReports)?;

    let (start, end) = period.bounds(today)?;
    debug!(%start, %end, ?event_type, "Generating financial report");

    let events = list_events_with_payment(db, start, end, event_type).await?;
    let expenses = list_expenses_in_range(db, start, end, None).await?;
    Ok(financial_report(start, end, &events, &expenses))
}
