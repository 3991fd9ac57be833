//! Payment status aggregation.
//!
//! This is the only place that turns an event's installments into a payment status.
//! The dashboard, the event list, the calendar and the reports all read
//! [`PaymentSummary`] values produced here and never re-derive status on their own,
//! so the same data always gets the same label and color.
//!
//! The aggregator assumes validated input; negative amounts are rejected when
//! installments are written, not here.

use crate::core::money::{Money, percentage};
use crate::entities::{
    event,
    installment::{self, PaymentState},
};
use serde::Serialize;
use std::collections::HashMap;

/// Derived payment state of an event. Exactly one applies to every event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// No contract, or a contract without any scheduled installment
    NoContract,
    /// Every installment is paid
    FullyPaid,
    /// Some, but not all, installments are paid
    PartiallyPaid,
    /// Installments exist and none is paid
    Pending,
}

impl PaymentStatus {
    /// Short Portuguese label used by the dashboard.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoContract => "Sem contrato",
            Self::FullyPaid => "Pago",
            Self::PartiallyPaid => "Parcialmente pago",
            Self::Pending => "Pendente",
        }
    }
}

/// Payment snapshot of one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    /// Sum of all installment amounts
    pub total_amount: Money,
    /// Sum of paid installment amounts
    pub paid_amount: Money,
    /// `total_amount - paid_amount`
    pub outstanding_amount: Money,
    /// Number of installments
    pub installment_count: usize,
    /// Number of paid installments
    pub paid_installment_count: usize,
    /// Whether the event carries the contract flag
    pub contract_declared: bool,
    /// Derived status
    pub status: PaymentStatus,
    /// Portuguese label of `status`
    pub status_label: &'static str,
    /// Paid share of the total, rounded to a whole percent. Zero when nothing is owed.
    pub paid_percentage: u8,
}

fn paid_percentage(paid: Money, total: Money) -> u8 {
    let pct = percentage(paid, total).round();
    // Cast safety: paid never exceeds total for non-negative amounts, so pct ∈ [0, 100].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = pct.clamp(0.0, 100.0) as u8;
    pct
}

impl PaymentSummary {
    /// A contract was declared but no installment has been scheduled yet. The status
    /// is still [`PaymentStatus::NoContract`]; this lets a view show a distinct
    /// "no installments" hint without introducing a fifth status.
    #[must_use]
    pub const fn awaiting_schedule(&self) -> bool {
        self.contract_declared && self.installment_count == 0
    }
}

/// Reduces an event's installments to a [`PaymentSummary`].
///
/// Status precedence:
/// 1. `NoContract` when `has_contract` is false or there are no installments
/// 2. `FullyPaid` when every installment is paid
/// 3. `PartiallyPaid` when at least one is paid and one is unpaid
/// 4. `Pending` otherwise
///
/// Totals are computed even without the contract flag so stray rows stay visible in
/// reports.
#[must_use]
pub fn aggregate(has_contract: bool, installments: &[installment::Model]) -> PaymentSummary {
    let mut total_amount = Money::ZERO;
    let mut paid_amount = Money::ZERO;
    let mut paid_installment_count = 0;

    for inst in installments {
        let amount = Money::from_cents(inst.amount_cents);
        total_amount += amount;
        if inst.payment_status == PaymentState::Paid {
            paid_amount += amount;
            paid_installment_count += 1;
        }
    }

    let installment_count = installments.len();
    let status = if !has_contract || installment_count == 0 {
        PaymentStatus::NoContract
    } else if paid_installment_count == installment_count {
        PaymentStatus::FullyPaid
    } else if paid_installment_count > 0 {
        PaymentStatus::PartiallyPaid
    } else {
        PaymentStatus::Pending
    };

    PaymentSummary {
        total_amount,
        paid_amount,
        outstanding_amount: total_amount - paid_amount,
        installment_count,
        paid_installment_count,
        contract_declared: has_contract,
        status,
        status_label: status.label(),
        paid_percentage: paid_percentage(paid_amount, total_amount),
    }
}

/// An event together with its derived payment snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventWithPayment {
    /// The event row
    #[serde(flatten)]
    pub event: event::Model,
    /// Its payment snapshot
    pub payment: PaymentSummary,
}

/// Groups a bulk-fetched installment list by event id.
#[must_use]
pub fn group_by_event(
    installments: Vec<installment::Model>,
) -> HashMap<i64, Vec<installment::Model>> {
    let mut grouped: HashMap<i64, Vec<installment::Model>> = HashMap::new();
    for inst in installments {
        grouped.entry(inst.event_id).or_default().push(inst);
    }
    grouped
}

/// Pairs every event with the summary of its installments. Installments whose event
/// is not in `events` are ignored.
#[must_use]
pub fn summarize_events(
    events: Vec<event::Model>,
    installments: Vec<installment::Model>,
) -> Vec<EventWithPayment> {
    let grouped = group_by_event(installments);
    events
        .into_iter()
        .map(|event| {
            let own = grouped.get(&event.id).map_or(&[][..], Vec::as_slice);
            let payment = aggregate(event.has_contract, own);
            EventWithPayment { event, payment }
        })
        .collect()
}
