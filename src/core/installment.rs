//! Installment business logic - Reads and the replace-set writer.
//!
//! An event's installment schedule is always saved as a whole: the stored rows are
//! deleted and the submitted list is inserted, renumbered `1..=N` in list order. The
//! swap happens inside one database transaction and is guarded by the event's
//! `version`, so a failed or stale save leaves the previous schedule untouched.

use crate::{
    core::{
        event::{check_version, get_event_by_id},
        money::Money,
        permissions::{Actor, Capability, require},
    },
    entities::{Event, Installment, event, installment, installment::PaymentState},
    errors::{Error, Result},
};
use chrono::{Days, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// One entry of a submitted schedule. Position in the list decides its number.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewInstallment {
    /// Amount owed
    pub amount: Money,
    /// Day the payment is due
    pub due_date: NaiveDate,
    /// Whether it was already paid
    pub payment_status: PaymentState,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewInstallment {
    /// Rejects negative amounts and amounts above [`Money::MAX_AMOUNT`].
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_negative() {
            return Err(Error::validation(format!(
                "Installment amount cannot be negative: {}",
                self.amount
            )));
        }
        if self.amount > Money::MAX_AMOUNT {
            return Err(Error::validation(format!(
                "Installment amount exceeds the maximum of {}",
                Money::MAX_AMOUNT
            )));
        }
        Ok(())
    }
}

/// Retrieves an event's installments ordered by their number.
pub async fn get_installments_for_event<C>(db: &C, event_id: i64) -> Result<Vec<installment::Model>>
where
    C: ConnectionTrait,
{
    Installment::find()
        .filter(installment::Column::EventId.eq(event_id))
        .order_by_asc(installment::Column::InstallmentNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the installments of many events in one query.
pub async fn get_installments_for_events(
    db: &DatabaseConnection,
    event_ids: &[i64],
) -> Result<Vec<installment::Model>> {
    if event_ids.is_empty() {
        return Ok(Vec::new());
    }

    Installment::find()
        .filter(installment::Column::EventId.is_in(event_ids.iter().copied()))
        .order_by_asc(installment::Column::EventId)
        .order_by_asc(installment::Column::InstallmentNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces an event's whole installment schedule.
///
/// `expected_version` is the event version the caller's form was loaded from. If the
/// event changed since then the call fails with [`Error::Conflict`] and nothing is
/// written. On success the event's version is bumped and the stored schedule is
/// returned.
#[instrument(skip(db, new_installments), fields(user_id = %actor.user_id, count = new_installments.len()))]
pub async fn replace_installments(
    db: &DatabaseConnection,
    actor: &Actor,
    event_id: i64,
    expected_version: i32,
    new_installments: Vec<NewInstallment>,
) -> Result<Vec<installment::Model>> {
    require(actor, Capability::EditEvent)?;
    for inst in &new_installments {
        inst.validate()?;
    }

    let txn = db.begin().await?;

    let event = get_event_by_id(&txn, event_id)
        .await?
        .ok_or_else(|| Error::not_found("Event", event_id))?;
    check_version(&event, expected_version)?;

    Installment::delete_many()
        .filter(installment::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;

    if !new_installments.is_empty() {
        let rows = (1..).zip(new_installments).map(|(number, inst)| installment::ActiveModel {
            event_id: Set(event_id),
            installment_number: Set(number),
            amount_cents: Set(inst.amount.cents()),
            due_date: Set(inst.due_date),
            payment_status: Set(inst.payment_status),
            notes: Set(inst.notes),
            ..Default::default()
        });
        Installment::insert_many(rows).exec(&txn).await?;
    }

    Event::update_many()
        .col_expr(event::Column::Version, Expr::value(event.version + 1))
        .col_expr(event::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(event::Column::Id.eq(event_id))
        .exec(&txn)
        .await?;

    let stored = get_installments_for_event(&txn, event_id).await?;
    txn.commit().await?;

    info!(event_id, installments = stored.len(), "Installment schedule replaced");
    Ok(stored)
}

/// An unpaid installment joined with the event it belongs to, for alerting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DueInstallment {
    /// Event the installment belongs to
    pub event_id: i64,
    /// Name of that event
    pub event_name: String,
    /// Day of that event
    pub event_date: NaiveDate,
    /// Position in the schedule
    pub installment_number: i32,
    /// Amount owed
    pub amount: Money,
    /// Day the payment is due
    pub due_date: NaiveDate,
    /// Negative when overdue
    pub days_until_due: i64,
}

async fn unpaid_between(
    db: &DatabaseConnection,
    today: NaiveDate,
    from: Option<NaiveDate>,
    until: NaiveDate,
) -> Result<Vec<DueInstallment>> {
    let mut query = Installment::find()
        .filter(installment::Column::PaymentStatus.eq(PaymentState::Unpaid))
        .filter(installment::Column::DueDate.lte(until));
    if let Some(from) = from {
        query = query.filter(installment::Column::DueDate.gte(from));
    }

    let rows = query
        .order_by_asc(installment::Column::DueDate)
        .find_also_related(Event)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(inst, event)| {
            let event = event?;
            Some(DueInstallment {
                event_id: event.id,
                event_name: event.name,
                event_date: event.event_date,
                installment_number: inst.installment_number,
                amount: Money::from_cents(inst.amount_cents),
                due_date: inst.due_date,
                days_until_due: (inst.due_date - today).num_days(),
            })
        })
        .collect())
}

/// Unpaid installments due between `today` and `today + days` (inclusive).
pub async fn installments_due_within(
    db: &DatabaseConnection,
    today: NaiveDate,
    days: u32,
) -> Result<Vec<DueInstallment>> {
    let until = today
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| Error::validation(format!("Alert window out of range: {days} days")))?;
    unpaid_between(db, today, Some(today), until).await
}

/// Unpaid installments whose due date is before `today`.
pub async fn overdue_installments(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Vec<DueInstallment>> {
    let Some(yesterday) = today.pred_opt() else {
        return Ok(Vec::new());
    };
    unpaid_between(db, today, None, yesterday).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::payment::{PaymentStatus, aggregate};
    use crate::test_utils::*;

    fn schedule() -> Vec<NewInstallment> {
        vec![
            new_installment(100_000, date(2025, 3, 1), true),
            new_installment(50_000, date(2025, 4, 1), false),
            new_installment(25_000, date(2025, 5, 1), false),
        ]
    }

    #[tokio::test]
    async fn test_replace_renumbers_in_list_order() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_contract_event(&db, "Formatura", date(2025, 6, 1)).await?;

        // Submit out of due-date order; numbering follows the list, not the dates
        let mut input = schedule();
        input.reverse();
        let stored = replace_installments(&db, &editor(), event.id, 1, input).await?;

        let numbers: Vec<i32> = stored.iter().map(|i| i.installment_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(stored[0].amount_cents, 25_000);
        assert_eq!(stored[2].amount_cents, 100_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_contract_event(&db, "Formatura", date(2025, 6, 1)).await?;

        let first = replace_installments(&db, &editor(), event.id, 1, schedule()).await?;
        let second = replace_installments(&db, &editor(), event.id, 2, schedule()).await?;

        let strip = |rows: &[installment::Model]| {
            rows.iter()
                .map(|r| (r.installment_number, r.amount_cents, r.due_date, r.payment_status))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&first), strip(&second));
        assert_eq!(Installment::find().all(&db).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_shrinks_schedule_without_gaps() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_contract_event(&db, "Formatura", date(2025, 6, 1)).await?;
        replace_installments(&db, &editor(), event.id, 1, schedule()).await?;

        // Drop the middle installment
        let mut shorter = schedule();
        shorter.remove(1);
        let stored = replace_installments(&db, &editor(), event.id, 2, shorter).await?;

        let numbers: Vec<i32> = stored.iter().map(|i| i.installment_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(stored[1].amount_cents, 25_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_with_stale_version_keeps_prior_state() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_contract_event(&db, "Formatura", date(2025, 6, 1)).await?;
        let before = replace_installments(&db, &editor(), event.id, 1, schedule()).await?;

        let result = replace_installments(
            &db,
            &admin(),
            event.id,
            1,
            vec![new_installment(1, date(2025, 1, 1), false)],
        )
        .await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        let after = get_installments_for_event(&db, event.id).await?;
        assert_eq!(before, after);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_rejects_negative_amount_before_writing() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_contract_event(&db, "Formatura", date(2025, 6, 1)).await?;
        replace_installments(&db, &editor(), event.id, 1, schedule()).await?;

        let mut bad = schedule();
        bad.push(new_installment(-1, date(2025, 7, 1), false));
        let result = replace_installments(&db, &editor(), event.id, 2, bad).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert_eq!(get_installments_for_event(&db, event.id).await?.len(), 3);
        let stored = get_event_by_id(&db, event.id).await?.unwrap();
        assert_eq!(stored.version, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_rejects_amount_above_maximum() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_contract_event(&db, "Formatura", date(2025, 6, 1)).await?;

        let at_limit = vec![new_installment(Money::MAX_AMOUNT.cents(), date(2025, 3, 1), false)];
        replace_installments(&db, &editor(), event.id, 1, at_limit).await?;

        let over = vec![
            new_installment(i64::MAX, date(2025, 3, 1), false),
            new_installment(i64::MAX, date(2025, 4, 1), false),
        ];
        let result = replace_installments(&db, &editor(), event.id, 2, over).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let stored = get_installments_for_event(&db, event.id).await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount_cents, Money::MAX_AMOUNT.cents());
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_requires_edit_capability() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_contract_event(&db, "Formatura", date(2025, 6, 1)).await?;

        let result = replace_installments(&db, &viewer(), event.id, 1, schedule()).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        assert!(get_installments_for_event(&db, event.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_missing_event_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = replace_installments(&db, &editor(), 77, 1, schedule()).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_schedule_on_contract_event_aggregates_to_no_contract() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_contract_event(&db, "Formatura", date(2025, 6, 1)).await?;
        replace_installments(&db, &editor(), event.id, 1, schedule()).await?;
        let stored = replace_installments(&db, &editor(), event.id, 2, Vec::new()).await?;
        assert!(stored.is_empty());

        let summary = aggregate(event.has_contract, &stored);
        assert_eq!(summary.status, PaymentStatus::NoContract);
        assert!(summary.awaiting_schedule());
        Ok(())
    }

    #[tokio::test]
    async fn test_due_and_overdue_queries() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_contract_event(&db, "Formatura", date(2025, 6, 1)).await?;
        replace_installments(
            &db,
            &editor(),
            event.id,
            1,
            vec![
                new_installment(10_000, date(2025, 2, 20), false), // overdue
                new_installment(20_000, date(2025, 2, 25), true),  // paid, ignored
                new_installment(30_000, date(2025, 3, 1), false),  // today
                new_installment(40_000, date(2025, 3, 11), false), // edge of window
                new_installment(50_000, date(2025, 3, 12), false), // outside window
            ],
        )
        .await?;

        let today = date(2025, 3, 1);
        let due = installments_due_within(&db, today, 10).await?;
        let numbers: Vec<i32> = due.iter().map(|d| d.installment_number).collect();
        assert_eq!(numbers, vec![3, 4]);
        assert_eq!(due[0].days_until_due, 0);
        assert_eq!(due[1].days_until_due, 10);
        assert_eq!(due[1].event_name, "Formatura");

        let overdue = overdue_installments(&db, today).await?;
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].installment_number, 1);
        assert_eq!(overdue[0].days_until_due, -9);
        Ok(())
    }
}
