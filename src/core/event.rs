//! Event business logic - Handles all event-related operations.
//!
//! Provides functions for creating, listing, updating and deleting events. Every
//! mutation takes the calling [`Actor`] and checks its capability first; updates are
//! guarded by the event's `version` so two editors cannot silently overwrite each
//! other.

use crate::{
    core::{
        installment::get_installments_for_events,
        payment::{EventWithPayment, summarize_events},
        permissions::{Actor, Capability, require},
    },
    entities::{Event, Expense, Installment, event, event::ReservationStatus, expense, installment},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{info, instrument};

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 255;

/// Fields of an event as submitted by the event form.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewEvent {
    /// Display name, 3 to 255 characters after trimming
    pub name: String,
    /// Day of the event
    pub event_date: NaiveDate,
    /// Free-text type, e.g. `CASAMENTO`
    pub event_type: String,
    /// Optional grouping used by revenue reports
    #[serde(default)]
    pub event_category: Option<String>,
    /// Reservation stage
    pub reservation_status: ReservationStatus,
    /// Whether a contract was signed
    #[serde(default)]
    pub has_contract: bool,
    /// Deadline for signing the contract
    #[serde(default)]
    pub contract_due_date: Option<NaiveDate>,
    /// Expected guests; must not be negative
    #[serde(default)]
    pub estimated_audience: Option<i32>,
    /// Free-form notes
    #[serde(default)]
    pub observations: Option<String>,
    /// `#RRGGBB` that wins over the derived calendar color
    #[serde(default)]
    pub color_override: Option<String>,
}

impl NewEvent {
    /// Checks the form fields. Called by every write path before the database is
    /// touched.
    pub fn validate(&self) -> Result<()> {
        let name_len = self.name.trim().chars().count();
        if name_len < NAME_MIN_CHARS {
            return Err(Error::validation(format!(
                "Event name must have at least {NAME_MIN_CHARS} characters"
            )));
        }
        if name_len > NAME_MAX_CHARS {
            return Err(Error::validation(format!(
                "Event name must have at most {NAME_MAX_CHARS} characters"
            )));
        }

        if self.event_type.trim().is_empty() {
            return Err(Error::validation("Event type is required"));
        }

        if self.estimated_audience.is_some_and(|n| n < 0) {
            return Err(Error::validation("Estimated audience cannot be negative"));
        }

        if let Some(color) = &self.color_override {
            if !is_hex_color(color) {
                return Err(Error::validation(format!(
                    "Color override must look like #RRGGBB, got {color:?}"
                )));
            }
        }

        Ok(())
    }
}

pub(crate) fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Copies the form fields onto an active model.
fn apply_fields(model: &mut event::ActiveModel, input: NewEvent) {
    model.name = Set(input.name.trim().to_string());
    model.event_date = Set(input.event_date);
    model.event_type = Set(input.event_type.trim().to_string());
    model.event_category = Set(non_blank(input.event_category));
    model.reservation_status = Set(input.reservation_status);
    model.has_contract = Set(input.has_contract);
    model.contract_due_date = Set(input.contract_due_date);
    model.estimated_audience = Set(input.estimated_audience);
    model.observations = Set(non_blank(input.observations));
    model.color_override = Set(input.color_override);
}

/// Creates a new event after validating the form fields.
#[instrument(skip(db, input), fields(user_id = %actor.user_id))]
pub async fn create_event(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewEvent,
) -> Result<event::Model> {
    require(actor, Capability::CreateEvent)?;
    input.validate()?;

    let now = Utc::now();
    let mut model = event::ActiveModel {
        created_by: Set(Some(actor.user_id.clone())),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    apply_fields(&mut model, input);

    let created = model.insert(db).await?;
    info!(event_id = created.id, "Event created");
    Ok(created)
}

/// Finds an event by its unique ID.
pub async fn get_event_by_id<C>(db: &C, event_id: i64) -> Result<Option<event::Model>>
where
    C: ConnectionTrait,
{
    Event::find_by_id(event_id).one(db).await.map_err(Into::into)
}

/// Lists events between `start` and `end` (inclusive), ordered by date, optionally
/// restricted to one event type.
pub async fn list_events_in_range(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
    event_type: Option<&str>,
) -> Result<Vec<event::Model>> {
    let mut query = Event::find()
        .filter(event::Column::EventDate.gte(start))
        .filter(event::Column::EventDate.lte(end));

    if let Some(event_type) = event_type {
        query = query.filter(event::Column::EventType.eq(event_type));
    }

    query
        .order_by_asc(event::Column::EventDate)
        .order_by_asc(event::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// First and last day of `year`.
pub fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    start
        .zip(end)
        .ok_or_else(|| Error::validation(format!("Year out of range: {year}")))
}

/// Lists every event of a calendar year.
pub async fn list_events_for_year(db: &DatabaseConnection, year: i32) -> Result<Vec<event::Model>> {
    let (start, end) = year_bounds(year)?;
    list_events_in_range(db, start, end, None).await
}

/// Lists events in a range together with their payment snapshots. This is the bulk
/// fetch every view starts from: one query for events, one for their installments.
pub async fn list_events_with_payment(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
    event_type: Option<&str>,
) -> Result<Vec<EventWithPayment>> {
    let events = list_events_in_range(db, start, end, event_type).await?;
    let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
    let installments = get_installments_for_events(db, &ids).await?;
    Ok(summarize_events(events, installments))
}

/// Fails with [`Error::Conflict`] when the stored row moved past the caller's view.
pub(crate) fn check_version(current: &event::Model, expected_version: i32) -> Result<()> {
    if current.version == expected_version {
        Ok(())
    } else {
        Err(Error::Conflict {
            message: format!(
                "Event {} changed (version {} but {} was expected); reload and retry",
                current.id, current.version, expected_version
            ),
        })
    }
}

/// Overwrites an event's fields if nobody else changed it since `expected_version`.
#[instrument(skip(db, input), fields(user_id = %actor.user_id))]
pub async fn update_event(
    db: &DatabaseConnection,
    actor: &Actor,
    event_id: i64,
    expected_version: i32,
    input: NewEvent,
) -> Result<event::Model> {
    require(actor, Capability::EditEvent)?;
    input.validate()?;

    let txn = db.begin().await?;

    let current = get_event_by_id(&txn, event_id)
        .await?
        .ok_or_else(|| Error::not_found("Event", event_id))?;
    check_version(&current, expected_version)?;

    let next_version = current.version + 1;
    let mut model: event::ActiveModel = current.into();
    apply_fields(&mut model, input);
    model.version = Set(next_version);
    model.updated_at = Set(Utc::now());
    let updated = model.update(&txn).await?;

    txn.commit().await?;
    info!(event_id, version = updated.version, "Event updated");
    Ok(updated)
}

/// Deletes an event and its installments in one transaction. Expenses that pointed
/// at the event are kept and become general expenses.
#[instrument(skip(db), fields(user_id = %actor.user_id))]
pub async fn delete_event(db: &DatabaseConnection, actor: &Actor, event_id: i64) -> Result<()> {
    require(actor, Capability::DeleteEvent)?;

    let txn = db.begin().await?;

    let event = get_event_by_id(&txn, event_id)
        .await?
        .ok_or_else(|| Error::not_found("Event", event_id))?;

    let removed = Installment::delete_many()
        .filter(installment::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;

    let orphaned = Expense::update_many()
        .col_expr(expense::Column::EventId, Expr::value(Option::<i64>::None))
        .filter(expense::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;

    event.delete(&txn).await?;
    txn.commit().await?;

    info!(
        event_id,
        installments_removed = removed.rows_affected,
        expenses_orphaned = orphaned.rows_affected,
        "Event deleted"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{expense, installment::replace_installments};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_event_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let actor = editor();

        let mut short_name = sample_new_event("ab");
        short_name.event_date = date(2025, 3, 1);
        let result = create_event(&db, &actor, short_name).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut blank_type = sample_new_event("Festa");
        blank_type.event_type = "  ".to_string();
        let result = create_event(&db, &actor, blank_type).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut bad_color = sample_new_event("Festa");
        bad_color.color_override = Some("red".to_string());
        let result = create_event(&db, &actor, bad_color).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut negative_audience = sample_new_event("Festa");
        negative_audience.estimated_audience = Some(-1);
        let result = create_event(&db, &actor, negative_audience).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert!(Event::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_event_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = sample_new_event("  Casamento Silva  ");
        input.observations = Some("   ".to_string());
        let created = create_event(&db, &editor(), input).await?;

        assert_eq!(created.name, "Casamento Silva");
        assert_eq!(created.version, 1);
        assert_eq!(created.created_by.as_deref(), Some("editor-1"));
        assert!(created.observations.is_none());

        let found = get_event_by_id(&db, created.id).await?.unwrap();
        assert_eq!(found.name, created.name);
        assert_eq!(found.reservation_status, ReservationStatus::PreReservation);
        Ok(())
    }

    #[tokio::test]
    async fn test_viewer_cannot_create_or_delete() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_event(&db, &viewer(), sample_new_event("Festa")).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));

        let event = create_test_event(&db, "Festa", date(2025, 5, 10)).await?;
        let result = delete_event(&db, &viewer(), event.id).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));

        // Still there
        assert!(get_event_by_id(&db, event.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_events_in_range_filters_and_orders() -> Result<()> {
        let db = setup_test_db().await?;
        let late = create_test_event(&db, "Late", date(2025, 12, 31)).await?;
        let early = create_test_event(&db, "Early", date(2025, 1, 1)).await?;
        create_test_event(&db, "Next year", date(2026, 1, 1)).await?;

        let mut other_type = sample_new_event("Other type");
        other_type.event_date = date(2025, 6, 1);
        other_type.event_type = "FPP_501".to_string();
        let other = create_event(&db, &editor(), other_type).await?;

        let year = list_events_for_year(&db, 2025).await?;
        let ids: Vec<i64> = year.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![early.id, other.id, late.id]);

        let only_fpp =
            list_events_in_range(&db, date(2025, 1, 1), date(2025, 12, 31), Some("FPP_501"))
                .await?;
        assert_eq!(only_fpp.len(), 1);
        assert_eq!(only_fpp[0].id, other.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_event_detects_stale_version() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Festa", date(2025, 5, 10)).await?;

        let mut edit = sample_new_event("Festa renomeada");
        edit.event_date = event.event_date;
        let updated = update_event(&db, &editor(), event.id, 1, edit.clone()).await?;
        assert_eq!(updated.version, 2);
        assert_eq!(updated.name, "Festa renomeada");

        // A second editor still holding version 1
        edit.name = "Outro nome".to_string();
        let result = update_event(&db, &admin(), event.id, 1, edit).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        let stored = get_event_by_id(&db, event.id).await?.unwrap();
        assert_eq!(stored.name, "Festa renomeada");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_event(&db, &editor(), 999, 1, sample_new_event("Festa")).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_event_cascades_installments_and_orphans_expenses() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Festa", date(2025, 5, 10)).await?;
        replace_installments(
            &db,
            &editor(),
            event.id,
            event.version,
            vec![
                new_installment(100_000, date(2025, 4, 1), true),
                new_installment(50_000, date(2025, 5, 1), false),
            ],
        )
        .await?;

        let mut input = sample_new_expense("Limpeza", 20_000);
        input.event_id = Some(event.id);
        let spent = expense::create_expense(&db, &editor(), input).await?;

        delete_event(&db, &editor(), event.id).await?;

        assert!(get_event_by_id(&db, event.id).await?.is_none());
        assert!(Installment::find().all(&db).await?.is_empty());
        let kept = Expense::find_by_id(spent.id).one(&db).await?.unwrap();
        assert_eq!(kept.event_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_event_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_event(&db, &admin(), 12345).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[test]
    fn test_year_bounds() {
        let (start, end) = year_bounds(2024).unwrap();
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(end, date(2024, 12, 31));
    }
}
