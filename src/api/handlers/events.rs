//! Event endpoints - CRUD with payment summaries and schedule replacement.

use crate::{
    api::{AppState, CurrentUser},
    core::{
        event::{self, NewEvent},
        installment::{self, NewInstallment},
        payment::{EventWithPayment, aggregate},
        permissions::{Capability, require},
    },
    entities::installment as installment_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Filters of the event list. Without dates the current year is listed.
#[derive(Debug, Default, Deserialize)]
pub struct EventQuery {
    /// First day of the range, inclusive
    pub start: Option<NaiveDate>,
    /// Last day of the range, inclusive
    pub end: Option<NaiveDate>,
    /// Exact event type to keep
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

/// An event with its schedule and derived payment summary.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    /// The event and its payment summary
    #[serde(flatten)]
    pub entry: EventWithPayment,
    /// Stored schedule, ordered by installment number
    pub installments: Vec<installment_entity::Model>,
}

/// Event form plus the version the editor started from.
#[derive(Debug, Deserialize)]
pub struct UpdateEvent {
    /// Version read by the editor; a mismatch is a 409
    pub expected_version: i32,
    /// New event fields
    #[serde(flatten)]
    pub event: NewEvent,
}

/// Replacement installment schedule plus the version the editor started from.
#[derive(Debug, Deserialize)]
pub struct ScheduleUpdate {
    /// Version read by the editor; a mismatch is a 409
    pub expected_version: i32,
    /// Full schedule, numbered in list order
    pub installments: Vec<NewInstallment>,
}

async fn load_detail(state: &AppState, id: i64) -> Result<EventDetail> {
    let db = &state.database;
    let event = event::get_event_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Event", id))?;
    let installments = installment::get_installments_for_event(db, id).await?;
    let payment = aggregate(event.has_contract, &installments);
    Ok(EventDetail {
        entry: EventWithPayment { event, payment },
        installments,
    })
}

/// `GET /events?start&end&type`
pub async fn list_events(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<EventQuery>,
) -> Result<Json<Vec<EventWithPayment>>> {
    require(&actor, Capability::ViewEvents)?;

    let (year_start, year_end) = event::year_bounds(super::today().year())?;
    let start = query.start.unwrap_or(year_start);
    let end = query.end.unwrap_or(year_end);
    if start > end {
        return Err(Error::validation("start must not be after end"));
    }

    let events =
        event::list_events_with_payment(&state.database, start, end, query.event_type.as_deref())
            .await?;
    Ok(Json(events))
}

/// `GET /events/{id}`
pub async fn get_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<EventDetail>> {
    require(&actor, Capability::ViewEvents)?;
    Ok(Json(load_detail(&state, id).await?))
}

/// `POST /events`: answers 201 with the stored event.
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<NewEvent>,
) -> Result<(StatusCode, Json<EventDetail>)> {
    let created = event::create_event(&state.database, &actor, input).await?;
    let detail = load_detail(&state, created.id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `PUT /events/{id}`
pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateEvent>,
) -> Result<Json<EventDetail>> {
    event::update_event(&state.database, &actor, id, input.expected_version, input.event).await?;
    Ok(Json(load_detail(&state, id).await?))
}

/// `DELETE /events/{id}`: drops the schedule too; linked expenses are kept.
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    event::delete_event(&state.database, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /events/{id}/installments`: swaps the whole schedule in one transaction.
pub async fn replace_installments(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<ScheduleUpdate>,
) -> Result<Json<EventDetail>> {
    installment::replace_installments(
        &state.database,
        &actor,
        id,
        input.expected_version,
        input.installments,
    )
    .await?;
    Ok(Json(load_detail(&state, id).await?))
}
