//! Calendar endpoints - holidays and colored month/year grids.

use crate::{
    api::{AppState, CurrentUser},
    core::{
        calendar::{MonthGrid, YearCalendar, build_month, build_year, month_bounds},
        event::{list_events_with_payment, year_bounds},
        holiday::list_holidays_for_year,
        permissions::{Capability, require},
        settings::get_color_scheme,
    },
    entities::holiday,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Days;

/// Grids show up to six days of the neighbouring months.
const GRID_PADDING_DAYS: u64 = 7;

/// `GET /holidays/{year}`: holidays of a year, ordered by date.
pub async fn holidays(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(year): Path<i32>,
) -> Result<Json<Vec<holiday::Model>>> {
    require(&actor, Capability::ViewCalendar)?;
    Ok(Json(list_holidays_for_year(&state.database, year).await?))
}

/// `GET /calendar/{year}`: all twelve month grids of a year.
pub async fn year_calendar(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(year): Path<i32>,
) -> Result<Json<YearCalendar>> {
    require(&actor, Capability::ViewCalendar)?;
    let db = &state.database;

    let (start, end) = year_bounds(year)?;
    let padded_start = start.checked_sub_days(Days::new(GRID_PADDING_DAYS)).unwrap_or(start);
    let padded_end = end.checked_add_days(Days::new(GRID_PADDING_DAYS)).unwrap_or(end);

    let events = list_events_with_payment(db, padded_start, padded_end, None).await?;
    let holidays = list_holidays_for_year(db, year).await?;
    let scheme = get_color_scheme(db).await?;

    Ok(Json(build_year(year, &events, &holidays, &scheme)?))
}

/// `GET /calendar/{year}/{month}`: one month grid. Invalid months are a 422.
pub async fn month_calendar(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthGrid>> {
    require(&actor, Capability::ViewCalendar)?;
    let db = &state.database;

    let (first, last) = month_bounds(year, month)?;
    let padded_start = first.checked_sub_days(Days::new(GRID_PADDING_DAYS)).unwrap_or(first);
    let padded_end = last.checked_add_days(Days::new(GRID_PADDING_DAYS)).unwrap_or(last);

    let events = list_events_with_payment(db, padded_start, padded_end, None).await?;
    let holidays = list_holidays_for_year(db, year).await?;
    let scheme = get_color_scheme(db).await?;

    Ok(Json(build_month(year, month, &events, &holidays, &scheme)?))
}
