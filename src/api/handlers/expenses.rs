//! Expense endpoints - the operating cost ledger.

use crate::{
    api::{AppState, CurrentUser},
    core::{
        event::year_bounds,
        expense::{self, NewExpense},
        permissions::{Capability, require},
    },
    entities::expense as expense_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

/// Filters of the expense list. Without dates the current year is listed.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    /// First day of the range, inclusive
    pub start: Option<NaiveDate>,
    /// Last day of the range, inclusive
    pub end: Option<NaiveDate>,
    /// Exact category to keep
    pub category: Option<String>,
}

/// `GET /expenses?start&end&category`
pub async fn list_expenses(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<expense_entity::Model>>> {
    require(&actor, Capability::ManageExpenses)?;

    let (year_start, year_end) = year_bounds(super::today().year())?;
    let start = query.start.unwrap_or(year_start);
    let end = query.end.unwrap_or(year_end);
    if start > end {
        return Err(Error::validation("start must not be after end"));
    }

    let expenses =
        expense::list_expenses_in_range(&state.database, start, end, query.category.as_deref())
            .await?;
    Ok(Json(expenses))
}

/// `POST /expenses`
pub async fn create_expense(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<NewExpense>,
) -> Result<(StatusCode, Json<expense_entity::Model>)> {
    let created = expense::create_expense(&state.database, &actor, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /expenses/{id}`
pub async fn update_expense(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<NewExpense>,
) -> Result<Json<expense_entity::Model>> {
    let updated = expense::update_expense(&state.database, &actor, id, input).await?;
    Ok(Json(updated))
}

/// `DELETE /expenses/{id}`
pub async fn delete_expense(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    expense::delete_expense(&state.database, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
