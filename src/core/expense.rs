//! Expense business logic - The venue's operating cost ledger.
//!
//! Expenses are independent of events; the optional `event_id` only records what an
//! expense was for and never blocks deleting the event.

use crate::{
    core::{
        event::get_event_by_id,
        money::{Money, percentage},
        permissions::{Actor, Capability, require},
    },
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Category used when none is given.
pub const DEFAULT_CATEGORY: &str = "OUTROS";

/// Fields of an expense as submitted by the expense form.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewExpense {
    /// What the money was spent on
    pub description: String,
    /// Blank or missing falls back to [`DEFAULT_CATEGORY`]
    #[serde(default)]
    pub category: Option<String>,
    /// Amount spent
    pub amount: Money,
    /// Day of the expense
    pub expense_date: NaiveDate,
    /// Event the expense was for, if any
    #[serde(default)]
    pub event_id: Option<i64>,
}

impl NewExpense {
    /// Requires a description and an amount in `(0, Money::MAX_AMOUNT]`.
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(Error::validation("Expense description cannot be empty"));
        }
        if self.amount <= Money::ZERO {
            return Err(Error::validation(format!(
                "Expense amount must be positive, got {}",
                self.amount
            )));
        }
        if self.amount > Money::MAX_AMOUNT {
            return Err(Error::validation(format!(
                "Expense amount exceeds the maximum of {}",
                Money::MAX_AMOUNT
            )));
        }
        Ok(())
    }

    fn category(&self) -> String {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string()
    }
}

async fn ensure_event_exists(db: &DatabaseConnection, event_id: Option<i64>) -> Result<()> {
    if let Some(event_id) = event_id {
        get_event_by_id(db, event_id)
            .await?
            .ok_or_else(|| Error::not_found("Event", event_id))?;
    }
    Ok(())
}

/// Records a new expense.
#[instrument(skip(db, input), fields(user_id = %actor.user_id))]
pub async fn create_expense(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewExpense,
) -> Result<expense::Model> {
    require(actor, Capability::ManageExpenses)?;
    input.validate()?;
    ensure_event_exists(db, input.event_id).await?;

    let category = input.category();
    let model = expense::ActiveModel {
        description: Set(input.description.trim().to_string()),
        category: Set(category),
        amount_cents: Set(input.amount.cents()),
        expense_date: Set(input.expense_date),
        event_id: Set(input.event_id),
        created_by: Set(Some(actor.user_id.clone())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(expense_id = created.id, amount = %input.amount, "Expense recorded");
    Ok(created)
}

/// Overwrites an existing expense.
#[instrument(skip(db, input), fields(user_id = %actor.user_id))]
pub async fn update_expense(
    db: &DatabaseConnection,
    actor: &Actor,
    expense_id: i64,
    input: NewExpense,
) -> Result<expense::Model> {
    require(actor, Capability::ManageExpenses)?;
    input.validate()?;
    ensure_event_exists(db, input.event_id).await?;

    let current = Expense::find_by_id(expense_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Expense", expense_id))?;

    let category = input.category();
    let mut model: expense::ActiveModel = current.into();
    model.description = Set(input.description.trim().to_string());
    model.category = Set(category);
    model.amount_cents = Set(input.amount.cents());
    model.expense_date = Set(input.expense_date);
    model.event_id = Set(input.event_id);

    model.update(db).await.map_err(Into::into)
}

/// Deletes an expense.
#[instrument(skip(db), fields(user_id = %actor.user_id))]
pub async fn delete_expense(db: &DatabaseConnection, actor: &Actor, expense_id: i64) -> Result<()> {
    require(actor, Capability::ManageExpenses)?;

    let result = Expense::delete_by_id(expense_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Expense", expense_id));
    }
    info!(expense_id, "Expense deleted");
    Ok(())
}

/// Lists expenses between `start` and `end` (inclusive), newest first, optionally
/// restricted to one category.
pub async fn list_expenses_in_range(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
    category: Option<&str>,
) -> Result<Vec<expense::Model>> {
    let mut query = Expense::find()
        .filter(expense::Column::ExpenseDate.gte(start))
        .filter(expense::Column::ExpenseDate.lte(end));

    if let Some(category) = category {
        query = query.filter(expense::Column::Category.eq(category));
    }

    query
        .order_by_desc(expense::Column::ExpenseDate)
        .order_by_desc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Spending of one category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Category name
    pub category: String,
    /// Sum of the category's expenses
    pub total: Money,
    /// Share of all listed expenses, 0 when nothing was spent
    pub percentage: f64,
}

/// Sums expenses per category, largest first. Ties are ordered by category name.
#[must_use]
pub fn totals_by_category(expenses: &[expense::Model]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, Money> = HashMap::new();
    for exp in expenses {
        *totals.entry(exp.category.as_str()).or_default() += Money::from_cents(exp.amount_cents);
    }

    let grand_total: Money = totals.values().copied().sum();
    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
            percentage: percentage(total, grand_total),
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    rows
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_expense_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let blank = sample_new_expense("   ", 1_000);
        let result = create_expense(&db, &editor(), blank).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let zero = sample_new_expense("Som", 0);
        let result = create_expense(&db, &editor(), zero).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let huge = sample_new_expense("Som", Money::MAX_AMOUNT.cents() + 1);
        let result = create_expense(&db, &editor(), huge).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let at_limit = sample_new_expense("Som", Money::MAX_AMOUNT.cents());
        create_expense(&db, &editor(), at_limit).await?;

        let mut dangling = sample_new_expense("Som", 1_000);
        dangling.event_id = Some(404);
        let result = create_expense(&db, &editor(), dangling).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_defaults_category() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_expense(&db, &admin(), sample_new_expense("Som", 1_000)).await?;
        assert_eq!(created.category, DEFAULT_CATEGORY);
        assert_eq!(created.amount_cents, 1_000);
        assert_eq!(created.created_by.as_deref(), Some("admin-1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_viewer_cannot_manage_expenses() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_expense(&db, &editor(), sample_new_expense("Som", 1_000)).await?;

        let result = create_expense(&db, &viewer(), sample_new_expense("Luz", 500)).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));

        let result = delete_expense(&db, &viewer(), created.id).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_expense() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_expense(&db, &editor(), sample_new_expense("Som", 1_000)).await?;

        let mut edit = sample_new_expense("Som e luz", 2_500);
        edit.category = Some("MANUTENCAO".to_string());
        let updated = update_expense(&db, &editor(), created.id, edit).await?;
        assert_eq!(updated.description, "Som e luz");
        assert_eq!(updated.category, "MANUTENCAO");
        assert_eq!(updated.amount_cents, 2_500);

        delete_expense(&db, &editor(), created.id).await?;
        let result = delete_expense(&db, &editor(), created.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_expenses_in_range() -> Result<()> {
        let db = setup_test_db().await?;
        let mut jan = sample_new_expense("Janeiro", 1_000);
        jan.expense_date = date(2025, 1, 15);
        let mut feb = sample_new_expense("Fevereiro", 2_000);
        feb.expense_date = date(2025, 2, 15);
        feb.category = Some("PESSOAL".to_string());
        create_expense(&db, &editor(), jan).await?;
        create_expense(&db, &editor(), feb).await?;

        let all = list_expenses_in_range(&db, date(2025, 1, 1), date(2025, 12, 31), None).await?;
        let names: Vec<&str> = all.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(names, vec!["Fevereiro", "Janeiro"]);

        let staff =
            list_expenses_in_range(&db, date(2025, 1, 1), date(2025, 12, 31), Some("PESSOAL"))
                .await?;
        assert_eq!(staff.len(), 1);

        let january = list_expenses_in_range(&db, date(2025, 1, 1), date(2025, 1, 31), None).await?;
        assert_eq!(january.len(), 1);
        Ok(())
    }

    #[test]
    fn test_totals_by_category() {
        let rows = vec![
            expense_row("LIMPEZA", 3_000),
            expense_row("SEGURANCA", 1_000),
            expense_row("LIMPEZA", 1_000),
            expense_row("ALUGUEL", 1_000),
        ];
        let totals = totals_by_category(&rows);

        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0].category, "LIMPEZA");
        assert_eq!(totals[0].total, Money::from_cents(4_000));
        assert!((totals[0].percentage - 200.0 / 3.0).abs() < 1e-9);
        // Tie broken alphabetically
        assert_eq!(totals[1].category, "ALUGUEL");
        assert_eq!(totals[2].category, "SEGURANCA");
    }

    #[test]
    fn test_totals_by_category_empty() {
        assert!(totals_by_category(&[]).is_empty());
    }
}
