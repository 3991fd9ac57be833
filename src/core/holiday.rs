//! Holiday business logic - Read-only calendar annotations.
//!
//! Holidays are seeded per year from the fixed-date list in `config.toml` and are
//! never edited through the application.

use crate::{
    config::venue::HolidayConfig,
    entities::{Holiday, holiday},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Lists the holidays of a year ordered by date.
pub async fn list_holidays_for_year(
    db: &DatabaseConnection,
    year: i32,
) -> Result<Vec<holiday::Model>> {
    Holiday::find()
        .filter(holiday::Column::Year.eq(year))
        .order_by_asc(holiday::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts the configured fixed-date holidays for `year`, skipping any already
/// stored for that date and name. Returns how many rows were added.
#[instrument(skip(db, holidays))]
pub async fn seed_holidays(
    db: &DatabaseConnection,
    year: i32,
    holidays: &[HolidayConfig],
) -> Result<usize> {
    let txn = db.begin().await?;
    let mut inserted = 0;

    for config in holidays {
        let Some(date) = NaiveDate::from_ymd_opt(year, config.month, config.day) else {
            warn!(
                name = %config.name,
                month = config.month,
                day = config.day,
                "Skipping holiday with an invalid date"
            );
            continue;
        };

        let exists = Holiday::find()
            .filter(holiday::Column::Date.eq(date))
            .filter(holiday::Column::Name.eq(config.name.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if exists {
            debug!(name = %config.name, %date, "Holiday already present");
            continue;
        }

        holiday::ActiveModel {
            name: Set(config.name.clone()),
            date: Set(date),
            is_national: Set(config.is_national),
            year: Set(year),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        inserted += 1;
    }

    txn.commit().await?;
    info!(year, inserted, "Holidays seeded");
    Ok(inserted)
}
