//! Database configuration module for `VenueDesk`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{
    Event, Expense, Holiday, Installment, InstallmentColumn, SystemSetting, UserProfile,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/venue_desk.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to
/// a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet from the entity definitions.
///
/// Events are created before installments and expenses so their foreign keys
/// resolve. Installment numbers are unique per event at the storage level as well.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = vec![
        schema.create_table_from_entity(Event),
        schema.create_table_from_entity(Installment),
        schema.create_table_from_entity(Expense),
        schema.create_table_from_entity(Holiday),
        schema.create_table_from_entity(UserProfile),
        schema.create_table_from_entity(SystemSetting),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(&*statement)).await?;
    }

    let installment_number_index = Index::create()
        .name("idx_installments_event_number")
        .table(Installment)
        .col(InstallmentColumn::EventId)
        .col(InstallmentColumn::InstallmentNumber)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&installment_number_index)).await?;

    info!("Database tables ensured");
    Ok(())
}
