use chrono::{Datelike, Local};
use dotenvy::dotenv;
use std::env;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use venue_desk::{
    api::{self, AppState},
    config::{database, venue},
    core::{holiday, user},
    errors::{Error, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load config.toml, falling back to defaults
    let app_config = venue::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))?;

    // 5. Seed holidays for this year and the configured years ahead
    let this_year = Local::now().year();
    for year in this_year..=this_year + i32::from(app_config.server.holiday_years_ahead) {
        holiday::seed_holidays(&db, year, &app_config.holidays).await?;
    }

    // 6. Hand the first account its admin role
    match env::var("BOOTSTRAP_ADMIN_ID") {
        Ok(user_id) => {
            let full_name =
                env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Administrador".to_string());
            user::bootstrap_admin(&db, &user_id, &full_name).await?;
        }
        Err(env::VarError::NotPresent) => {
            warn!("BOOTSTRAP_ADMIN_ID not set; no admin is created automatically");
        }
        Err(e) => return Err(Error::EnvVar(e)),
    }

    // 7. Serve
    let bind_address =
        env::var("BIND_ADDRESS").unwrap_or_else(|_| app_config.server.bind_address.clone());
    let listener = TcpListener::bind(&bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {bind_address}: {e}"))?;
    info!("Listening on {bind_address}");

    axum::serve(listener, api::router(AppState::new(db))).await?;
    Ok(())
}
