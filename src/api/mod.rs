//! API layer - HTTP interface over the core operations
//!
//! This module wires the core functions into an axum [`Router`]. Handlers stay thin:
//! they extract the caller, parse the request, call into [`crate::core`] and serialize
//! the result. Authentication happens upstream; the authenticated user id arrives in
//! the [`USER_ID_HEADER`] header and is resolved to a profile on every request.

/// Request context extraction (the calling user)
pub mod context;
/// Mapping of domain errors to HTTP responses
pub mod error;
/// Route handlers organized by resource
pub mod handlers;

use axum::{
    Router,
    routing::{get, put},
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

pub use context::{CurrentUser, USER_ID_HEADER};

/// Shared state available to all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
}

impl AppState {
    /// Wraps an open connection.
    #[must_use]
    pub const fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

/// Builds the application router with request tracing.
pub fn router(state: AppState) -> Router {
    use handlers::{admin, calendar, events, expenses, reports};

    Router::new()
        .route("/me", get(admin::me))
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/{id}/installments", put(events::replace_installments))
        .route(
            "/expenses",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route(
            "/expenses/{id}",
            put(expenses::update_expense).delete(expenses::delete_expense),
        )
        .route("/holidays/{year}", get(calendar::holidays))
        .route("/calendar/{year}", get(calendar::year_calendar))
        .route("/calendar/{year}/{month}", get(calendar::month_calendar))
        .route("/dashboard", get(reports::dashboard))
        .route("/reports", get(reports::financial_report))
        .route("/alerts", get(reports::alerts))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}/role", put(admin::update_role))
        .route(
            "/settings/colors",
            get(admin::get_colors).put(admin::save_colors),
        )
        .route(
            "/settings/alerts",
            get(admin::get_alert_settings).put(admin::save_alert_settings),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
