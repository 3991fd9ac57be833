//! Route handlers organized by resource.

/// Profiles, role management, settings and the caller's own permissions
pub mod admin;
/// Holidays and calendar grids
pub mod calendar;
/// Events and their installment schedules
pub mod events;
/// Operating expenses
pub mod expenses;
/// Dashboard, financial reports and due-date alerts
pub mod reports;

use chrono::{Local, NaiveDate};

/// Current date in the server's timezone.
fn today() -> NaiveDate {
    Local::now().date_naive()
}
