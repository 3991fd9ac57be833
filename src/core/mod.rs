//! Core business logic, independent of the HTTP layer.
//!
//! Every operation takes a database connection and, when it reads or mutates
//! protected data, the [`permissions::Actor`] on whose behalf it runs.

pub mod calendar;
pub mod event;
pub mod expense;
pub mod holiday;
pub mod installment;
pub mod money;
pub mod payment;
pub mod permissions;
pub mod report;
pub mod settings;
pub mod user;
