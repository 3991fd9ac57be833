//! Calendar bucketing - Year and month grids of events and holidays.
//!
//! Events are bucketed by date and colored from their [`PaymentSummary`]; the grid
//! itself is a Sunday-first week layout padded with the neighbouring months' days,
//! the way a wall calendar is drawn.
//!
//! [`PaymentSummary`]: crate::core::payment::PaymentSummary

use crate::{
    core::{
        payment::{EventWithPayment, PaymentStatus},
        settings::ColorScheme,
    },
    entities::{event::ReservationStatus, holiday},
    errors::{Error, Result},
};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Color of an event on the calendar.
///
/// Precedence: explicit override, fully paid, contract flag, reservation status.
#[must_use]
pub fn event_color(entry: &EventWithPayment, scheme: &ColorScheme) -> String {
    if let Some(color) = &entry.event.color_override {
        return color.clone();
    }
    if entry.payment.status == PaymentStatus::FullyPaid {
        return scheme.reserva_paga.clone();
    }
    if entry.event.has_contract {
        return scheme.reserva_com_contrato.clone();
    }

    match entry.event.reservation_status {
        ReservationStatus::Confirmed => scheme.reserva_com_contrato.clone(),
        ReservationStatus::InProgress => scheme.reserva_em_andamento.clone(),
        ReservationStatus::PreReservation => scheme.pre_reserva.clone(),
        ReservationStatus::NoReservation => scheme.sem_reserva.clone(),
    }
}

/// First and last day of a month. Fails with a validation error for months outside
/// `1..=12` or years chrono cannot represent.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || Error::validation(format!("Invalid month: {year}-{month}"));

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;
    Ok((first, last))
}

/// An event as drawn inside a day cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    /// Id of the event
    pub event_id: i64,
    /// Event name
    pub name: String,
    /// Resolved display color, see [`event_color`]
    pub color: String,
    /// Derived payment status
    pub payment_status: PaymentStatus,
    /// Reservation stage
    pub reservation_status: ReservationStatus,
}

/// One cell of a month grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    /// The day
    pub date: NaiveDate,
    /// False for padding days borrowed from the previous or next month
    pub in_month: bool,
    /// Events on this day, in the order they were fetched
    pub events: Vec<CalendarEvent>,
    /// Holiday on this day, if any
    pub holiday: Option<holiday::Model>,
}

/// A month laid out as Sunday-first weeks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    /// Calendar year
    pub year: i32,
    /// Month number, 1-based
    pub month: u32,
    /// Portuguese month name
    pub name: &'static str,
    /// Rows of exactly seven days, Sunday first
    pub weeks: Vec<Vec<CalendarDay>>,
}

/// Twelve month grids of one year.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct YearCalendar {
    /// Calendar year
    pub year: i32,
    /// January through December
    pub months: Vec<MonthGrid>,
}

/// Events and holidays grouped by date.
struct Buckets<'a> {
    events: HashMap<NaiveDate, Vec<&'a EventWithPayment>>,
    holidays: HashMap<NaiveDate, &'a holiday::Model>,
}

impl<'a> Buckets<'a> {
    fn new(events: &'a [EventWithPayment], holidays: &'a [holiday::Model]) -> Self {
        let mut by_date: HashMap<NaiveDate, Vec<&EventWithPayment>> = HashMap::new();
        for entry in events {
            by_date.entry(entry.event.event_date).or_default().push(entry);
        }
        // Last one wins when two holidays share a date
        let holidays = holidays.iter().map(|h| (h.date, h)).collect();
        Self {
            events: by_date,
            holidays,
        }
    }

    fn day(&self, date: NaiveDate, in_month: bool, scheme: &ColorScheme) -> CalendarDay {
        let events = self
            .events
            .get(&date)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| CalendarEvent {
                        event_id: entry.event.id,
                        name: entry.event.name.clone(),
                        color: event_color(entry, scheme),
                        payment_status: entry.payment.status,
                        reservation_status: entry.event.reservation_status,
                    })
                    .collect()
            })
            .unwrap_or_default();

        CalendarDay {
            date,
            in_month,
            events,
            holiday: self.holidays.get(&date).map(|h| (*h).clone()),
        }
    }

    fn month(&self, year: i32, month: u32, scheme: &ColorScheme) -> Result<MonthGrid> {
        let (first, last) = month_bounds(year, month)?;
        let invalid = || Error::validation(format!("Invalid month: {year}-{month}"));

        let lead = u64::from(first.weekday().num_days_from_sunday());
        let trail = u64::from(6 - last.weekday().num_days_from_sunday());
        let start = first.checked_sub_days(Days::new(lead)).ok_or_else(invalid)?;
        let end = last.checked_add_days(Days::new(trail)).ok_or_else(invalid)?;

        let days: Vec<CalendarDay> = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|d| self.day(d, d.month() == month && d.year() == year, scheme))
            .collect();

        Ok(MonthGrid {
            year,
            month,
            name: MONTH_NAMES[month as usize - 1],
            weeks: days.chunks(7).map(<[CalendarDay]>::to_vec).collect(),
        })
    }
}

/// Lays out one month. Events and holidays outside the grid are ignored.
pub fn build_month(
    year: i32,
    month: u32,
    events: &[EventWithPayment],
    holidays: &[holiday::Model],
    scheme: &ColorScheme,
) -> Result<MonthGrid> {
    Buckets::new(events, holidays).month(year, month, scheme)
}

/// Lays out all twelve months of a year.
pub fn build_year(
    year: i32,
    events: &[EventWithPayment],
    holidays: &[holiday::Model],
    scheme: &ColorScheme,
) -> Result<YearCalendar> {
    let buckets = Buckets::new(events, holidays);
    let months = (1..=12)
        .map(|month| buckets.month(year, month, scheme))
        .collect::<Result<Vec<_>>>()?;
    Ok(YearCalendar { year, months })
}
