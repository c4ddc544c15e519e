use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Timelike};
use serde::Serialize;

use crate::models::{Booking, BookingStatus};

pub const POPULAR_SERVICES_LIMIT: usize = 5;
pub const DAILY_WINDOW: usize = 7;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Please enter a valid 10-digit phone number.")]
pub struct InvalidPhone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BookingStatus),
}

impl StatusFilter {
    /// `"all"` (or an empty value) keeps everything; otherwise a status name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Some(StatusFilter::All);
        }
        BookingStatus::parse(s).map(StatusFilter::Only)
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => booking.status == *status,
        }
    }
}

pub fn filter_by_status(bookings: &[Booking], filter: StatusFilter) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|b| filter.matches(b))
        .cloned()
        .collect()
}

/// Case-insensitive substring match on customer name or service.
pub fn filter_by_text(bookings: &[Booking], needle: &str) -> Vec<Booking> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return bookings.to_vec();
    }

    bookings
        .iter()
        .filter(|b| {
            b.name.to_lowercase().contains(&needle)
                || b.service_type.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Lookup keys are exactly ten digits; anything else never reaches the store.
pub fn validate_phone(input: &str) -> Result<&str, InvalidPhone> {
    let phone = input.trim();
    if phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit()) {
        Ok(phone)
    } else {
        Err(InvalidPhone)
    }
}

/// Sum of billed amounts over completed, paid bookings.
pub fn revenue(bookings: &[Booking]) -> f64 {
    bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Completed && b.payment.is_paid())
        .map(|b| b.amount.unwrap_or(0.0))
        .sum()
}

pub fn popular_services(bookings: &[Booking], top_n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for booking in bookings {
        *counts.entry(booking.service_type.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}

/// Counts per calendar day for the most recent `days` distinct days present, oldest first.
pub fn bookings_by_day(bookings: &[Booking], days: usize) -> Vec<(NaiveDate, usize)> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for booking in bookings {
        *counts.entry(booking.booking_date.date()).or_default() += 1;
    }

    let skip = counts.len().saturating_sub(days);
    counts.into_iter().skip(skip).collect()
}

/// Counts per hour of day (0-23) for the hours that have bookings, ascending.
pub fn bookings_by_hour(bookings: &[Booking]) -> Vec<(u32, usize)> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for booking in bookings {
        *counts.entry(booking.booking_date.hour()).or_default() += 1;
    }
    counts.into_iter().collect()
}

pub fn status_counts(bookings: &[Booking]) -> Vec<(BookingStatus, usize)> {
    BookingStatus::ALL
        .into_iter()
        .map(|status| {
            let count = bookings.iter().filter(|b| b.status == status).count();
            (status, count)
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: BookingStatus,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ServiceCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_bookings: usize,
    pub revenue: f64,
    pub status_counts: Vec<StatusCount>,
    pub popular_services: Vec<ServiceCount>,
    pub bookings_by_day: Vec<DayCount>,
    pub bookings_by_hour: Vec<HourCount>,
}

impl DashboardStats {
    pub fn from_snapshot(bookings: &[Booking]) -> Self {
        Self {
            total_bookings: bookings.len(),
            revenue: revenue(bookings),
            status_counts: status_counts(bookings)
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            popular_services: popular_services(bookings, POPULAR_SERVICES_LIMIT)
                .into_iter()
                .map(|(name, count)| ServiceCount { name, count })
                .collect(),
            bookings_by_day: bookings_by_day(bookings, DAILY_WINDOW)
                .into_iter()
                .map(|(date, count)| DayCount { date, count })
                .collect(),
            bookings_by_hour: bookings_by_hour(bookings)
                .into_iter()
                .map(|(hour, count)| HourCount {
                    hour,
                    label: format!("{hour}:00"),
                    count,
                })
                .collect(),
        }
    }
}
