use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::payment::Payment;

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub vehicle_type: VehicleType,
    pub service_type: String,
    pub booking_date: NaiveDateTime,
    pub status: BookingStatus,
    #[serde(flatten)]
    pub payment: Payment,
    pub amount: Option<f64>,
    pub created_at: NaiveDateTime,
}

/// Fields collected by the public booking form. Everything else is stamped by the store.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub name: String,
    pub phone: String,
    pub vehicle_type: VehicleType,
    pub service_type: String,
    pub booking_date: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Successors permitted under the strict status policy. Re-setting the
    /// current status is always allowed and not listed here.
    pub fn allowed_next(&self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[BookingStatus::Confirmed, BookingStatus::Cancelled],
            BookingStatus::Confirmed => &[
                BookingStatus::Completed,
                BookingStatus::Cancelled,
                BookingStatus::Pending,
            ],
            BookingStatus::Cancelled => &[BookingStatus::Pending],
            BookingStatus::Completed => &[],
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        *self == next || self.allowed_next().contains(&next)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VehicleType {
    Car,
    #[serde(rename = "SUV")]
    Suv,
    Truck,
    Motorcycle,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "Car",
            VehicleType::Suv => "SUV",
            VehicleType::Truck => "Truck",
            VehicleType::Motorcycle => "Motorcycle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Car" => Some(VehicleType::Car),
            "SUV" => Some(VehicleType::Suv),
            "Truck" => Some(VehicleType::Truck),
            "Motorcycle" => Some(VehicleType::Motorcycle),
            _ => None,
        }
    }
}

/// Accepts the storage format as well as what an HTML `datetime-local` input posts
/// (`2025-06-15T14:00`, with or without seconds).
pub fn parse_booking_date(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        DATE_TIME_FORMAT,
        "%Y-%m-%d %H:%M",
    ];
    let s = s.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

pub fn deserialize_booking_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_booking_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid booking date: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(BookingStatus::parse("confirmed"), Some(BookingStatus::Confirmed));
        assert_eq!(BookingStatus::parse(" Completed "), Some(BookingStatus::Completed));
        assert_eq!(BookingStatus::parse("done"), None);
    }

    #[test]
    fn test_transition_table() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Cancelled.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Pending));
    }

    #[test]
    fn test_parse_booking_date_formats() {
        let expected =
            NaiveDateTime::parse_from_str("2025-06-15 14:00:00", DATE_TIME_FORMAT).unwrap();
        assert_eq!(parse_booking_date("2025-06-15T14:00"), Some(expected));
        assert_eq!(parse_booking_date("2025-06-15T14:00:00"), Some(expected));
        assert_eq!(parse_booking_date("2025-06-15 14:00:00"), Some(expected));
        assert_eq!(parse_booking_date("next tuesday"), None);
    }

    #[test]
    fn test_vehicle_type_serde_names() {
        let json = serde_json::to_string(&VehicleType::Suv).unwrap();
        assert_eq!(json, "\"SUV\"");
        let parsed: VehicleType = serde_json::from_str("\"Motorcycle\"").unwrap();
        assert_eq!(parsed, VehicleType::Motorcycle);
        assert_eq!(VehicleType::parse("Boat"), None);
    }
}
