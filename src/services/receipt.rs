use askama::Template;
use chrono::NaiveDate;

use crate::models::Booking;

pub const TAX_RATE: f64 = 0.18;

/// Largest paise count an `f64` still holds exactly (2^53).
const MAX_EXACT_PAISE: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone)]
pub struct ShopProfile {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// Printable receipt for one booking. Rendered through `templates/receipt.html`.
#[derive(Debug, Clone, Template)]
#[template(path = "receipt.html")]
pub struct Receipt {
    pub number: String,
    pub issued_on: NaiveDate,
    pub booking: Booking,
    pub shop: ShopProfile,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl Receipt {
    /// Unbilled bookings print with a zero subtotal.
    pub fn for_booking(booking: Booking, shop: ShopProfile, issued_on: NaiveDate) -> Self {
        let subtotal = booking.amount.unwrap_or(0.0);
        let tax = round_money(subtotal * TAX_RATE);
        let total = round_money(subtotal + tax);

        Self {
            number: receipt_number(&booking.id),
            issued_on,
            booking,
            shop,
            subtotal,
            tax,
            total,
        }
    }

    fn subtotal_inr(&self) -> String {
        format_inr(self.subtotal)
    }

    fn tax_inr(&self) -> String {
        format_inr(self.tax)
    }

    fn total_inr(&self) -> String {
        format_inr(self.total)
    }
}

#[derive(Template)]
#[template(path = "receipt_not_found.html")]
pub struct ReceiptNotFound<'a> {
    pub shop: &'a ShopProfile,
}

pub fn receipt_number(id: &str) -> String {
    id.chars().take(7).collect::<String>().to_uppercase()
}

fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rupees with Indian digit grouping, e.g. `₹12,34,567.50`. Values too large to group
/// exactly are printed ungrouped.
pub fn format_inr(value: f64) -> String {
    let paise = (value * 100.0).round();
    if !paise.is_finite() || paise.abs() > MAX_EXACT_PAISE {
        return format!("₹{value:.2}");
    }

    let paise = paise as i64;
    let sign = if paise < 0 { "-" } else { "" };
    let paise = paise.abs();
    let rupees = (paise / 100).to_string();

    let grouped = if rupees.len() <= 3 {
        rupees
    } else {
        let (mut head, tail) = rupees.split_at(rupees.len() - 3);
        let mut groups = Vec::new();
        while head.len() > 2 {
            let (rest, group) = head.split_at(head.len() - 2);
            groups.push(group);
            head = rest;
        }
        groups.push(head);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    format!("{sign}₹{grouped}.{:02}", paise % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Payment;
    use crate::models::booking::parse_booking_date;
    use crate::models::{BookingStatus, PaymentMethod, VehicleType};

    fn shop() -> ShopProfile {
        ShopProfile {
            name: "Shraddha Traders".to_string(),
            address: "Near Sambhajirao Mane, Rukdi.".to_string(),
            phone: "7040333288".to_string(),
        }
    }

    fn booking(amount: Option<f64>, payment: Payment) -> Booking {
        let date = parse_booking_date("2025-03-15T14:00").unwrap();
        Booking {
            id: "ab12cd34ef56".to_string(),
            name: "Anil <Kumar>".to_string(),
            phone: "9876543210".to_string(),
            vehicle_type: VehicleType::Truck,
            service_type: "Engine Work".to_string(),
            booking_date: date,
            status: BookingStatus::Completed,
            payment,
            amount,
            created_at: date,
        }
    }

    fn issued() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 16).unwrap()
    }

    #[test]
    fn test_totals_include_tax() {
        let receipt = Receipt::for_booking(booking(Some(500.0), Payment::Unpaid), shop(), issued());
        assert_eq!(receipt.number, "AB12CD3");
        assert_eq!(receipt.subtotal, 500.0);
        assert_eq!(receipt.tax, 90.0);
        assert_eq!(receipt.total, 590.0);

        let receipt = Receipt::for_booking(booking(Some(499.5), Payment::Unpaid), shop(), issued());
        assert_eq!(format_inr(receipt.tax), "₹89.91");
        assert_eq!(format_inr(receipt.total), "₹589.41");
    }

    #[test]
    fn test_unbilled_booking_prints_zero() {
        let receipt = Receipt::for_booking(booking(None, Payment::Unpaid), shop(), issued());
        assert_eq!(receipt.subtotal, 0.0);
        assert_eq!(receipt.total, 0.0);
    }

    #[test]
    fn test_format_inr_grouping() {
        assert_eq!(format_inr(0.0), "₹0.00");
        assert_eq!(format_inr(999.5), "₹999.50");
        assert_eq!(format_inr(1234.0), "₹1,234.00");
        assert_eq!(format_inr(1234567.25), "₹12,34,567.25");
        assert_eq!(format_inr(-1500.0), "-₹1,500.00");
    }

    #[test]
    fn test_format_inr_never_saturates() {
        assert_eq!(format_inr(1e17), "₹100000000000000000.00");
        assert!(!format_inr(1.18e308).contains("92,23,37,20,36,85,47,758"));
        assert_eq!(format_inr(f64::INFINITY), "₹inf");
    }

    #[test]
    fn test_render_html() {
        let paid = Payment::Paid {
            method: PaymentMethod::Online,
        };
        let receipt = Receipt::for_booking(booking(Some(1000.0), paid), shop(), issued());
        let html = receipt.render().unwrap();

        assert!(html.contains("Shraddha Traders"));
        assert!(html.contains("#AB12CD3"));
        assert!(html.contains("Issued: Mar 16, 2025"));
        assert!(html.contains("Anil &lt;Kumar&gt;"));
        assert!(html.contains("Mar 15, 2025, 2:00 PM"));
        assert!(html.contains("Engine Work"));
        assert!(html.contains("₹1,000.00"));
        assert!(html.contains("₹180.00"));
        assert!(html.contains("₹1,180.00"));
        assert!(html.contains("Paid via Online"));
        assert!(!html.contains("Anil <Kumar>"));
    }

    #[test]
    fn test_render_unpaid_badge() {
        let receipt = Receipt::for_booking(booking(None, Payment::Unpaid), shop(), issued());
        let html = receipt.render().unwrap();
        assert!(html.contains("badge pending"));
        assert!(html.contains("₹0.00"));
    }

    #[test]
    fn test_render_not_found() {
        let shop = shop();
        let html = ReceiptNotFound { shop: &shop }.render().unwrap();
        assert!(html.contains("Receipt not found."));
        assert!(html.contains("<title>Shraddha Traders</title>"));
    }
}
