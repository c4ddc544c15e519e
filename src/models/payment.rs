use serde::{Deserialize, Serialize};

pub const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Online => "Online",
        }
    }
}

/// Payment state of a booking. The method only exists once the booking is paid, so the
/// status/method pair stored for a booking can never disagree.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "PaymentFields", into = "PaymentFields")]
pub enum Payment {
    #[default]
    Unpaid,
    Paid { method: PaymentMethod },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid payment details: status {status:?} with method {method:?}")]
pub struct InvalidPayment {
    pub status: String,
    pub method: Option<String>,
}

impl Payment {
    pub fn is_paid(&self) -> bool {
        matches!(self, Payment::Paid { .. })
    }

    pub fn status_str(&self) -> &'static str {
        match self {
            Payment::Unpaid => "Pending",
            Payment::Paid { .. } => "Paid",
        }
    }

    pub fn method_str(&self) -> &'static str {
        match self {
            Payment::Unpaid => NOT_APPLICABLE,
            Payment::Paid { method } => method.as_str(),
        }
    }

    /// Builds the variant from the two-column representation used on the wire and in
    /// the database. `Pending` pairs only with a missing method or `N/A`; `Paid` needs
    /// `Cash` or `Online`.
    pub fn from_parts(status: &str, method: Option<&str>) -> Result<Self, InvalidPayment> {
        let invalid = || InvalidPayment {
            status: status.to_string(),
            method: method.map(str::to_string),
        };

        match (status, method) {
            ("Pending", None) | ("Pending", Some(NOT_APPLICABLE)) => Ok(Payment::Unpaid),
            ("Paid", Some("Cash")) => Ok(Payment::Paid {
                method: PaymentMethod::Cash,
            }),
            ("Paid", Some("Online")) => Ok(Payment::Paid {
                method: PaymentMethod::Online,
            }),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentFields {
    pub payment_status: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl TryFrom<PaymentFields> for Payment {
    type Error = InvalidPayment;

    fn try_from(fields: PaymentFields) -> Result<Self, Self::Error> {
        Payment::from_parts(&fields.payment_status, fields.payment_method.as_deref())
    }
}

impl From<Payment> for PaymentFields {
    fn from(payment: Payment) -> Self {
        PaymentFields {
            payment_status: payment.status_str().to_string(),
            payment_method: Some(payment.method_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_accepts_consistent_pairs() {
        assert_eq!(Payment::from_parts("Pending", None), Ok(Payment::Unpaid));
        assert_eq!(Payment::from_parts("Pending", Some("N/A")), Ok(Payment::Unpaid));
        assert_eq!(
            Payment::from_parts("Paid", Some("Online")),
            Ok(Payment::Paid {
                method: PaymentMethod::Online
            })
        );
    }

    #[test]
    fn test_from_parts_rejects_mixed_pairs() {
        assert!(Payment::from_parts("Pending", Some("Cash")).is_err());
        assert!(Payment::from_parts("Paid", Some("N/A")).is_err());
        assert!(Payment::from_parts("Paid", None).is_err());
        assert!(Payment::from_parts("Refunded", None).is_err());
    }

    #[test]
    fn test_serializes_as_two_fields() {
        let json = serde_json::to_value(Payment::Paid {
            method: PaymentMethod::Cash,
        })
        .unwrap();
        assert_eq!(json["payment_status"], "Paid");
        assert_eq!(json["payment_method"], "Cash");

        let json = serde_json::to_value(Payment::Unpaid).unwrap();
        assert_eq!(json["payment_status"], "Pending");
        assert_eq!(json["payment_method"], "N/A");
    }
}
