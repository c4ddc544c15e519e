use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::{BillUpdate, BookingStore};
use crate::models::{BookingStatus, NewBooking, Payment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    NotFound,
    Conflict,
    Persistence,
}

/// Outcome of a booking action. Failures are values, never errors, so callers decide
/// how to surface them.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id: None,
            failure: None,
        }
    }

    pub fn created(id: String, message: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            ..Self::ok(message)
        }
    }

    pub fn fail(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            id: None,
            failure: Some(kind),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.failure {
            None if self.id.is_some() => StatusCode::CREATED,
            None => StatusCode::OK,
            Some(FailureKind::Validation) => StatusCode::BAD_REQUEST,
            Some(FailureKind::NotFound) => StatusCode::NOT_FOUND,
            Some(FailureKind::Conflict) => StatusCode::CONFLICT,
            Some(FailureKind::Persistence) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ActionResult {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Whether a bill amount may be changed once set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillPolicy {
    #[default]
    Editable,
    Locked,
}

impl BillPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "editable" => Some(BillPolicy::Editable),
            "locked" => Some(BillPolicy::Locked),
            _ => None,
        }
    }
}

/// `Open` lets any status follow any other; `Strict` applies
/// [`BookingStatus::allowed_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    #[default]
    Open,
    Strict,
}

impl StatusPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Some(StatusPolicy::Open),
            "strict" => Some(StatusPolicy::Strict),
            _ => None,
        }
    }

    /// Statuses a booking may currently hold for `target` to be written, or `None`
    /// when unrestricted.
    pub fn allowed_from(&self, target: BookingStatus) -> Option<Vec<BookingStatus>> {
        match self {
            StatusPolicy::Open => None,
            StatusPolicy::Strict => Some(
                BookingStatus::ALL
                    .into_iter()
                    .filter(|from| from.can_transition_to(target))
                    .collect(),
            ),
        }
    }
}

/// Upper bound on a single bill, in rupees. Mirrored by the `bookings.amount` CHECK.
pub const MAX_BILL_AMOUNT: f64 = 1_000_000_000.0;

pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0 && amount <= MAX_BILL_AMOUNT
}

pub struct BookingController {
    store: Arc<dyn BookingStore>,
    bill_policy: BillPolicy,
    status_policy: StatusPolicy,
}

impl BookingController {
    pub fn new(store: Arc<dyn BookingStore>, bill_policy: BillPolicy, status_policy: StatusPolicy) -> Self {
        Self {
            store,
            bill_policy,
            status_policy,
        }
    }

    pub async fn create(&self, input: NewBooking) -> ActionResult {
        match self.store.insert(input).await {
            Ok(booking) => {
                tracing::info!(booking_id = %booking.id, service = %booking.service_type, "booking created");
                ActionResult::created(
                    booking.id,
                    "Booking submitted successfully! We will contact you shortly to confirm.",
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create booking");
                ActionResult::fail(
                    FailureKind::Persistence,
                    "Failed to submit booking. Please try again.",
                )
            }
        }
    }

    pub async fn update_status(&self, id: &str, status: BookingStatus) -> ActionResult {
        let allowed_from = self.status_policy.allowed_from(status);

        match self
            .store
            .update_status(id, status, allowed_from.as_deref())
            .await
        {
            Ok(true) => {
                tracing::info!(booking_id = %id, status = status.as_str(), "booking status updated");
                ActionResult::ok(format!("Booking {id} updated."))
            }
            Ok(false) if allowed_from.is_some() => self.explain_rejected_transition(id, status).await,
            Ok(false) => not_found(id),
            Err(e) => {
                tracing::error!(booking_id = %id, error = %e, "failed to update booking status");
                ActionResult::fail(FailureKind::Persistence, "Failed to update booking status.")
            }
        }
    }

    pub async fn update_payment(&self, id: &str, payment: Payment) -> ActionResult {
        match self.store.update_payment(id, payment).await {
            Ok(true) => {
                tracing::info!(
                    booking_id = %id,
                    payment_status = payment.status_str(),
                    payment_method = payment.method_str(),
                    "booking payment updated"
                );
                ActionResult::ok(format!("Payment for booking {id} updated."))
            }
            Ok(false) => not_found(id),
            Err(e) => {
                tracing::error!(booking_id = %id, error = %e, "failed to update booking payment");
                ActionResult::fail(FailureKind::Persistence, "Failed to update payment details.")
            }
        }
    }

    /// Sets the bill amount, and the payment in the same write when given.
    pub async fn set_bill_amount(&self, id: &str, amount: f64, payment: Option<Payment>) -> ActionResult {
        if !is_valid_amount(amount) {
            return ActionResult::fail(FailureKind::Validation, "Please enter a valid amount.");
        }

        let only_if_unbilled = self.bill_policy == BillPolicy::Locked;
        let bill = BillUpdate {
            amount,
            payment,
            only_if_unbilled,
        };

        match self.store.set_amount(id, bill).await {
            Ok(true) => {
                tracing::info!(booking_id = %id, amount, "bill amount set");
                ActionResult::ok(format!("Bill for booking {id} updated."))
            }
            Ok(false) if only_if_unbilled => match self.store.get(id).await {
                Ok(Some(_)) => ActionResult::fail(
                    FailureKind::Conflict,
                    "Bill already generated for this booking.",
                ),
                Ok(None) => not_found(id),
                Err(e) => {
                    tracing::error!(booking_id = %id, error = %e, "failed to load booking after rejected bill");
                    ActionResult::fail(FailureKind::Persistence, "Failed to update bill.")
                }
            },
            Ok(false) => not_found(id),
            Err(e) => {
                tracing::error!(booking_id = %id, error = %e, "failed to set bill amount");
                ActionResult::fail(FailureKind::Persistence, "Failed to update bill.")
            }
        }
    }

    pub async fn delete(&self, id: &str) -> ActionResult {
        match self.store.delete(id).await {
            Ok(true) => {
                tracing::info!(booking_id = %id, "booking deleted");
                ActionResult::ok(format!("Booking {id} deleted."))
            }
            Ok(false) => not_found(id),
            Err(e) => {
                tracing::error!(booking_id = %id, error = %e, "failed to delete booking");
                ActionResult::fail(FailureKind::Persistence, "Failed to delete booking.")
            }
        }
    }

    async fn explain_rejected_transition(&self, id: &str, status: BookingStatus) -> ActionResult {
        match self.store.get(id).await {
            Ok(Some(current)) => ActionResult::fail(
                FailureKind::Conflict,
                format!(
                    "Cannot change status from {} to {}.",
                    current.status.as_str(),
                    status.as_str()
                ),
            ),
            Ok(None) => not_found(id),
            Err(e) => {
                tracing::error!(booking_id = %id, error = %e, "failed to load booking after rejected transition");
                ActionResult::fail(FailureKind::Persistence, "Failed to update booking status.")
            }
        }
    }
}

fn not_found(id: &str) -> ActionResult {
    ActionResult::fail(FailureKind::NotFound, format!("Booking {id} not found."))
}
