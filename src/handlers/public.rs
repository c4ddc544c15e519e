use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::BookingQuery;
use crate::errors::{validation_message, AppError};
use crate::models::booking::deserialize_booking_date;
use crate::models::service::catalog;
use crate::models::{Booking, NewBooking, Service, VehicleType};
use crate::services::analytics;
use crate::services::lifecycle::{ActionResult, FailureKind};
use crate::state::AppState;

use super::rejected;

static INDEX_HTML: &str = include_str!("../web/index.html");
static BOOKINGS_HTML: &str = include_str!("../web/bookings.html");

pub const NO_BOOKINGS_MESSAGE: &str = "No bookings found for this phone number.";

pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn bookings_page() -> Html<&'static str> {
    Html(BOOKINGS_HTML)
}

// GET /api/services
pub async fn list_services() -> Json<&'static [Service]> {
    Json(catalog())
}

// POST /api/bookings
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: String,
    #[validate(length(min = 10, message = "Please enter a valid phone number."))]
    pub phone: String,
    pub vehicle_type: VehicleType,
    #[validate(length(min = 1, message = "Please select a service."))]
    pub service_type: String,
    #[serde(deserialize_with = "deserialize_booking_date")]
    pub booking_date: NaiveDateTime,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> ActionResult {
    let Json(mut body) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };

    body.name = body.name.trim().to_string();
    body.phone = body.phone.trim().to_string();
    if let Err(errors) = body.validate() {
        return ActionResult::fail(FailureKind::Validation, validation_message(&errors));
    }

    state
        .bookings
        .create(NewBooking {
            name: body.name,
            phone: body.phone,
            vehicle_type: body.vehicle_type,
            service_type: body.service_type,
            booking_date: body.booking_date,
        })
        .await
}

// GET /api/bookings/lookup?phone=
#[derive(Deserialize)]
pub struct LookupQuery {
    pub phone: Option<String>,
}

#[derive(Serialize)]
pub struct LookupResponse {
    pub bookings: Vec<Booking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn lookup_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupResponse>, AppError> {
    let phone = analytics::validate_phone(query.phone.as_deref().unwrap_or(""))
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let bookings = state.store.query(&BookingQuery::by_phone(phone)).await?;
    tracing::debug!(found = bookings.len(), "customer booking lookup");

    let message = bookings.is_empty().then(|| NO_BOOKINGS_MESSAGE.to_string());
    Ok(Json(LookupResponse { bookings, message }))
}
