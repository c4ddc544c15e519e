use std::sync::Arc;

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::Local;
use serde::Deserialize;

use crate::services::receipt::{Receipt, ReceiptNotFound};
use crate::state::AppState;

// GET /receipt/:id
pub async fn receipt_by_path(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    render_receipt(&state, &id).await
}

// GET /receipt?id=
#[derive(Deserialize)]
pub struct ReceiptQuery {
    pub id: Option<String>,
}

pub async fn receipt_by_query(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReceiptQuery>,
) -> Response {
    match query.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => render_receipt(&state, id).await,
        _ => not_found(&state),
    }
}

async fn render_receipt(state: &AppState, id: &str) -> Response {
    let booking = match state.store.get(id).await {
        Ok(Some(booking)) => booking,
        Ok(None) => return not_found(state),
        Err(e) => {
            tracing::error!(error = %e, booking_id = id, "failed to load booking for receipt");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
    };

    let receipt = Receipt::for_booking(booking, state.config.shop(), Local::now().date_naive());
    page(StatusCode::OK, receipt.render())
}

fn not_found(state: &AppState) -> Response {
    let shop = state.config.shop();
    page(StatusCode::NOT_FOUND, ReceiptNotFound { shop: &shop }.render())
}

fn page(status: StatusCode, rendered: askama::Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render receipt page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}
