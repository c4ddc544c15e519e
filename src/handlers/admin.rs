use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::db::BookingQuery;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Payment};
use crate::services::analytics::{self, DashboardStats, StatusFilter};
use crate::services::auth::{AuthContext, Session};
use crate::services::lifecycle::{ActionResult, FailureKind};
use crate::state::AppState;

use super::rejected;

static LOGIN_HTML: &str = include_str!("../web/login.html");
static DASHBOARD_HTML: &str = include_str!("../web/dashboard.html");

pub const SESSION_COOKIE: &str = "garagebook_session";

const INVALID_PAYMENT: &str = "Payment must be Pending, or Paid by Cash or Online.";

/// Bearer header first, then the session cookie.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());
    if bearer.is_some() {
        return bearer;
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn check_auth(headers: &HeaderMap, auth: &AuthContext) -> Result<Session, AppError> {
    session_token(headers)
        .and_then(|token| auth.session(&token))
        .ok_or(AppError::Unauthorized)
}

fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

pub async fn redirect_to_dashboard() -> Redirect {
    Redirect::to("/admin/dashboard")
}

pub async fn dashboard_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match check_auth(&headers, &state.auth) {
        Ok(_) => Html(DASHBOARD_HTML).into_response(),
        Err(_) => Redirect::to("/admin/login").into_response(),
    }
}

// POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub email: String,
    pub token: String,
    pub expires_in: i64,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = body.email.trim();
    let identity = state
        .identity
        .sign_in(email, &body.password)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "identity provider sign-in failed");
            AppError::Identity("sign-in is unavailable, please try again".to_string())
        })?;

    let Some(identity) = identity else {
        tracing::warn!(email, "rejected admin sign-in");
        return Err(AppError::Unauthorized);
    };

    tracing::info!(email = %identity.email, "admin signed in");
    let email = identity.email.clone();
    let token = state.auth.sign_in(identity);
    let expires_in = state.auth.ttl_seconds();

    Ok((
        jar.add(session_cookie(token.clone(), expires_in)),
        Json(LoginResponse {
            ok: true,
            email,
            token,
            expires_in,
        }),
    )
        .into_response())
}

// POST /api/admin/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    if let Some(token) = session_token(&headers) {
        if state.auth.sign_out(&token) {
            tracing::info!("admin signed out");
        }
    }

    // Expire the cookie even when the client signed out with a bearer token
    (
        jar.add(session_cookie(String::new(), 0)),
        Json(serde_json::json!({"ok": true})),
    )
        .into_response()
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, &state.auth)?;

    let status = query.status.as_deref().unwrap_or("all");
    let filter = StatusFilter::parse(status)
        .ok_or_else(|| AppError::Validation(format!("unknown status filter: {status}")))?;

    let snapshot = state.store.query(&BookingQuery::all()).await?;
    let bookings = analytics::filter_by_status(&snapshot, filter);
    let bookings = analytics::filter_by_text(&bookings, query.q.as_deref().unwrap_or(""));

    Ok(Json(bookings))
}

// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, AppError> {
    check_auth(&headers, &state.auth)?;

    let snapshot = state.store.query(&BookingQuery::all()).await?;
    Ok(Json(DashboardStats::from_snapshot(&snapshot)))
}

// POST /api/admin/bookings/:id/status
#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: BookingStatus,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<ActionResult, AppError> {
    check_auth(&headers, &state.auth)?;

    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return Ok(rejected(rejection)),
    };
    Ok(state.bookings.update_status(&id, body.status).await)
}

// POST /api/admin/bookings/:id/payment
#[derive(Deserialize)]
pub struct PaymentRequest {
    pub payment_status: String,
    pub payment_method: Option<String>,
}

pub async fn update_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<ActionResult, AppError> {
    check_auth(&headers, &state.auth)?;

    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return Ok(rejected(rejection)),
    };
    let Ok(payment) = Payment::from_parts(&body.payment_status, body.payment_method.as_deref()) else {
        return Ok(ActionResult::fail(FailureKind::Validation, INVALID_PAYMENT));
    };

    Ok(state.bookings.update_payment(&id, payment).await)
}

// POST /api/admin/bookings/:id/bill
#[derive(Deserialize)]
pub struct BillRequest {
    pub amount: f64,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
}

pub async fn set_bill(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<BillRequest>, JsonRejection>,
) -> Result<ActionResult, AppError> {
    check_auth(&headers, &state.auth)?;

    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return Ok(rejected(rejection)),
    };

    // Billing may settle the payment in the same step
    let payment = match (body.payment_status.as_deref(), body.payment_method.as_deref()) {
        (None, None) => None,
        (Some(status), method) => match Payment::from_parts(status, method) {
            Ok(payment) => Some(payment),
            Err(_) => return Ok(ActionResult::fail(FailureKind::Validation, INVALID_PAYMENT)),
        },
        (None, Some(_)) => return Ok(ActionResult::fail(FailureKind::Validation, INVALID_PAYMENT)),
    };

    Ok(state.bookings.set_bill_amount(&id, body.amount, payment).await)
}

// DELETE /api/admin/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<ActionResult, AppError> {
    check_auth(&headers, &state.auth)?;
    Ok(state.bookings.delete(&id).await)
}
