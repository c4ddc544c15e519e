use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Customer pages and API
        .route("/", get(handlers::public::index_page))
        .route("/bookings", get(handlers::public::bookings_page))
        .route("/api/services", get(handlers::public::list_services))
        .route("/api/bookings", post(handlers::public::create_booking))
        .route("/api/bookings/lookup", get(handlers::public::lookup_bookings))
        .route("/api/bookings/live", get(handlers::live::customer_bookings_stream))
        .route("/receipt", get(handlers::receipt::receipt_by_query))
        .route("/receipt/:id", get(handlers::receipt::receipt_by_path))
        // Admin
        .route("/admin", get(handlers::admin::redirect_to_dashboard))
        .route("/admin/login", get(handlers::admin::login_page))
        .route("/admin/dashboard", get(handlers::admin::dashboard_page))
        .route("/api/admin/login", post(handlers::admin::login))
        .route("/api/admin/logout", post(handlers::admin::logout))
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route("/api/admin/live", get(handlers::live::admin_bookings_stream))
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .route(
            "/api/admin/bookings/:id",
            delete(handlers::admin::delete_booking),
        )
        .route(
            "/api/admin/bookings/:id/status",
            post(handlers::admin::update_status),
        )
        .route(
            "/api/admin/bookings/:id/payment",
            post(handlers::admin::update_payment),
        )
        .route(
            "/api/admin/bookings/:id/bill",
            post(handlers::admin::set_bill),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
