use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use serde::Deserialize;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::{Stream, StreamExt};

use crate::db::BookingQuery;
use crate::errors::AppError;
use crate::services::analytics;
use crate::services::live_query::LiveQuery;
use crate::state::AppState;

use super::admin::check_auth;

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

// GET /api/admin/live
pub async fn admin_bookings_stream(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    // EventSource sends the session cookie; tokens never go in the URL
    check_auth(&headers, &state.auth)?;

    tracing::debug!("admin live query opened");
    let live = LiveQuery::subscribe(state.store.clone(), BookingQuery::all());
    Ok(snapshot_events(live))
}

// GET /api/bookings/live?phone=
#[derive(Deserialize)]
pub struct CustomerLiveQuery {
    pub phone: Option<String>,
}

pub async fn customer_bookings_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CustomerLiveQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let phone = analytics::validate_phone(query.phone.as_deref().unwrap_or(""))
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let live = LiveQuery::subscribe(state.store.clone(), BookingQuery::by_phone(phone));
    Ok(snapshot_events(live))
}

/// Every published state becomes a `snapshot` event. The live query is dropped,
/// and its subscription torn down, when the client disconnects.
fn snapshot_events(live: LiveQuery) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshots = live.into_stream().map(|state| {
        let data = serde_json::to_string(&state).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().data(data).event("snapshot"))
    });

    let keepalive = IntervalStream::new(tokio::time::interval(KEEPALIVE_INTERVAL))
        .map(|_| Ok(Event::default().comment("keepalive")));

    Sse::new(snapshots.merge(keepalive))
}
