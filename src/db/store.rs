use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{Timelike, Utc};
use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::db::{self, queries};
use crate::models::{Booking, BookingStatus, NewBooking, Payment};

/// What a live query subscribes to. Results are always ordered by booking date,
/// newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BookingQuery {
    pub phone: Option<String>,
}

impl BookingQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_phone(phone: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Created(String),
    Updated(String),
    Deleted(String),
}

impl StoreChange {
    pub fn booking_id(&self) -> &str {
        match self {
            StoreChange::Created(id) | StoreChange::Updated(id) | StoreChange::Deleted(id) => id,
        }
    }
}

/// A bill write. `payment` is set in the same statement when present; with
/// `only_if_unbilled` the write is skipped for bookings that already carry an amount.
#[derive(Debug, Clone, PartialEq)]
pub struct BillUpdate {
    pub amount: f64,
    pub payment: Option<Payment>,
    pub only_if_unbilled: bool,
}

/// The booking collection: query, mutate by id, and subscribe to change notifications.
/// Mutations return `false` when no row matched.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, new: NewBooking) -> anyhow::Result<Booking>;
    async fn get(&self, id: &str) -> anyhow::Result<Option<Booking>>;
    async fn query(&self, query: &BookingQuery) -> anyhow::Result<Vec<Booking>>;
    async fn update_status(
        &self,
        id: &str,
        status: BookingStatus,
        allowed_from: Option<&[BookingStatus]>,
    ) -> anyhow::Result<bool>;
    async fn update_payment(&self, id: &str, payment: Payment) -> anyhow::Result<bool>;
    async fn set_amount(&self, id: &str, bill: BillUpdate) -> anyhow::Result<bool>;
    async fn delete(&self, id: &str) -> anyhow::Result<bool>;
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

pub struct SqliteBookingStore {
    conn: Arc<Mutex<Connection>>,
    changes: broadcast::Sender<StoreChange>,
}

impl SqliteBookingStore {
    pub fn new(conn: Connection) -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            conn: Arc::new(Mutex::new(conn)),
            changes,
        }
    }

    pub fn open(path: &str) -> anyhow::Result<Self> {
        db::init_db(path).map(Self::new)
    }

    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> anyhow::Result<T>) -> anyhow::Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))?;
        f(&conn)
    }

    fn notify(&self, change: StoreChange) {
        // No live queries is fine
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl BookingStore for SqliteBookingStore {
    async fn insert(&self, new: NewBooking) -> anyhow::Result<Booking> {
        let now = Utc::now().naive_utc();
        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name,
            phone: new.phone,
            vehicle_type: new.vehicle_type,
            service_type: new.service_type,
            booking_date: new.booking_date.with_nanosecond(0).unwrap_or(new.booking_date),
            status: BookingStatus::Pending,
            payment: Payment::Unpaid,
            amount: None,
            created_at: now.with_nanosecond(0).unwrap_or(now),
        };

        self.with_conn(|conn| queries::insert_booking(conn, &booking))
            .context("failed to insert booking")?;
        self.notify(StoreChange::Created(booking.id.clone()));
        Ok(booking)
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Booking>> {
        self.with_conn(|conn| queries::get_booking(conn, id))
    }

    async fn query(&self, query: &BookingQuery) -> anyhow::Result<Vec<Booking>> {
        self.with_conn(|conn| queries::list_bookings(conn, query))
    }

    async fn update_status(
        &self,
        id: &str,
        status: BookingStatus,
        allowed_from: Option<&[BookingStatus]>,
    ) -> anyhow::Result<bool> {
        let updated =
            self.with_conn(|conn| queries::update_booking_status(conn, id, status, allowed_from))?;
        if updated {
            self.notify(StoreChange::Updated(id.to_string()));
        }
        Ok(updated)
    }

    async fn update_payment(&self, id: &str, payment: Payment) -> anyhow::Result<bool> {
        let updated = self.with_conn(|conn| queries::update_booking_payment(conn, id, &payment))?;
        if updated {
            self.notify(StoreChange::Updated(id.to_string()));
        }
        Ok(updated)
    }

    async fn set_amount(&self, id: &str, bill: BillUpdate) -> anyhow::Result<bool> {
        let updated = self.with_conn(|conn| queries::set_booking_amount(conn, id, &bill))?;
        if updated {
            self.notify(StoreChange::Updated(id.to_string()));
        }
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> anyhow::Result<bool> {
        let deleted = self.with_conn(|conn| queries::delete_booking(conn, id))?;
        if deleted {
            self.notify(StoreChange::Deleted(id.to_string()));
        }
        Ok(deleted)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
