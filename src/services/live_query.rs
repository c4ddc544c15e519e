//! Mirrors a booking query into a watch channel.
//!
//! Each [`LiveQuery`] owns a task that reloads the full result set whenever the store
//! reports a change and publishes it as a [`QueryState`]. Snapshots replace the previous
//! data wholesale. Dropping the handle stops the task.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::Stream;

use crate::db::{BookingQuery, BookingStore};
use crate::models::Booking;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryState {
    /// `None` until the first snapshot arrives.
    pub data: Option<Vec<Booking>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl QueryState {
    fn initial() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }
}

pub struct LiveQuery {
    query: BookingQuery,
    state: watch::Receiver<QueryState>,
    task: JoinHandle<()>,
}

impl LiveQuery {
    pub fn subscribe(store: Arc<dyn BookingStore>, query: BookingQuery) -> Self {
        let (tx, rx) = watch::channel(QueryState::initial());

        // Subscribe before the first load so no change slips in between
        let mut changes = store.subscribe();
        let task_query = query.clone();

        let task = tokio::spawn(async move {
            refresh(store.as_ref(), &task_query, &tx).await;

            loop {
                match changes.recv().await {
                    Ok(change) => {
                        tracing::debug!(booking_id = change.booking_id(), "store change, reloading live query");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "live query lagged behind store changes, reloading");
                    }
                    Err(RecvError::Closed) => break,
                }

                if tx.is_closed() {
                    break;
                }
                refresh(store.as_ref(), &task_query, &tx).await;
            }
        });

        Self {
            query,
            state: rx,
            task,
        }
    }

    /// Tears this subscription down and starts one for `query`. The same query keeps
    /// the running subscription.
    pub fn requery(self, store: Arc<dyn BookingStore>, query: BookingQuery) -> Self {
        if self.query == query {
            return self;
        }
        drop(self);
        Self::subscribe(store, query)
    }

    pub fn query(&self) -> &BookingQuery {
        &self.query
    }

    pub fn current(&self) -> QueryState {
        self.state.borrow().clone()
    }

    /// Waits for the next published state. Returns `None` once the subscription task
    /// has stopped.
    pub async fn changed(&mut self) -> Option<QueryState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Waits until the first snapshot (or first error) has been published.
    pub async fn settled(&mut self) -> QueryState {
        loop {
            let state = self.state.borrow_and_update().clone();
            if !state.loading {
                return state;
            }
            if self.state.changed().await.is_err() {
                return self.current();
            }
        }
    }

    /// Stream of states, starting with the current one. The subscription lives as
    /// long as the stream.
    pub fn into_stream(self) -> SnapshotStream {
        SnapshotStream {
            inner: WatchStream::new(self.state.clone()),
            _live: self,
        }
    }
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn refresh(store: &dyn BookingStore, query: &BookingQuery, tx: &watch::Sender<QueryState>) {
    match store.query(query).await {
        Ok(bookings) => {
            tx.send_modify(|state| {
                state.data = Some(bookings);
                state.loading = false;
                state.error = None;
            });
        }
        Err(e) => {
            tracing::error!(error = %e, "live query reload failed");
            // Keep the last good data so consumers don't flash empty
            tx.send_modify(|state| {
                state.loading = false;
                state.error = Some(e.to_string());
            });
        }
    }
}

pub struct SnapshotStream {
    inner: WatchStream<QueryState>,
    _live: LiveQuery,
}

impl Stream for SnapshotStream {
    type Item = QueryState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
