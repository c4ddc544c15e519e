use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::BookingStore;
use crate::services::auth::{AuthContext, IdentityProvider};
use crate::services::lifecycle::BookingController;

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn BookingStore>,
    pub bookings: BookingController,
    pub identity: Box<dyn IdentityProvider>,
    pub auth: AuthContext,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn BookingStore>,
        identity: Box<dyn IdentityProvider>,
        auth: AuthContext,
    ) -> Self {
        let bookings = BookingController::new(store.clone(), config.bill_policy, config.status_policy);
        Self {
            config,
            store,
            bookings,
            identity,
            auth,
        }
    }
}
