pub mod analytics;
pub mod auth;
pub mod lifecycle;
pub mod live_query;
pub mod receipt;
