//! HTTP API handlers for coinlens-api

pub mod coins;
pub mod health;
pub mod logging;

pub use coins::coin_routes;
pub use health::health_routes;
pub use logging::log_requests;
