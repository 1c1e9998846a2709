pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod metrics_handler;
pub mod observability;
pub mod reference;
pub mod routes;
pub mod state;
pub mod validation;
