pub mod clients;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod types;
