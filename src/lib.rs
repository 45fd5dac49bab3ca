pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;
pub mod users;
pub mod validation;
