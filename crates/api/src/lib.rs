//! `loanflow-api` — HTTP surface of the loan workflow backend.

pub mod app;
pub mod config;
pub mod middleware;
pub mod telemetry;
