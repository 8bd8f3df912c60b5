//! HTTP request handlers.
//!
//! One ingestion handler for the webhook endpoint, plus health probes
//! for orchestration systems.

pub mod health;
pub mod ingest;

pub use health::{health_check, liveness_check, readiness_check};
pub use ingest::receive_event;
