//! HTTP surface for the screenhook webhook receiver.
//!
//! Exposes the single webhook ingestion endpoint plus liveness and
//! readiness probes, wired over the core normalization and persistence
//! pipeline.

#![forbid(unsafe_code)]

pub mod config;
pub mod handlers;
pub mod server;

pub use config::Config;
use screenhook_core::DbConfig;
pub use server::{create_router, start_server};

/// Shared handler state.
///
/// Holds only the database credentials handed to the gateway; every
/// request opens and owns its own connection, so there is nothing else
/// to share.
#[derive(Clone)]
pub struct AppState {
    /// Connection settings for the per-request gateway.
    pub db: DbConfig,
}
