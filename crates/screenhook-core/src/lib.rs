//! Canonical event model and persistence gateway.
//!
//! Normalizes heterogeneous webhook payloads from the video-publishing
//! platform into a fixed 14-field analytics record and persists each
//! record as one row over a single-request database connection. The HTTP
//! crate depends on these types for the whole receive-and-store pipeline.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod storage;

pub use error::{PersistError, Result};
pub use event::{CanonicalEvent, EventKind};
pub use storage::DbConfig;
