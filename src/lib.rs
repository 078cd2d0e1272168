// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod cursor;
pub mod error;
pub mod feed;
pub mod filter;
pub mod geo;
pub mod metrics;
pub mod notify;
pub mod scheduler;
pub mod session;

// ---- Re-exports for stable public API ----
pub use crate::config::MonitorConfig;
pub use crate::cursor::FeedCursor;
pub use crate::error::FeedError;
pub use crate::filter::{CurrentEvent, EventFilter, FeedVariant, FilterCriteria};
pub use crate::notify::{EventNotification, NotifierMux};
pub use crate::session::{CycleOutcome, FeedSession};
