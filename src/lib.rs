// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod alerts;
pub mod api;
pub mod feeds;
pub mod filter;
pub mod history;
pub mod metrics;
pub mod stats;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::feeds::types::SeismicEvent;
pub use crate::feeds::{dedup_and_sort, fetch_all};
