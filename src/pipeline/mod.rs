//! Pipeline entry points for digest operations.
//!
//! - `run_digest`: Fetch, aggregate, render and deliver one digest

pub mod digest;

pub use digest::{RunOptions, RunSummary, execute, run_digest};
