//! Parallel matching pipeline
//!
//! Batches are matched by a fixed pool of worker threads in whatever order
//! they finish, and written in input order.
//!
//! # Module Structure
//!
//! - `types`: Batches, per-record results and configuration
//! - `worker`: Worker thread and the per-batch matching function
//! - `reorder`: Buffer restoring batch order
//! - `sink`: Result sink thread for ordered output
//! - `processor`: Main Coordinator orchestration

mod processor;
mod reorder;
mod sink;
mod types;
mod worker;

// Re-export public types
pub use processor::Coordinator;
pub use reorder::ReorderBuffer;
pub use sink::SinkSummary;
pub use types::{Batch, Match, ParallelConfig, RecordHits, ResultBatch, Span, Strand};
pub use worker::match_batch;
