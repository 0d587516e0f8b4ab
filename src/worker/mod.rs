//! Worker pool for parallel vanity address search.
//!
//! This module provides:
//! - A single-stream [`Searcher`] that can be stepped deterministically
//! - Multi-threaded CPU workers, each owning its own candidate stream
//! - Progress tracking and result delivery to a single reporting thread

mod cpu;
mod pool;

pub use cpu::{CpuWorker, Searcher, WorkerStats, SEARCH_PROGRESS_INTERVAL};
pub use pool::{VanityResult, WorkerEvent, WorkerPool};
