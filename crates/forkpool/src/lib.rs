//! forkpool - fork-join execution of partitioned workloads
//!
//! A small worker pool tuned for the tiled matrix kernels in `matriz-cpu`:
//! a caller submits N independent partitions, the pool fans them out across
//! its threads and blocks until every partition has run. The calling thread
//! participates in the computation instead of sleeping, and idle threads
//! steal partitions from slower ones.
//!
//! There is no cancellation and no partial completion: `run` returns only
//! after the join barrier, which is the sole blocking point.
//!
//! # Example
//!
//! ```
//! use forkpool::ForkPool;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let pool = ForkPool::new(4);
//! let done = AtomicUsize::new(0);
//!
//! pool.run(64, |partition| {
//!     let _ = partition;
//!     done.fetch_add(1, Ordering::Relaxed);
//! });
//!
//! assert_eq!(done.load(Ordering::SeqCst), 64);
//! ```

mod pool;
mod slot;

pub use pool::ForkPool;
