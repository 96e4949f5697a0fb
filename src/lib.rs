#![deny(missing_docs)]

//! A fixed-size worker-thread pool with blocking result handles.
//!
//! Jobs submitted to a [`ThreadPool`] are queued first-in first-out and
//! executed by a fixed set of long-lived worker threads.
//! [`ThreadPool::submit`] returns a [`JobHandle`] that resolves to the
//! job's return value (or to the panic it died with), while
//! [`ThreadPool::spawn`] queues fire-and-forget work. Shutting the pool
//! down drains every accepted job and joins the workers, so no pool
//! thread ever outlives the pool value.
//!
//! The pool guarantees exactly-once execution and FIFO dequeue order.
//! It does not synchronize caller-owned state shared between jobs, and
//! [`ThreadPool::is_busy`] is a coarse progress hint rather than a
//! completion barrier: the queue can be empty while a job is still
//! running on a worker.
//!
//! ```
//! use workpool::ThreadPool;
//!
//! let mut pool = ThreadPool::new(4).unwrap();
//! let sum = pool.submit(|| 2 + 3).unwrap();
//! assert_eq!(sum.wait().unwrap(), 5);
//! pool.shutdown();
//! ```

mod error;
mod handle;
mod pool;
mod queue;

pub use error::{PoolError, Result};
pub use handle::{result_channel, JobHandle, Promise};
pub use pool::ThreadPool;
pub use queue::{Job, JobQueue};
