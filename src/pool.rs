use std::any::Any;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::handle::{result_channel, JobHandle};
use crate::queue::JobQueue;
use crate::{PoolError, Result};

/// A fixed-size pool of worker threads pulling from one shared queue.
///
/// Workers are spawned at construction and live until
/// [`ThreadPool::shutdown`] (or drop) closes the queue and joins them;
/// the pool never grows, shrinks, or restarts. Each submitted job runs
/// exactly once, and jobs are dequeued in submission order across all
/// submitters, though completion order depends on which worker finishes
/// first.
///
/// The pool does not synchronize caller-owned state touched by multiple
/// jobs; a counter shared between jobs, for example, needs the caller's
/// own lock or atomic.
pub struct ThreadPool {
    queue: Arc<JobQueue>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Creates a pool of `threads` workers, which start waiting for
    /// jobs immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NoThreads`] if `threads` is zero, and
    /// [`PoolError::Io`] if the operating system refuses to spawn a
    /// worker thread; in that case the workers that did start are
    /// joined before the error is returned, so a failed constructor
    /// leaks nothing.
    pub fn new(threads: u32) -> Result<Self> {
        if threads == 0 {
            return Err(PoolError::NoThreads);
        }

        let queue = Arc::new(JobQueue::new());
        let mut workers = Vec::with_capacity(threads as usize);

        for id in 0..threads {
            match spawn_worker(id, Arc::clone(&queue)) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    queue.close();
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(e.into());
                }
            }
        }

        Ok(ThreadPool { queue, workers })
    }

    /// Creates a pool with one worker per available CPU.
    pub fn with_default_threads() -> Result<Self> {
        Self::new(num_cpus::get() as u32)
    }

    /// Submits a job and returns a handle to its eventual outcome.
    ///
    /// The handle resolves to the job's return value, or to
    /// [`PoolError::JobPanicked`] carrying the panic message if the job
    /// dies. A `()`-returning job still gets a handle, useful to wait
    /// for completion. The call itself never blocks.
    ///
    /// A job that waits on the handle of a job queued behind it can
    /// deadlock a pool that has no spare worker; wait on handles from
    /// outside the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Stopped`] if the pool has been shut down.
    pub fn submit<F, T>(&self, job: F) -> Result<JobHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (promise, handle) = result_channel();
        self.queue.push(Box::new(move || {
            match catch_unwind(AssertUnwindSafe(job)) {
                Ok(value) => promise.fulfill(value),
                Err(payload) => {
                    promise.reject(PoolError::JobPanicked(panic_message(payload)))
                }
            }
        }))?;
        Ok(handle)
    }

    /// Submits a job whose outcome nobody observes.
    ///
    /// Like [`ThreadPool::submit`] without the handle: a panicking job
    /// is logged and discarded, and a caller that needs to know the job
    /// finished should use `submit` instead.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Stopped`] if the pool has been shut down.
    pub fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(Box::new(job))
    }

    /// Whether the queue currently holds jobs no worker has picked up.
    ///
    /// Best-effort liveness hint only: the queue can be empty while a
    /// job is still executing on a worker, and another submitter can
    /// push the instant after this returns `false`. Use
    /// [`ThreadPool::shutdown`] or [`JobHandle::wait`] to know work has
    /// finished.
    pub fn is_busy(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of worker threads the pool currently holds.
    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    /// Stops the pool: closes the queue, waits for every already
    /// accepted job to run, and joins every worker thread.
    ///
    /// When this returns, no worker spawned by the pool is still
    /// running. Submissions racing a shutdown cannot happen (this takes
    /// `&mut self`), and submissions attempted afterwards fail with
    /// [`PoolError::Stopped`]. Idempotent; dropping the pool calls it
    /// implicitly.
    pub fn shutdown(&mut self) {
        self.queue.close();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                // Job panics are caught inside the loop, so this is a
                // worker-loop bug, not a misbehaving job.
                error!("worker thread panicked during shutdown");
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns a single named worker thread running the dequeue-execute loop.
fn spawn_worker(id: u32, queue: Arc<JobQueue>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("pool-worker-{id}"))
        .spawn(move || run_worker(id, &queue))
}

/// Park in `pop_blocking`, run whatever comes out, repeat until the
/// queue reports closed. Panicking jobs are caught so the worker loop
/// continues.
fn run_worker(id: u32, queue: &JobQueue) {
    while let Some(job) = queue.pop_blocking() {
        debug!("Worker {id} executing job");
        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!("Worker {id} job panicked, continuing");
        }
    }
    debug!("Worker {id}: queue closed, shutting down");
}

/// Renders a panic payload into the message carried by
/// [`PoolError::JobPanicked`].
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_renders_common_payloads() {
        let boxed: Box<dyn Any + Send> = Box::new("literal");
        assert_eq!(panic_message(boxed), "literal");

        let boxed: Box<dyn Any + Send> = Box::new("formatted 7".to_string());
        assert_eq!(panic_message(boxed), "formatted 7");

        let boxed: Box<dyn Any + Send> = Box::new(17u8);
        assert_eq!(panic_message(boxed), "unknown panic payload");
    }

    #[test]
    fn zero_threads_is_rejected() {
        assert!(matches!(ThreadPool::new(0), Err(PoolError::NoThreads)));
    }
}
