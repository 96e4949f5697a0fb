use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::{PoolError, Result};

/// A unit of work: an owned closure run exactly once by one worker.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A thread-safe FIFO queue of jobs shared by producers and workers.
///
/// Jobs come out in the order they went in, across all producers
/// combined. `pop_blocking` parks the calling thread until work
/// arrives, and a closed queue is always drained before any consumer
/// is told to stop.
pub struct JobQueue {
    inner: Mutex<Inner>,
    available: Condvar,
}

struct Inner {
    jobs: VecDeque<Job>,
    accepting: bool,
}

impl JobQueue {
    /// Creates an empty queue that accepts jobs.
    pub fn new() -> Self {
        JobQueue {
            inner: Mutex::new(Inner {
                jobs: VecDeque::new(),
                accepting: true,
            }),
            available: Condvar::new(),
        }
    }

    /// Appends a job to the tail and wakes one blocked consumer.
    ///
    /// Never blocks the caller. Fails with [`PoolError::Stopped`] once
    /// the queue has been closed.
    pub fn push(&self, job: Job) -> Result<()> {
        let mut inner = self.inner.lock().expect("job queue lock poisoned");
        if !inner.accepting {
            return Err(PoolError::Stopped);
        }
        inner.jobs.push_back(job);
        drop(inner);
        self.available.notify_one();
        Ok(())
    }

    /// Removes and returns the head job, blocking while the queue is
    /// empty but still open.
    ///
    /// Returns `None` only once the queue is closed *and* every
    /// previously pushed job has been popped, so no accepted work is
    /// ever dropped during shutdown.
    pub fn pop_blocking(&self) -> Option<Job> {
        let mut inner = self.inner.lock().expect("job queue lock poisoned");
        loop {
            if let Some(job) = inner.jobs.pop_front() {
                return Some(job);
            }
            if !inner.accepting {
                return None;
            }
            inner = self
                .available
                .wait(inner)
                .expect("job queue lock poisoned");
        }
    }

    /// Stops the queue accepting new jobs and wakes all blocked
    /// consumers. Idempotent.
    pub fn close(&self) {
        let mut inner = self.inner.lock().expect("job queue lock poisoned");
        inner.accepting = false;
        drop(inner);
        self.available.notify_all();
    }

    /// Whether the queue currently holds no jobs.
    ///
    /// A snapshot taken under the lock; by the time the caller looks at
    /// it, another thread may already have pushed or popped. Valid as a
    /// liveness hint only, not for synchronization.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of jobs currently queued. Snapshot semantics, as with
    /// [`JobQueue::is_empty`].
    pub fn len(&self) -> usize {
        self.inner.lock().expect("job queue lock poisoned").jobs.len()
    }
}
