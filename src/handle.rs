//! Write-once result channels connecting workers to submitters.

use std::sync::{Arc, Condvar, Mutex};

use crate::{PoolError, Result};

/// Creates a connected [`Promise`]/[`JobHandle`] pair for one job's
/// outcome.
///
/// The promise side is completed exactly once by whoever runs the job;
/// the handle side blocks or polls for the outcome. [`ThreadPool::submit`]
/// wires one of these up per job, but the pair also works standalone.
///
/// [`ThreadPool::submit`]: crate::ThreadPool::submit
pub fn result_channel<T>() -> (Promise<T>, JobHandle<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(None),
        ready: Condvar::new(),
    });
    (
        Promise {
            shared: Some(Arc::clone(&shared)),
        },
        JobHandle { shared },
    )
}

/// The slot holds `None` until the producer stores the job's outcome.
struct Shared<T> {
    slot: Mutex<Option<Result<T>>>,
    ready: Condvar,
}

/// The producing half of a result channel.
///
/// Completing consumes the promise, so a second resolution is a compile
/// error rather than a runtime one. Dropping a promise that was never
/// completed rejects the channel with [`PoolError::Stopped`] so waiters
/// are released instead of blocking forever.
pub struct Promise<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Promise<T> {
    /// Completes the channel with a value and wakes all waiters.
    pub fn fulfill(self, value: T) {
        self.complete(Ok(value));
    }

    /// Completes the channel with an error and wakes all waiters.
    pub fn reject(self, error: PoolError) {
        self.complete(Err(error));
    }

    fn complete(mut self, outcome: Result<T>) {
        let shared = self.shared.take().expect("promise completed twice");
        let mut slot = shared.slot.lock().expect("result lock poisoned");
        debug_assert!(slot.is_none(), "job outcome delivered twice");
        *slot = Some(outcome);
        drop(slot);
        shared.ready.notify_all();
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        // Still armed here means no outcome was ever delivered: reject
        // so a waiter is released rather than parked forever.
        if let Some(shared) = self.shared.take() {
            let mut slot = shared.slot.lock().expect("result lock poisoned");
            *slot = Some(Err(PoolError::Stopped));
            drop(slot);
            shared.ready.notify_all();
        }
    }
}

/// The consuming half of a result channel: a handle to one job's
/// eventual value or error.
///
/// Waiting consumes the handle, mirroring `std::thread::JoinHandle`;
/// use [`JobHandle::is_complete`] to observe readiness without giving
/// the handle up.
pub struct JobHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> JobHandle<T> {
    /// Blocks the calling thread until the job's outcome is available,
    /// then returns it.
    ///
    /// Returns immediately if the outcome is already stored. The thread
    /// is parked on a condition variable while waiting; it does not
    /// spin.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::JobPanicked`] if the job panicked, or
    /// [`PoolError::Stopped`] if the job was abandoned before running.
    pub fn wait(self) -> Result<T> {
        let mut slot = self.shared.slot.lock().expect("result lock poisoned");
        loop {
            if let Some(outcome) = slot.take() {
                return outcome;
            }
            slot = self.shared.ready.wait(slot).expect("result lock poisoned");
        }
    }

    /// Non-blocking variant of [`JobHandle::wait`]: returns the outcome
    /// if the job has finished, or hands the handle back if it has not.
    pub fn try_wait(self) -> std::result::Result<Result<T>, Self> {
        let mut slot = self.shared.slot.lock().expect("result lock poisoned");
        match slot.take() {
            Some(outcome) => {
                drop(slot);
                Ok(outcome)
            }
            None => {
                drop(slot);
                Err(self)
            }
        }
    }

    /// Whether the job's outcome has been stored yet.
    pub fn is_complete(&self) -> bool {
        self.shared
            .slot
            .lock()
            .expect("result lock poisoned")
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn fulfilled_before_wait() {
        let (promise, handle) = result_channel();
        promise.fulfill(42);
        assert_eq!(handle.wait().unwrap(), 42);
    }

    #[test]
    fn wait_blocks_until_fulfilled() {
        let (promise, handle) = result_channel();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            promise.fulfill("done");
        });

        assert_eq!(handle.wait().unwrap(), "done");
        producer.join().unwrap();
    }

    #[test]
    fn rejection_surfaces_the_error() {
        let (promise, handle) = result_channel::<u32>();
        promise.reject(PoolError::JobPanicked("boom".to_owned()));

        match handle.wait() {
            Err(PoolError::JobPanicked(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn try_wait_returns_handle_while_pending() {
        let (promise, handle) = result_channel();
        let handle = match handle.try_wait() {
            Err(handle) => handle,
            Ok(_) => panic!("channel resolved before fulfill"),
        };

        promise.fulfill(7);
        match handle.try_wait() {
            Ok(outcome) => assert_eq!(outcome.unwrap(), 7),
            Err(_) => panic!("channel still pending after fulfill"),
        }
    }

    #[test]
    fn is_complete_flips_on_fulfill() {
        let (promise, handle) = result_channel();
        assert!(!handle.is_complete());
        promise.fulfill(());
        assert!(handle.is_complete());
    }

    #[test]
    fn dropped_promise_rejects_the_channel() {
        let (promise, handle) = result_channel::<u32>();
        drop(promise);
        assert!(matches!(handle.wait(), Err(PoolError::Stopped)));
    }
}
