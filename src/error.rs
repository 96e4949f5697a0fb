use std::io;
use thiserror::Error;

/// Error type for thread pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// IO error from spawning a worker thread.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A pool was requested with zero worker threads.
    #[error("thread pool requires at least one worker thread")]
    NoThreads,

    /// A job panicked while executing. Holds the rendered panic message.
    #[error("job panicked: {0}")]
    JobPanicked(String),

    /// The pool has been shut down and no longer accepts jobs.
    #[error("thread pool is stopped")]
    Stopped,

    /// Error with a string message.
    #[error("{0}")]
    StringError(String),
}

/// Result type alias for thread pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
