use std::process::exit;
use std::sync::{Arc, Mutex};
use std::thread;

use clap::Parser;
use log::{error, info};

use workpool::{Result, ThreadPool};

#[derive(Parser)]
#[command(name = "workpool-counter", version, about = "Shared-counter demo for the worker pool")]
struct Cli {
    /// Number of increment jobs to queue
    #[arg(long, default_value_t = 10, value_name = "COUNT")]
    jobs: u64,

    /// Number of worker threads (default: one per CPU)
    #[arg(long, value_name = "THREADS")]
    threads: Option<u32>,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let threads = cli.threads.unwrap_or_else(|| num_cpus::get() as u32);
    let mut pool = ThreadPool::new(threads)?;

    info!("workpool-counter {}", env!("CARGO_PKG_VERSION"));
    info!("Queueing {} increment jobs on {} workers", cli.jobs, threads);

    // The pool runs each job exactly once; the mutex is the caller's
    // own synchronization for the shared sum.
    let counter = Arc::new(Mutex::new(0u64));
    for _ in 0..cli.jobs {
        let counter = Arc::clone(&counter);
        pool.spawn(move || {
            *counter.lock().expect("counter lock poisoned") += 1;
        })?;
    }

    // Coarse progress signal only; completion is guaranteed by the
    // draining shutdown below, not by this poll.
    while pool.is_busy() {
        thread::yield_now();
    }
    pool.shutdown();

    let total = *counter.lock().expect("counter lock poisoned");
    println!("{}", total);
    Ok(())
}
