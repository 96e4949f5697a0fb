use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use log::{error, info};
use rand::prelude::*;

use workpool::{PoolError, Result, ThreadPool};

/// Dense square matrix in row-major order.
type Matrix = Vec<Vec<i64>>;

#[derive(Parser)]
#[command(name = "workpool-matrix", version, about = "Matrix-multiplication demo for the worker pool")]
struct Cli {
    /// Dimension of the two square matrices
    #[arg(long, default_value_t = 3, value_name = "N")]
    size: usize,

    /// Number of worker threads (default: one per CPU)
    #[arg(long, value_name = "THREADS")]
    threads: Option<u32>,

    /// Also multiply sequentially and verify the pooled result
    #[arg(long)]
    check: bool,
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

    let n = cli.size;
    info!("workpool-matrix {}", env!("CARGO_PKG_VERSION"));
    info!("Multiplying two {n}x{n} matrices on {threads} workers");

    let mut rng = thread_rng();
    let lhs = build_matrix(n, &mut rng);
    let rhs = build_matrix(n, &mut rng);

    if n <= 8 {
        print_matrix(&lhs);
        println!();
        print_matrix(&rhs);
        println!();
    }

    let start = Instant::now();
    let product = multiply_on_pool(&pool, &lhs, &rhs)?;
    let pooled = start.elapsed();

    if n <= 8 {
        print_matrix(&product);
    }
    println!("pooled: {:?}", pooled);

    if cli.check {
        let start = Instant::now();
        let expected = multiply_sequential(&lhs, &rhs);
        let sequential = start.elapsed();
        println!("sequential: {:?}", sequential);

        if product != expected {
            return Err(PoolError::StringError(
                "pooled product differs from sequential product".to_owned(),
            ));
        }
        println!("results match");
    }

    pool.shutdown();
    Ok(())
}

/// Builds an `n` by `n` matrix of small random values.
fn build_matrix(n: usize, rng: &mut impl Rng) -> Matrix {
    (0..n)
        .map(|_| (0..n).map(|_| rng.gen_range(0..10)).collect())
        .collect()
}

/// Transposes a square matrix in place.
fn transpose(matrix: &mut Matrix) {
    let n = matrix.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let tmp = matrix[i][j];
            matrix[i][j] = matrix[j][i];
            matrix[j][i] = tmp;
        }
    }
}

fn dot(a: &[i64], b: &[i64]) -> i64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Multiplies `lhs * rhs` with one pool job per output row. The row
/// handles come back in submission order, so collecting them rebuilds
/// the product in place.
fn multiply_on_pool(pool: &ThreadPool, lhs: &Matrix, rhs: &Matrix) -> Result<Matrix> {
    // Transpose once up front so every job reads contiguous rows.
    let mut rhs_t = rhs.clone();
    transpose(&mut rhs_t);
    let rhs_t = Arc::new(rhs_t);

    let mut handles = Vec::with_capacity(lhs.len());
    for row in lhs {
        let row = row.clone();
        let rhs_t = Arc::clone(&rhs_t);
        handles.push(pool.submit(move || {
            rhs_t
                .iter()
                .map(|col| dot(&row, col))
                .collect::<Vec<i64>>()
        })?);
    }

    handles.into_iter().map(|handle| handle.wait()).collect()
}

fn multiply_sequential(lhs: &Matrix, rhs: &Matrix) -> Matrix {
    let mut rhs_t = rhs.clone();
    transpose(&mut rhs_t);
    lhs.iter()
        .map(|row| rhs_t.iter().map(|col| dot(row, col)).collect())
        .collect()
}

fn print_matrix(matrix: &Matrix) {
    for row in matrix {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", cells.join(" "));
    }
}
