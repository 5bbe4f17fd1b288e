//! Benchmarks for sequential and batch-parallel traversal

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use splitseq_adapters::{source_sequence, VecSource};
use splitseq_parallel::{Driver, DriverConfig};

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of measured iterations
    pub iterations: usize,

    /// Warmup iterations
    pub warmup_iterations: usize,

    /// Number of elements per traversal
    pub items: u64,

    /// Batch size used for splitting
    pub batch_size: usize,

    /// Number of threads for parallel benchmarks
    pub num_threads: usize,

    /// Rounds of simulated work per element
    pub work_rounds: u32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            warmup_iterations: 3,
            items: 100_000,
            batch_size: 1024,
            num_threads: 4,
            work_rounds: 200,
        }
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchResult {
    /// Name of the benchmark
    pub name: String,

    /// Total time taken
    pub total_time: Duration,

    /// Average time per iteration
    pub avg_time: Duration,

    /// Min time per iteration
    pub min_time: Duration,

    /// Max time per iteration
    pub max_time: Duration,

    /// Throughput (items/second)
    pub throughput: f64,
}

/// Run `func` repeatedly; it returns how many items one run processed
pub fn run_benchmark<F>(name: &str, config: &BenchConfig, mut func: F) -> Result<BenchResult>
where
    F: FnMut() -> Result<u64>,
{
    if config.iterations == 0 {
        bail!("benchmark {name} needs at least one iteration");
    }

    for _ in 0..config.warmup_iterations {
        func().with_context(|| format!("warmup of {name} failed"))?;
    }

    let mut times = Vec::with_capacity(config.iterations);
    let mut total_items = 0u64;
    let start_total = Instant::now();
    for _ in 0..config.iterations {
        let start = Instant::now();
        total_items += func().with_context(|| format!("iteration of {name} failed"))?;
        times.push(start.elapsed());
    }
    let total_time = start_total.elapsed();

    let iterations = u32::try_from(times.len()).context("too many iterations")?;
    let avg_time = times.iter().sum::<Duration>() / iterations;
    let min_time = times.iter().min().copied().unwrap_or_default();
    let max_time = times.iter().max().copied().unwrap_or_default();

    #[allow(clippy::cast_precision_loss)]
    let throughput = total_items as f64 / total_time.as_secs_f64().max(f64::MIN_POSITIVE);

    Ok(BenchResult {
        name: name.to_string(),
        total_time,
        avg_time,
        min_time,
        max_time,
        throughput,
    })
}

/// Deterministic busy work standing in for per-element processing
pub fn simulated_work(value: u64, rounds: u32) -> u64 {
    let mut x = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    for _ in 0..rounds {
        x ^= x >> 33;
        x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    }
    x
}

/// Sum the processed elements on the calling thread
pub fn bench_sequential(config: &BenchConfig) -> Result<BenchResult> {
    let driver = Driver::new(DriverConfig::sequential())?;
    run_benchmark("sequential", config, || {
        let source = VecSource::new((0..config.items).collect());
        let mut seq = source_sequence(source, config.batch_size)?;
        let mut checksum = 0u64;
        let stats = driver.for_each_sequential(&mut seq, |x| {
            checksum = checksum.wrapping_add(simulated_work(x, config.work_rounds));
        })?;
        std::hint::black_box(checksum);
        Ok(stats.items)
    })
}

/// Sum the processed elements with batches handed to a worker pool
pub fn bench_parallel(config: &BenchConfig) -> Result<BenchResult> {
    let driver = Driver::new(DriverConfig::with_workers(config.num_threads))?;
    let name = format!("parallel x{} (batch {})", config.num_threads, config.batch_size);
    run_benchmark(&name, config, || {
        let source = VecSource::new((0..config.items).collect());
        let mut seq = source_sequence(source, config.batch_size)?;
        let (checksum, stats) = driver.reduce(
            &mut seq,
            || 0u64,
            |acc: u64, x: u64| acc.wrapping_add(simulated_work(x, config.work_rounds)),
            u64::wrapping_add,
        )?;
        std::hint::black_box(checksum);
        Ok(stats.items)
    })
}

/// Run both traversals with the same configuration
pub fn compare_traversals(config: &BenchConfig) -> Result<Vec<BenchResult>> {
    Ok(vec![bench_sequential(config)?, bench_parallel(config)?])
}
