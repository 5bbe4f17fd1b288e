//! Traversal of splittable sequences on a worker pool
//!
//! Fetching always happens on the calling thread: the driver splits batches
//! off the sequence one after another and hands each batch to a worker. Only
//! the processing of fetched batches runs in parallel, and per-batch results
//! are put back into batch order before they are combined.
//!
//! Fetching runs at most [`DriverConfig::max_in_flight`] batches ahead of the
//! workers, so a long source with slow processing is never fully buffered.

use std::iter::Sum;
use std::time::Instant;

use crossbeam::channel;
use rayon::{ThreadPool, ThreadPoolBuilder};
use splitseq_core::{Batch, Error, Result, Sink, Splittable};
use tracing::{debug, info};

use crate::config::DriverConfig;
use crate::stats::DriveStats;

/// Drives splittable sequences, sequentially or on a dedicated thread pool
#[derive(Debug)]
pub struct Driver {
    config: DriverConfig,
    pool: ThreadPool,
}

impl Driver {
    /// Build a driver and its worker pool
    pub fn new(config: DriverConfig) -> Result<Self> {
        config.validate()?;
        let prefix = config.thread_name_prefix.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(move |index| format!("{prefix}-{index}"))
            .build()
            .map_err(|e| Error::Driver(format!("Failed to build worker pool: {e}")))?;
        Ok(Self { config, pool })
    }

    /// The configuration this driver was built with
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Number of threads in the worker pool
    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Visit every element on the calling thread, one `try_advance` at a time
    pub fn for_each_sequential<S, F>(&self, seq: &mut S, mut f: F) -> Result<DriveStats>
    where
        S: Splittable,
        F: FnMut(S::Item),
    {
        let start = Instant::now();
        let mut items = 0u64;
        seq.for_each_remaining(&mut |item| {
            items += 1;
            f(item);
        })?;

        let stats = DriveStats {
            items,
            batches: 0,
            elapsed: start.elapsed(),
            parallel: false,
        };
        finished(&stats);
        Ok(stats)
    }

    /// Visit every element, processing batches on the worker pool.
    ///
    /// Elements of different batches are visited concurrently and in no
    /// particular order.
    pub fn for_each<S, F>(&self, seq: &mut S, f: F) -> Result<DriveStats>
    where
        S: Splittable,
        S::Item: Send,
        F: Fn(S::Item) + Sync,
    {
        let (_, stats) = self.map_batches(seq, |batch| batch.into_iter().for_each(&f))?;
        Ok(stats)
    }

    /// Fold every batch from `identity` with `fold`, then combine the batch
    /// results in encounter order with `combine`
    pub fn reduce<S, T, I, F, C>(
        &self,
        seq: &mut S,
        identity: I,
        fold: F,
        combine: C,
    ) -> Result<(T, DriveStats)>
    where
        S: Splittable,
        S::Item: Send,
        T: Send,
        I: Fn() -> T + Sync,
        F: Fn(T, S::Item) -> T + Sync,
        C: FnMut(T, T) -> T,
    {
        let (partials, stats) =
            self.map_batches(seq, |batch| batch.into_iter().fold(identity(), &fold))?;
        Ok((partials.into_iter().fold(identity(), combine), stats))
    }

    /// Collect every element in encounter order
    pub fn collect<S>(&self, seq: &mut S) -> Result<(Vec<S::Item>, DriveStats)>
    where
        S: Splittable,
        S::Item: Send,
    {
        self.map_collect(seq, |item| item)
    }

    /// Map every element on the worker pool and collect the results in
    /// encounter order
    pub fn map_collect<S, R, F>(&self, seq: &mut S, f: F) -> Result<(Vec<R>, DriveStats)>
    where
        S: Splittable,
        S::Item: Send,
        R: Send,
        F: Fn(S::Item) -> R + Sync,
    {
        let (chunks, stats) =
            self.map_batches(seq, |batch| batch.into_iter().map(&f).collect::<Vec<R>>())?;
        let mut out = Vec::with_capacity(usize::try_from(stats.items).unwrap_or(0));
        for chunk in chunks {
            out.extend(chunk);
        }
        Ok((out, stats))
    }

    /// Sum every element
    pub fn sum<S>(&self, seq: &mut S) -> Result<(S::Item, DriveStats)>
    where
        S: Splittable,
        S::Item: Send + Sum,
    {
        let (partials, stats) = self.map_batches(seq, |batch| batch.into_iter().sum::<S::Item>())?;
        Ok((partials.into_iter().sum(), stats))
    }

    /// Forward every batch to `sink` in encounter order, then flush it
    pub fn drain_into<S, K>(&self, seq: &mut S, sink: &mut K) -> Result<DriveStats>
    where
        S: Splittable,
        K: Sink<Item = S::Item>,
    {
        let start = Instant::now();
        let mut stats = DriveStats::default();
        while let Some(batch) = seq.split()? {
            stats.items += batch.len() as u64;
            stats.batches += 1;
            sink.consume(batch.into_vec())?;
        }
        sink.flush()?;

        stats.elapsed = start.elapsed();
        finished(&stats);
        Ok(stats)
    }

    /// Apply `f` to every batch split off `seq` and return the results in
    /// batch order.
    ///
    /// A failing split stops fetching; batches already handed out still run
    /// to completion before the error is returned.
    fn map_batches<S, R, F>(&self, seq: &mut S, f: F) -> Result<(Vec<R>, DriveStats)>
    where
        S: Splittable,
        S::Item: Send,
        R: Send,
        F: Fn(Batch<S::Item>) -> R + Sync,
    {
        let start = Instant::now();
        debug!(
            parallel = self.config.parallel,
            workers = self.worker_threads(),
            "driving sequence"
        );

        if !self.config.parallel {
            let mut stats = DriveStats::default();
            let mut results = Vec::new();
            while let Some(batch) = seq.split()? {
                stats.items += batch.len() as u64;
                stats.batches += 1;
                results.push(f(batch));
            }
            stats.elapsed = start.elapsed();
            finished(&stats);
            return Ok((results, stats));
        }

        let max_in_flight = self.config.max_in_flight();
        let (tx, rx) = channel::bounded(max_in_flight);
        let mut done: Vec<(usize, usize, R)> = Vec::new();
        let mut fetched = 0usize;
        let mut split_error = None;
        let f = &f;
        self.pool.in_place_scope(|scope| {
            loop {
                // Wait for a finished batch before fetching past the limit
                if fetched - done.len() >= max_in_flight {
                    match rx.recv() {
                        Ok(result) => done.push(result),
                        Err(_) => break,
                    }
                }
                match seq.split() {
                    Ok(Some(batch)) => {
                        let index = fetched;
                        fetched += 1;
                        let tx = tx.clone();
                        scope.spawn(move |_| {
                            let len = batch.len();
                            // The receiver is drained before the scope ends
                            let _ = tx.send((index, len, f(batch)));
                        });
                    }
                    Ok(None) => break,
                    Err(e) => {
                        split_error = Some(e);
                        break;
                    }
                }
            }
            drop(tx);
            // Collect inside the scope so no worker blocks on a full channel
            done.extend(rx.iter());
        });

        if let Some(e) = split_error {
            debug!(batches = fetched, error = %e, "traversal stopped by failed split");
            return Err(e);
        }

        if done.len() != fetched {
            return Err(Error::Driver(format!(
                "Expected {fetched} batch results, got {}",
                done.len()
            )));
        }
        done.sort_unstable_by_key(|(index, _, _)| *index);

        let mut stats = DriveStats {
            batches: fetched as u64,
            parallel: true,
            ..DriveStats::default()
        };
        let results = done
            .into_iter()
            .map(|(_, len, result)| {
                stats.items += len as u64;
                result
            })
            .collect();
        stats.elapsed = start.elapsed();
        finished(&stats);
        Ok((results, stats))
    }
}

fn finished(stats: &DriveStats) {
    info!(
        items = stats.items,
        batches = stats.batches,
        parallel = stats.parallel,
        elapsed_ms = stats.elapsed.as_millis(),
        "traversal finished"
    );
}
