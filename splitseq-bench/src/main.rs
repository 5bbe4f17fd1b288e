//! Demo and benchmark runner for splittable sequences

use anyhow::Result;
use splitseq_adapters::{
    fixed_batches, partition_by, resource_sequence, result_stream, source_sequence, term_docs,
    tokenize, zip, MemoryDocumentStore, MemoryPostings, RandomIntSource, Row, VecCursor,
    VecSource,
};
use splitseq_bench::{compare_traversals, BenchConfig};
use splitseq_core::{PullSequence, PullSource, Splittable};
use splitseq_parallel::{Driver, DriverConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    println!("=== Splittable Sequence Demo ===");

    sum_random_ints()?;
    regex_tokens()?;
    chunks_groups_and_zips()?;
    cursor_rows()?;
    documents_for_term()?;

    println!("\n=== Traversal Comparison ===");
    let config = BenchConfig {
        iterations: 5,
        warmup_iterations: 1,
        ..BenchConfig::default()
    };
    for result in compare_traversals(&config)? {
        println!("\nTraversal: {}", result.name);
        println!("  Total time:   {:?}", result.total_time);
        println!("  Average time: {:?}", result.avg_time);
        println!("  Min time:     {:?}", result.min_time);
        println!("  Max time:     {:?}", result.max_time);
        println!("  Throughput:   {:.2} items/sec", result.throughput);
    }

    Ok(())
}

/// The same random stream summed three ways
fn sum_random_ints() -> Result<()> {
    let source = RandomIntSource::new();
    info!(len = source.len(), "generated random ints");

    let mut plain = source.clone();
    let mut loop_sum = 0i64;
    while plain.has_next()? {
        loop_sum += i64::from(plain.next()?);
    }

    let sequential = Driver::new(DriverConfig::sequential())?;
    let mut sequential_sum = 0i64;
    sequential.for_each_sequential(&mut source_sequence(source.clone(), 100)?, |x| {
        sequential_sum += i64::from(x);
    })?;

    let parallel = Driver::new(DriverConfig::default())?;
    let mut seq = source_sequence(source, 100)?;
    let (parallel_sum, stats) = parallel.map_collect(&mut seq, i64::from)?;
    let parallel_sum: i64 = parallel_sum.into_iter().sum();

    println!("\nSum via loop:       {loop_sum}");
    println!("Sum via sequential: {sequential_sum}");
    println!(
        "Sum via parallel:   {parallel_sum} ({} batches, {:.0} items/sec)",
        stats.batches,
        stats.items_per_sec()
    );
    Ok(())
}

fn regex_tokens() -> Result<()> {
    let mut tokens = tokenize(r"\w", "Inge-mark", 4)?;
    let mut out = Vec::new();
    tokens.for_each_remaining(&mut |token| out.push(token))?;
    println!("\nTokens of \"Inge-mark\": {out:?}");
    Ok(())
}

fn chunks_groups_and_zips() -> Result<()> {
    let source = PullSequence::new(VecSource::new((0..205).collect::<Vec<i32>>()));
    let mut chunks = fixed_batches(source, 64)?;
    let mut lengths = Vec::new();
    chunks.for_each_remaining(&mut |chunk| lengths.push(chunk.len()))?;
    println!("\nChunk lengths: {lengths:?}");

    let inner = source_sequence(VecSource::new(vec![2, 4, 1, 3, 5, 6, 8]), 64)?;
    let mut groups = partition_by(inner, |x: &i32| x % 2 == 0, 16)?;
    let mut parity_runs = Vec::new();
    groups.for_each_remaining(&mut |group| parity_runs.push(group))?;
    println!("Parity runs: {parity_runs:?}");

    let numbers = source_sequence(VecSource::new((1..=30).collect::<Vec<u32>>()), 64)?;
    let letters = source_sequence(VecSource::new(('A'..='Z').collect()), 64)?;
    let mut pairs = zip(numbers, letters);
    let mut zipped = Vec::new();
    pairs.for_each_remaining(&mut |pair| zipped.push(pair))?;
    println!(
        "Zipped {} pairs, last {:?}",
        zipped.len(),
        zipped.last().copied()
    );
    Ok(())
}

fn cursor_rows() -> Result<()> {
    let cursor = VecCursor::new(vec![
        vec!["1".to_owned(), "alpha".to_owned()],
        vec!["2".to_owned(), "beta".to_owned()],
        vec!["3".to_owned(), "gamma".to_owned()],
    ]);
    let releases = cursor.release_counter();

    let stream = result_stream(resource_sequence(cursor, 2)?);
    let first = stream
        .take(2)
        .map(|row| row.map(Row::into_fields))
        .collect::<splitseq_core::Result<Vec<_>>>()?;
    println!(
        "\nFirst rows: {first:?}, cursor released {} time(s)",
        releases.load(std::sync::atomic::Ordering::SeqCst)
    );
    Ok(())
}

fn documents_for_term() -> Result<()> {
    let mut store = MemoryDocumentStore::new();
    let dune = store.add([("title", "Dune"), ("body", "spice and sand")]);
    store.add([("title", "Solaris"), ("body", "an ocean planet")]);
    let ubik = store.add([("title", "Ubik"), ("body", "spray can")]);

    let mut docs = term_docs(MemoryPostings::new(vec![ubik, dune]), &store, ["title"]);
    let mut titles = Vec::new();
    docs.for_each_remaining(&mut |doc| titles.extend(doc.into_values()))?;
    println!("Documents for term: {titles:?}");
    Ok(())
}
