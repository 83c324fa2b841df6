//! Matrix-profile throughput benchmark.
//!
//! Spawns one worker thread per (device, stream) pair and pushes `count`
//! self-joins through them, either from a shared queue (dynamic) or with a
//! fixed round-robin split (static). Reports wall-clock throughput after a
//! warm-up pass over every worker.

use std::time::Instant;

use colored::Colorize;
use crossbeam::channel;
use matprof_core::{MatrixProfile, Result};
use matprof_runtime as matprof;
use matprof_runtime::{JoinOptions, StubBackend, Target};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::{resolve_topology, worker_placement};
use crate::Scheduler;

/// Parameters of one join benchmark run.
pub struct JoinBench {
    pub count: usize,
    pub length: usize,
    pub window: usize,
    pub devices: Option<usize>,
    pub streams: Option<usize>,
    pub normalize: bool,
    pub scheduler: Scheduler,
    pub stub_devices: Option<usize>,
}

pub fn execute(bench: JoinBench) -> Result<()> {
    println!(
        "Generating {} time series of length {}...",
        bench.count.to_string().bright_white(),
        bench.length.to_string().bright_white()
    );
    let mut rng = StdRng::seed_from_u64(42);
    let series: Vec<Vec<f64>> = (0..bench.count)
        .map(|_| (0..bench.length).map(|_| rng.gen::<f64>()).collect())
        .collect();

    match bench.stub_devices {
        Some(d) => {
            let streams = bench.streams.unwrap_or(4);
            matprof::initialize_with(&StubBackend::new(d, streams), 0, None)?
        }
        None => matprof::initialize()?,
    }

    let result = run(&bench, &series);
    matprof::finalize()?;
    result
}

fn run(bench: &JoinBench, series: &[Vec<f64>]) -> Result<()> {
    let (num_devices, num_streams) = resolve_topology(bench.devices, bench.streams)?;
    let workers = num_devices * num_streams;

    if series.is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }

    // Warm up every (device, stream) pair so thread and pool setup costs
    // stay out of the timed section.
    for d in 0..num_devices {
        matprof::use_device(d)?;
        for s in 0..num_streams {
            run_join(&series[0], bench, s)?;
        }
    }
    matprof::use_device(0)?;

    println!(
        "Computing matrix profiles with {} device(s) x {} stream(s) = {} workers ({})...",
        num_devices,
        num_streams,
        workers.to_string().bright_white(),
        format!("{:?}", bench.scheduler).to_lowercase()
    );

    let start = Instant::now();
    let results = match bench.scheduler {
        Scheduler::Dynamic => run_dynamic(bench, series, num_devices, workers)?,
        Scheduler::Static => run_static(bench, series, num_devices, workers)?,
    };
    let elapsed = start.elapsed().as_secs_f64();

    let computed = results.iter().filter(|r| !r.is_empty()).count();
    info!(computed, "all workers joined");

    println!(
        "Completed {} matrix profiles in {} seconds",
        computed.to_string().bright_white(),
        format!("{elapsed:.3}").bright_white()
    );
    println!(
        "Throughput: {} profiles/sec",
        format!("{:.2}", bench.count as f64 / elapsed).green()
    );
    println!(
        "Average time per profile: {} ms",
        format!("{:.3}", elapsed / bench.count as f64 * 1000.0).green()
    );
    Ok(())
}

fn run_join(t: &[f64], bench: &JoinBench, stream: usize) -> Result<MatrixProfile> {
    let opts = JoinOptions {
        target: Target::stream(stream),
        normalize: bench.normalize,
    };
    matprof::selfjoin(t, bench.window, opts)
}

/// Workers pull task indices from a shared queue until it is empty.
fn run_dynamic(
    bench: &JoinBench,
    series: &[Vec<f64>],
    num_devices: usize,
    workers: usize,
) -> Result<Vec<MatrixProfile>> {
    let (task_tx, task_rx) = channel::unbounded::<usize>();
    for idx in 0..series.len() {
        task_tx.send(idx).expect("task queue closed early");
    }
    drop(task_tx);

    let batches: Vec<Batch> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let task_rx = task_rx.clone();
                scope.spawn(move || -> Batch {
                    let (device, stream) = worker_placement(worker, num_devices);
                    matprof::use_device(device)?;
                    let mut done = Vec::new();
                    while let Ok(idx) = task_rx.recv() {
                        done.push((idx, run_join(&series[idx], bench, stream)?));
                    }
                    Ok(done)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker thread panicked"))
            .collect()
    });

    merge_batches(series.len(), batches)
}

/// Worker `w` gets tasks `w, w + workers, w + 2*workers, ...`.
fn run_static(
    bench: &JoinBench,
    series: &[Vec<f64>],
    num_devices: usize,
    workers: usize,
) -> Result<Vec<MatrixProfile>> {
    let batches: Vec<Batch> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                scope.spawn(move || -> Batch {
                    let (device, stream) = worker_placement(worker, num_devices);
                    matprof::use_device(device)?;
                    let mut done = Vec::new();
                    for idx in (worker..series.len()).step_by(workers) {
                        done.push((idx, run_join(&series[idx], bench, stream)?));
                    }
                    Ok(done)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker thread panicked"))
            .collect()
    });

    merge_batches(series.len(), batches)
}

type Batch = Result<Vec<(usize, MatrixProfile)>>;

/// Scatter the per-worker `(index, profile)` batches back into task order.
fn merge_batches(count: usize, batches: Vec<Batch>) -> Result<Vec<MatrixProfile>> {
    let mut results: Vec<MatrixProfile> = (0..count).map(|_| MatrixProfile::undefined(0)).collect();
    for batch in batches {
        for (idx, mp) in batch? {
            results[idx] = mp;
        }
    }
    Ok(results)
}
