//! Dispatch-overhead benchmark.
//!
//! Pushes timed sleeps through the stream path instead of real kernels, so
//! the gap between ideal and measured wall-clock time is pure submission and
//! completion overhead.

use std::time::Instant;

use colored::Colorize;
use crossbeam::channel;
use matprof_core::{MatprofError, Result};
use matprof_runtime as matprof;
use matprof_runtime::Target;

use crate::Scheduler;

pub fn execute(count: usize, microseconds: u64, streams: usize, scheduler: Scheduler) -> Result<()> {
    if streams == 0 {
        return Err(MatprofError::backend("stream count must be at least 1"));
    }
    matprof::initialize()?;
    let result = run(count, microseconds, streams, scheduler);
    matprof::finalize()?;
    result
}

fn run(count: usize, microseconds: u64, streams: usize, scheduler: Scheduler) -> Result<()> {
    // Warm up: first touch of each stream pays thread wake-up costs.
    for s in 0..streams {
        matprof::sleep_us(100, Target::stream(s))?;
    }

    let start = Instant::now();
    match scheduler {
        Scheduler::Dynamic => run_dynamic(count, microseconds, streams)?,
        Scheduler::Static => run_static(count, microseconds, streams)?,
    }
    let elapsed = start.elapsed().as_secs_f64();

    let expected = count as f64 * microseconds as f64 / 1e6 / streams as f64;
    let efficiency = expected / elapsed * 100.0;

    println!(
        "Completed {} sleep tasks ({}us each) with {} streams in {} seconds",
        count.to_string().bright_white(),
        microseconds,
        streams,
        format!("{elapsed:.3}").bright_white()
    );
    println!("Expected time (ideal): {expected:.3}s");
    println!("Parallel efficiency: {}", format!("{efficiency:.1}%").green());
    Ok(())
}

fn run_dynamic(count: usize, microseconds: u64, streams: usize) -> Result<()> {
    let (task_tx, task_rx) = channel::unbounded::<usize>();
    for s in (0..count).map(|i| i % streams) {
        task_tx.send(s).expect("task queue closed early");
    }
    drop(task_tx);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..streams)
            .map(|_| {
                let task_rx = task_rx.clone();
                scope.spawn(move || -> Result<()> {
                    while let Ok(stream) = task_rx.recv() {
                        matprof::sleep_us(microseconds, Target::stream(stream))?;
                    }
                    Ok(())
                })
            })
            .collect();
        handles
            .into_iter()
            .try_for_each(|h| h.join().expect("worker thread panicked"))
    })
}

fn run_static(count: usize, microseconds: u64, streams: usize) -> Result<()> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..streams)
            .map(|stream| {
                let tasks = count / streams + usize::from(stream < count % streams);
                scope.spawn(move || -> Result<()> {
                    for _ in 0..tasks {
                        matprof::sleep_us(microseconds, Target::stream(stream))?;
                    }
                    Ok(())
                })
            })
            .collect();
        handles
            .into_iter()
            .try_for_each(|h| h.join().expect("worker thread panicked"))
    })
}
