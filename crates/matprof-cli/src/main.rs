//! matprof benchmark driver.
//!
//! # Commands
//!
//! - `matprof join` - Matrix-profile throughput benchmark across devices and
//!   streams
//! - `matprof sleep` - Dispatch-overhead benchmark using the sleep kernel
//!
//! # Examples
//!
//! ```bash
//! # 1000 self-joins of length-7200 series across all streams, work pulled
//! # from a shared queue
//! matprof join -c 1000 -n 7200 -m 10
//!
//! # The same workload with a fixed round-robin task split
//! matprof join --scheduler static
//!
//! # 1000 one-millisecond sleeps over 4 streams
//! matprof sleep -c 1000 -u 1000 -s 4
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{join, sleep};

/// Benchmark driver for the matprof device runtime
#[derive(Parser)]
#[command(name = "matprof")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// How benchmark tasks are handed to the worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scheduler {
    /// Workers pull tasks from a shared queue as they finish.
    Dynamic,
    /// Tasks are split round-robin across workers up front.
    Static,
}

#[derive(Subcommand)]
enum Commands {
    /// Matrix-profile throughput benchmark
    Join {
        /// Number of time series to process
        #[arg(short, long, default_value = "1000")]
        count: usize,

        /// Length of each time series
        #[arg(short = 'n', long, default_value = "7200")]
        length: usize,

        /// Subsequence window size
        #[arg(short = 'm', long, default_value = "10")]
        window: usize,

        /// Number of devices to use (default: all available)
        #[arg(short, long)]
        devices: Option<usize>,

        /// Number of streams per device (default: all available)
        #[arg(short, long)]
        streams: Option<usize>,

        /// Use raw Euclidean distances instead of z-normalized ones
        #[arg(long)]
        no_normalize: bool,

        /// Task distribution scheme
        #[arg(long, value_enum, default_value = "dynamic")]
        scheduler: Scheduler,

        /// Run on a fake backend with this many devices instead of the host
        #[arg(long)]
        stub_devices: Option<usize>,
    },

    /// Dispatch-overhead benchmark using the sleep kernel
    Sleep {
        /// Number of sleep tasks
        #[arg(short, long, default_value = "1000")]
        count: usize,

        /// Sleep duration in microseconds
        #[arg(short = 'u', long, default_value = "1000")]
        microseconds: u64,

        /// Number of streams
        #[arg(short, long, default_value = "1")]
        streams: usize,

        /// Task distribution scheme
        #[arg(long, value_enum, default_value = "dynamic")]
        scheduler: Scheduler,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Join {
            count,
            length,
            window,
            devices,
            streams,
            no_normalize,
            scheduler,
            stub_devices,
        } => join::execute(join::JoinBench {
            count,
            length,
            window,
            devices,
            streams,
            normalize: !no_normalize,
            scheduler,
            stub_devices,
        }),

        Commands::Sleep {
            count,
            microseconds,
            streams,
            scheduler,
        } => sleep::execute(count, microseconds, streams, scheduler),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            // Leave the engine down on the way out.
            let _ = matprof_runtime::finalize();
            ExitCode::FAILURE
        }
    }
}
