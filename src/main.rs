use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payment_tracker::application::pipeline::Pipeline;
use payment_tracker::config::{
    DEFAULT_INPUT_CAPACITY, DEFAULT_OUTPUT_CAPACITY, DEFAULT_SHUTDOWN_GRACE_SECS,
    DEFAULT_SNAPSHOT_INTERVAL_SECS, DEFAULT_WORKER_THREADS, PipelineConfig,
};
use payment_tracker::infrastructure::console::WriterSink;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payments file read before interactive input (optional)
    input: Option<PathBuf>,

    /// Seconds between balance snapshots
    #[arg(long, default_value_t = DEFAULT_SNAPSHOT_INTERVAL_SECS)]
    snapshot_interval: u64,

    /// Seconds the ledger gets to finish after input ends
    #[arg(long, default_value_t = DEFAULT_SHUTDOWN_GRACE_SECS)]
    shutdown_grace: u64,

    /// Capacity of the payment event queue
    #[arg(long, default_value_t = DEFAULT_INPUT_CAPACITY)]
    input_capacity: usize,

    /// Capacity of the snapshot queue
    #[arg(long, default_value_t = DEFAULT_OUTPUT_CAPACITY)]
    output_capacity: usize,

    /// Worker threads for ingest, ledger and output
    #[arg(long, default_value_t = DEFAULT_WORKER_THREADS)]
    workers: usize,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries balances
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let config = PipelineConfig::default()
        .with_input_file(cli.input)
        .with_snapshot_interval(Duration::from_secs(cli.snapshot_interval))
        .with_shutdown_grace(Duration::from_secs(cli.shutdown_grace))
        .with_input_capacity(cli.input_capacity)
        .with_output_capacity(cli.output_capacity)
        .with_worker_threads(cli.workers);
    config.validate().into_diagnostic()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name("payment-worker")
        .enable_all()
        .build()
        .into_diagnostic()?;
    let grace = config.shutdown_grace;

    let stdin = BufReader::new(tokio::io::stdin());
    let sink = Box::new(WriterSink::stdout());
    let report = runtime
        .block_on(Pipeline::new(config).run(stdin, sink))
        .into_diagnostic()?;

    info!(
        processor = ?report.processor,
        file = ?report.file,
        interactive = ?report.interactive,
        snapshots_written = report.snapshots_written,
        "payment tracker finished"
    );

    runtime.shutdown_timeout(grace);
    Ok(())
}
