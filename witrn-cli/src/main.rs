use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tokio::{signal, time::Instant};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use witrn_lib::{DecodeError, DeviceConfig, FrameError, Sample, SampleStats, WitrnError, WitrnMeter};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// One JSON object per line: {"ts": ..., "v": ..., "i": ...}
    Json,
    /// One human-readable line per sample
    Text,
}

/// Sample voltage and current from a WITRN USB power meter.
///
/// Prints min/max/avg/p50/p90 statistics on exit, or streams every sample
/// when an output format is given.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Stop sampling after this many seconds. Runs until Ctrl+C if omitted or 0.
    #[arg(short, long, value_parser = parse_seconds)]
    duration: Option<Duration>,
    /// Stream raw samples in this format instead of printing statistics.
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,
    /// Abort on the first corrupted frame instead of skipping it.
    #[arg(long)]
    strict: bool,
    /// USB read timeout in milliseconds.
    #[arg(long, default_value_t = 500)]
    timeout_ms: u64,
    /// Optional path to a file to write logs to, in addition to stderr.
    #[arg(short, long)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("invalid number of seconds: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration: {e}"))
}

fn deadline_after(duration: Option<Duration>, start: Instant) -> Option<Instant> {
    duration.filter(|d| !d.is_zero()).map(|d| start + d)
}

fn skip_message(err: &FrameError) -> &'static str {
    if err.is_integrity_failure() {
        "Skipping corrupted frame"
    } else {
        "Skipping malformed frame, stream may be out of sync"
    }
}

fn setup_logging(log_file_path: Option<&PathBuf>, verbosity: &Verbosity<InfoLevel>) -> Result<Option<WorkerGuard>> {
    // stdout carries the sample stream, so logs go to stderr
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = if let Some(path) = log_file_path {
        let log_file =
            File::create(path).with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // INFO by default, DEBUG with -v (hex dump of every frame), TRACE with -vv
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file.as_ref(), &cli.verbose)?;

    let mut stats = SampleStats::new();
    tokio::select! {
        res = run(&cli, &mut stats) => {
            if let Err(e) = res {
                error!("Sampling failed: {:?}", e);
                process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Ctrl+C received, stopping.");
        }
    }

    if cli.output.is_none() {
        print_statistics(&stats);
    }
    Ok(())
}

async fn run(cli: &Cli, stats: &mut SampleStats) -> Result<()> {
    let config = DeviceConfig::default().with_read_timeout(Duration::from_millis(cli.timeout_ms));
    let mut meter = WitrnMeter::with_config(config)
        .await
        .context("Failed to open WITRN meter")?;

    let deadline = deadline_after(cli.duration, Instant::now());
    let mut skipped: u64 = 0;

    info!("Sampling...");
    loop {
        match meter.read_sample().await {
            Ok(sample) => {
                match cli.output {
                    Some(OutputFormat::Json) => write_json_line(&sample)?,
                    Some(OutputFormat::Text) => println!("{sample}"),
                    None => {}
                }
                stats.push(&sample);
            }
            // A corrupted frame on a live bus is expected now and then
            Err(WitrnError::Decode(DecodeError::Framing(err))) if !cli.strict => {
                skipped += 1;
                warn!(skipped, "{}: {}", skip_message(&err), err);
            }
            Err(err) => return Err(err).context("Failed to read sample"),
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
    }

    info!(samples = stats.len(), skipped, "Finished sampling.");
    Ok(())
}

fn write_json_line(sample: &Sample) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, sample)?;
    writeln!(out)?;
    Ok(())
}

fn print_statistics(stats: &SampleStats) {
    println!("Statistics:");
    println!("Voltage: {}", stats.voltage().display_with_unit("V"));
    println!("Current: {}", stats.current().display_with_unit("A"));
}
