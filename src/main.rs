use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;

use stream_watchdog::config::Configuration;
use stream_watchdog::error::AppError;
use stream_watchdog::pipeline::services::image::{ImageFrameDecoder, PatternMatcher};
use stream_watchdog::pipeline::services::stream_checker::StreamChecker;
use stream_watchdog::pipeline::types::{MachineConfig, PatternCategory, StreamCheckRecord, StreamConfig};
use stream_watchdog::renderer::SnapshotRenderer;
use stream_watchdog::scheduler::Monitor;

#[derive(Parser)]
#[command(author, version, about = "Watches video streams for black screens and test patterns")]
struct Args {
    /// Settings file (toml, yaml or json); WATCHDOG__* variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sweep the fleet on the configured interval until interrupted
    Run,
    /// Check a single URL once and print the verdict
    Check {
        url: String,
        /// Pattern layout: rectangle or usb
        #[arg(long, default_value = "rectangle")]
        category: String,
    },
    /// Check one configured stream once
    Manual {
        #[arg(long)]
        machine: String,
        #[arg(long)]
        stream: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn build_checker(configuration: &Configuration) -> Result<StreamChecker, AppError> {
    let patterns = configuration.load_patterns()?;
    let renderer = SnapshotRenderer::new(
        configuration.viewport(),
        configuration.renderer.user_agent.clone(),
    );

    Ok(StreamChecker::new(
        Arc::new(renderer),
        Arc::new(ImageFrameDecoder::new()),
        Arc::new(patterns),
        PatternMatcher::new(configuration.thresholds()),
    )
    .with_options(configuration.checker_options()))
}

fn build_monitor(configuration: &Configuration) -> Result<Monitor, AppError> {
    let fleet = configuration.load_fleet()?;
    Monitor::builder(configuration)
        .fleet(fleet)
        .checker(build_checker(configuration)?)
        .build()
}

fn print_record(record: &StreamCheckRecord) -> ExitCode {
    println!(
        "{} / {}: {} - {}",
        record.machine_id, record.stream_name, record.verdict, record.message
    );
    if let Some(details) = &record.details {
        for point in &details.details {
            println!(
                "  {:<10} at {:>5},{:<5} expected {} got {} diff {}{}",
                point.point,
                point.position.x,
                point.position.y,
                point.expected,
                point.actual,
                point.color_difference,
                if point.matched { " (match)" } else { "" }
            );
        }
    }

    if record.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, AppError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let configuration = Configuration::load(args.config.as_deref())?;

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            let monitor = build_monitor(&configuration)?;
            monitor.start();
            shutdown_signal().await;
            tracing::info!("Shutdown requested");
            monitor.shutdown().await;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { url, category } => {
            let checker = build_checker(&configuration)?;
            let machine = MachineConfig::new("cli", "command line", Vec::new());
            let stream = StreamConfig::new("adhoc", url.clone(), url, PatternCategory::from(category));
            let record = checker.check_stream(&stream, &machine).await;
            Ok(print_record(&record))
        }
        Command::Manual { machine, stream } => {
            let monitor = build_monitor(&configuration)?;
            let record = monitor.check_one(&machine, &stream).await?;
            Ok(print_record(&record))
        }
    }
}
