use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{BenchmarkConfig, ResolvedOutputs};

pub const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Crates whose events land in the telemetry log.
const TELEMETRY_CRATES: [&str; 3] = ["watten_bench", "watten_bot", "watten_core"];

/// Keeps the background writer alive; dropping it flushes the telemetry log.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
    /// False when another global subscriber was already in place, in which
    /// case nothing this run emits reaches `telemetry_path`.
    pub installed: bool,
}

/// Install a JSON-lines subscriber writing to `telemetry.jsonl` next to the
/// summary and record the run header. Returns `None` when structured logging
/// is disabled.
pub fn init_logging(
    config: &BenchmarkConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    let logging = &config.logging;
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_path = outputs.report_dir().join(TELEMETRY_FILE);
    let file = create_telemetry_file(&telemetry_path)?;
    let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(telemetry_directives(level)))
        .context("building telemetry filter")?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_writer(writer)
        .finish();
    let installed = tracing::subscriber::set_global_default(subscriber).is_ok();

    let lineup: Vec<&str> = config.agents.iter().map(|agent| agent.name.as_str()).collect();
    tracing::info!(
        target: "watten_bench::run",
        run_id = %config.run_id,
        agents = ?lineup,
        hands = config.deals.hands,
        seatings = config.deals.seatings(),
        seed = ?config.deals.seed,
        level = %level,
        "match started"
    );

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
        installed,
    }))
}

fn create_telemetry_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    File::create(path).with_context(|| format!("creating telemetry file at {}", path.display()))
}

/// Filter directives used when `RUST_LOG` is unset: the workspace crates at
/// the configured level, everything else off.
fn telemetry_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = vec!["off".to_string()];
    directives.extend(TELEMETRY_CRATES.iter().map(|krate| format!("{krate}={level}")));
    directives.join(",")
}
