// Tracing setup: structured logs go to logs/courtside.log.

use std::path::Path;

use anyhow::Context;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str =
    "courtside_app=info,courtside_core=info,courtside_avatars=info,courtside_stats=info,warn";

/// Initialize tracing to log to `<base_dir>/logs/courtside.log`, keeping
/// stdout free for the run summary. `RUST_LOG` overrides the default filter.
pub fn init_tracing(base_dir: &Path) -> anyhow::Result<()> {
    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("courtside.log"))
        .context("failed to create log file")?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
