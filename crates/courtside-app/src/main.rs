// courtside entry point.
//
// 1. Parse CLI arguments
// 2. Initialize tracing (log to file)
// 3. Load config (copying defaults on first run), apply CLI overrides
// 4. Create output directories once
// 5. Scrape and/or process, then print a summary

use anyhow::Context;
use clap::{Parser, Subcommand};
use courtside_app::logging::init_tracing;
use courtside_app::pipeline::{prepare_directories, run_pipeline, PipelineReport};
use courtside_avatars::HttpImageSource;
use courtside_core::config::{self, Config};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "courtside")]
#[command(about = "Player scoring-volume quadrants from league stats", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Override pipeline.min_games from the config file
    #[arg(long, global = true)]
    min_games: Option<u32>,

    /// Override pipeline.top_n from the config file
    #[arg(long, global = true)]
    top_n: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Download season stats into the configured CSV
    Scrape,
    /// Filter, classify and resolve avatars for an existing stats CSV
    Process,
    /// Scrape, then process
    Run,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    init_tracing(&cwd)?;
    info!("courtside starting up");

    let mut config = config::load_config().context("failed to load configuration")?;
    if let Some(min_games) = cli.min_games {
        config.pipeline.min_games = min_games;
    }
    if let Some(top_n) = cli.top_n {
        config.pipeline.top_n = top_n;
    }
    config::validate(&config).context("invalid configuration")?;
    info!(
        "Config loaded: min_games={}, top_n={}, input={}",
        config.pipeline.min_games,
        config.pipeline.top_n,
        config.paths.stats_csv.display()
    );

    prepare_directories(&config)?;

    let result = match cli.command {
        Command::Scrape => scrape(&config).await,
        Command::Process => process(&config).await,
        Command::Run => match scrape(&config).await {
            Ok(()) => process(&config).await,
            Err(e) => Err(e),
        },
    };
    if let Err(e) = &result {
        error!("run failed: {e:#}");
    }
    result
}

async fn scrape(config: &Config) -> anyhow::Result<()> {
    let table = courtside_stats::scrape_to_files(config)
        .await
        .context("failed to fetch season stats")?;
    println!(
        "Saved {} players to {}",
        table.rows.len(),
        config.paths.stats_csv.display()
    );
    Ok(())
}

async fn process(config: &Config) -> anyhow::Result<()> {
    let source = HttpImageSource::from_config(&config.avatars)
        .context("failed to build image client")?;
    let report = run_pipeline(config, &source).await?;
    print_summary(&report);
    info!("Data processing completed successfully");
    Ok(())
}

fn print_summary(report: &PipelineReport) {
    println!(
        "Loaded {} players, selected {} for the chart",
        report.loaded,
        report.players.len()
    );
    println!(
        "Quadrant boundaries: PTS median {} / FGA median {}",
        report.thresholds.points, report.thresholds.attempts
    );
    for (quadrant, count) in report.counts {
        println!("  {:<26} {:<20} {count}", quadrant.as_str(), quadrant.nickname());
    }
    println!(
        "Avatars: {} cached, {} fetched, {} placeholders",
        report.avatars.cached, report.avatars.fetched, report.avatars.synthesized
    );
    println!("Wrote {}", report.output.display());
}
