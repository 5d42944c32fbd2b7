// Stats source: pulls season player totals from the league stats API and
// stores them as the CSV the pipeline reads.

pub mod client;
pub mod dashboard;
pub mod error;

use std::path::Path;

use chrono::Utc;
use courtside_core::config::Config;
use tracing::info;

pub use client::StatsClient;
pub use dashboard::{result_table, write_csv, StatsTable};
pub use error::StatsError;

fn write_raw_json(doc: &serde_json::Value, path: &Path) -> Result<(), StatsError> {
    let text = serde_json::to_string(doc)?;
    std::fs::write(path, text).map_err(|source| StatsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Fetch the configured season, keep the raw JSON next to the CSV, and write
/// the stats CSV. Parent directories must already exist.
pub async fn scrape_to_files(config: &Config) -> Result<StatsTable, StatsError> {
    let client = StatsClient::from_config(&config.scrape)?;
    let doc = client.fetch_season().await?;

    write_raw_json(&doc, &config.paths.raw_json)?;
    info!("API data saved to {}", config.paths.raw_json.display());

    let table = result_table(&doc, Utc::now())?;
    write_csv(&table, &config.paths.stats_csv)?;
    info!(
        "Player statistics for {} players saved to {} (fetched {})",
        table.rows.len(),
        config.paths.stats_csv.display(),
        table.fetched_at.format("%Y-%m-%d %H:%M UTC")
    );

    let name_idx = table.column(&config.columns.name);
    let points_idx = table.column(&config.columns.points);
    for row in table.top_by(&config.columns.points, 5) {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map_or("?", String::as_str);
        info!("  {} - {} PTS", cell(name_idx), cell(points_idx));
    }

    Ok(table)
}
