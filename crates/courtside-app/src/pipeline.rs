// Pipeline driver: load → filter/derive → classify → resolve avatars → write.
//
// Stages run strictly in sequence and each consumes the previous stage's
// output. Nothing is written until every stage has succeeded.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use courtside_avatars::{AvatarResolver, ImageSource};
use courtside_core::config::Config;
use courtside_core::filter::filter_and_derive;
use courtside_core::quadrant::{classify, Quadrant, Thresholds};
use courtside_core::record::load_players;
use courtside_core::table::{write_visualization_table, AvatarKind, FinalizedPlayer};
use tracing::info;

/// How many avatars came from each branch of the resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvatarTally {
    pub cached: usize,
    pub fetched: usize,
    pub synthesized: usize,
}

impl AvatarTally {
    pub fn record(&mut self, kind: AvatarKind) {
        match kind {
            AvatarKind::Cached => self.cached += 1,
            AvatarKind::Fetched => self.fetched += 1,
            AvatarKind::Synthesized => self.synthesized += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.cached + self.fetched + self.synthesized
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub loaded: usize,
    pub thresholds: Thresholds,
    pub counts: [(Quadrant, usize); 4],
    pub avatars: AvatarTally,
    pub output: PathBuf,
    pub players: Vec<FinalizedPlayer>,
}

/// Create every directory the pipeline writes into. Safe to call repeatedly.
pub fn prepare_directories(config: &Config) -> anyhow::Result<()> {
    let paths = &config.paths;
    let parents = [&paths.stats_csv, &paths.raw_json, &paths.output_csv]
        .into_iter()
        .filter_map(|file| file.parent())
        .filter(|dir| !dir.as_os_str().is_empty());

    for dir in parents.chain(std::iter::once(paths.avatar_dir.as_path())) {
        create_dir(dir)?;
    }
    Ok(())
}

fn create_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))
}

/// Run the processing pipeline over the stats CSV named in `config`.
pub async fn run_pipeline(config: &Config, source: &dyn ImageSource) -> anyhow::Result<PipelineReport> {
    let table = load_players(&config.paths.stats_csv, &config.columns)
        .context("stage `load` failed")?;
    let loaded = table.players.len();

    let top_n = NonZeroUsize::new(config.pipeline.top_n)
        .context("pipeline.top_n must be at least 1")?;
    let selected = filter_and_derive(table.players, config.pipeline.min_games, top_n);

    let classification = classify(selected).context("stage `classify` failed")?;
    let thresholds = classification.thresholds;
    let counts = classification.counts();

    let resolver = AvatarResolver::new(
        source,
        &config.paths.avatar_dir,
        config.avatars.placeholder_size,
    );
    let delay = Duration::from_millis(config.avatars.fetch_delay_ms);
    let mut avatars = AvatarTally::default();
    let mut players = Vec::with_capacity(classification.players.len());

    info!("Resolving avatars for {} players", classification.players.len());
    for player in classification.players {
        let outcome = resolver
            .resolve(&player.player.record)
            .await
            .with_context(|| format!("stage `avatars` failed for player {}", player.player.record.id))?;
        if outcome.performed_fetch() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let avatar_kind = outcome.kind();
        avatars.record(avatar_kind);
        players.push(FinalizedPlayer {
            player,
            avatar_path: outcome.into_path(),
            avatar_kind,
        });
    }
    info!(
        "Avatars: {} cached, {} fetched, {} placeholders",
        avatars.cached, avatars.fetched, avatars.synthesized
    );

    write_visualization_table(&config.paths.output_csv, &table.headers, &players)
        .context("stage `write` failed")?;

    Ok(PipelineReport {
        loaded,
        thresholds,
        counts,
        avatars,
        output: config.paths.output_csv.clone(),
        players,
    })
}
