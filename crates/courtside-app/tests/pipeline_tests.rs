// End-to-end tests for the processing pipeline, driven through fake image
// sources so no network access is needed.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use courtside_app::{prepare_directories, run_pipeline};
use courtside_avatars::{FetchError, ImageSource};
use courtside_core::config::{
    AvatarConfig, ColumnMap, Config, PathsConfig, PipelineConfig, ScrapeConfig,
};
use courtside_core::quadrant::{Quadrant, Thresholds};
use courtside_core::table::{read_visualization_table, AvatarKind};
use courtside_core::PipelineError;
use image::{ImageFormat, Rgb, RgbImage};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SAMPLE_CSV: &str = "\
PLAYER_ID,PLAYER_NAME,TEAM_ABBREVIATION,GP,PTS,FGA,FG_PCT
1,Alpha Guard,BOS,25,500,300,0.48
2,Bravo Wing,MIA,25,300,250,0.44
3,Charlie Center,DEN,10,900,100,0.61
";

fn temp_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn test_config(root: &Path, min_games: u32, top_n: usize) -> Config {
    Config {
        pipeline: PipelineConfig { min_games, top_n },
        paths: PathsConfig {
            stats_csv: root.join("data").join("stats.csv"),
            raw_json: root.join("data").join("stats.json"),
            output_csv: root.join("out").join("visualization.csv"),
            avatar_dir: root.join("images").join("avatars"),
        },
        columns: ColumnMap::default(),
        avatars: AvatarConfig {
            url_template: "http://localhost/{player_id}.png".into(),
            timeout_secs: 1,
            fetch_delay_ms: 0,
            placeholder_size: 64,
        },
        scrape: ScrapeConfig {
            api_url: "http://localhost/stats".into(),
            season: "2024-25".into(),
            season_type: "Regular Season".into(),
            per_mode: "Totals".into(),
            timeout_secs: 1,
        },
    }
}

fn setup(name: &str, csv: &str, min_games: u32, top_n: usize) -> (PathBuf, Config) {
    let root = temp_root(name);
    let config = test_config(&root, min_games, top_n);
    prepare_directories(&config).unwrap();
    std::fs::write(&config.paths.stats_csv, csv).unwrap();
    (root, config)
}

/// Always fails, counting attempts.
#[derive(Default)]
struct Offline {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageSource for Offline {
    async fn fetch(&self, _player_id: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FetchError::Status(404))
    }
}

/// Serves a small solid-color PNG for every player.
#[derive(Default)]
struct Headshots {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageSource for Headshots {
    async fn fetch(&self, _player_id: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 120, 200]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn three_player_season_end_to_end() {
    let (root, config) = setup("courtside_e2e_three_players", SAMPLE_CSV, 20, 2);
    let source = Offline::default();

    let report = run_pipeline(&config, &source).await.unwrap();

    assert_eq!(report.loaded, 3);
    assert_eq!(
        report.thresholds,
        Thresholds {
            points: 400.0,
            attempts: 275.0
        }
    );

    let names: Vec<&str> = report
        .players
        .iter()
        .map(|p| p.player.player.record.name.as_str())
        .collect();
    assert_eq!(names, ["Alpha Guard", "Bravo Wing"]);
    assert_eq!(
        report.players[0].player.quadrant,
        Quadrant::HighPointsHighAttempts
    );
    assert_eq!(
        report.players[1].player.quadrant,
        Quadrant::LowPointsLowAttempts
    );

    assert_eq!(report.avatars.synthesized, 2);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    for player in &report.players {
        assert_eq!(player.avatar_kind, AvatarKind::Synthesized);
        assert!(player.avatar_path.is_file());
    }

    let rows = read_visualization_table(&config.paths.output_csv, &config.columns).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "1");
    assert_eq!(rows[0].quadrant, Quadrant::HighPointsHighAttempts);
    assert!((rows[0].efficiency - 500.0 / 300.0).abs() < 1e-9);
    assert_eq!(rows[1].id, "2");
    assert_eq!(rows[1].quadrant, Quadrant::LowPointsLowAttempts);
    assert_eq!(rows[1].avatar_path, report.players[1].avatar_path);
    // Pass-through columns survive.
    assert_eq!(rows[0].raw.get(6), Some("0.48"));

    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn second_run_reuses_cached_avatars() {
    let (root, config) = setup("courtside_e2e_rerun", SAMPLE_CSV, 20, 2);
    let source = Headshots::default();

    let first = run_pipeline(&config, &source).await.unwrap();
    assert_eq!(first.avatars.fetched, 2);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    let first_output = std::fs::read_to_string(&config.paths.output_csv).unwrap();

    let second = run_pipeline(&config, &source).await.unwrap();
    assert_eq!(second.avatars.cached, 2);
    assert_eq!(second.avatars.total(), 2);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2, "no refetch on rerun");

    let first_paths: Vec<_> = first.players.iter().map(|p| &p.avatar_path).collect();
    let second_paths: Vec<_> = second.players.iter().map(|p| &p.avatar_path).collect();
    assert_eq!(first_paths, second_paths);
    assert_eq!(
        std::fs::read_to_string(&config.paths.output_csv).unwrap(),
        first_output
    );

    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn malformed_row_aborts_before_writing() {
    let csv = "\
PLAYER_ID,PLAYER_NAME,TEAM_ABBREVIATION,GP,PTS,FGA
1,Alpha Guard,BOS,25,500,300
2,Bravo Wing,MIA,twenty,300,250
";
    let (root, config) = setup("courtside_e2e_malformed", csv, 20, 2);
    let source = Offline::default();

    let err = run_pipeline(&config, &source).await.unwrap_err();
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::Data { row, field, .. }) => {
            assert_eq!(*row, 2);
            assert_eq!(field, "GP");
        }
        other => panic!("expected Data error, got {other:?}"),
    }
    assert!(!config.paths.output_csv.exists());
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);

    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn nobody_qualifying_is_an_empty_input_error() {
    let (root, config) = setup("courtside_e2e_empty", SAMPLE_CSV, 82, 10);
    let source = Offline::default();

    let err = run_pipeline(&config, &source).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::EmptyInput { .. })
    ));
    assert!(!config.paths.output_csv.exists());

    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn missing_input_file_names_the_path() {
    let root = temp_root("courtside_e2e_missing_input");
    let config = test_config(&root, 20, 2);
    prepare_directories(&config).unwrap();

    let err = run_pipeline(&config, &Offline::default()).await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("stats.csv"), "unexpected message: {message}");
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::Io { .. })
    ));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn prepare_directories_is_idempotent() {
    let root = temp_root("courtside_prepare_dirs");
    let config = test_config(&root, 20, 2);

    prepare_directories(&config).unwrap();
    prepare_directories(&config).unwrap();

    assert!(config.paths.avatar_dir.is_dir());
    assert!(root.join("data").is_dir());
    assert!(root.join("out").is_dir());

    let _ = std::fs::remove_dir_all(&root);
}
