// Configuration loading and parsing (config/pipeline.toml).

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the single config file under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "pipeline.toml";

/// Placeholder substituted with the player identifier in image URLs.
pub const PLAYER_ID_PLACEHOLDER: &str = "{player_id}";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// pipeline.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub paths: PathsConfig,
    pub columns: ColumnMap,
    pub avatars: AvatarConfig,
    pub scrape: ScrapeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub min_games: u32,
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub stats_csv: PathBuf,
    pub raw_json: PathBuf,
    pub output_csv: PathBuf,
    pub avatar_dir: PathBuf,
}

/// Input column names. The stats provider's headers are a configuration
/// detail, so nothing downstream hardcodes them.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ColumnMap {
    pub id: String,
    pub name: String,
    pub team: String,
    pub games: String,
    pub points: String,
    pub attempts: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            id: "PLAYER_ID".into(),
            name: "PLAYER_NAME".into(),
            team: "TEAM_ABBREVIATION".into(),
            games: "GP".into(),
            points: "PTS".into(),
            attempts: "FGA".into(),
        }
    }
}

impl ColumnMap {
    /// `(config key, column name)` pairs, in a fixed order.
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("columns.id", &self.id),
            ("columns.name", &self.name),
            ("columns.team", &self.team),
            ("columns.games", &self.games),
            ("columns.points", &self.points),
            ("columns.attempts", &self.attempts),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvatarConfig {
    pub url_template: String,
    pub timeout_secs: u64,
    pub fetch_delay_ms: u64,
    pub placeholder_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    pub api_url: String,
    pub season: String,
    pub season_type: String,
    pub per_mode: String,
    pub timeout_secs: u64,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/pipeline.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|source| ConfigError::ParseError {
        path: path.clone(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Parse config text without validating it.
pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

fn copy_failed(action: &str, target: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::DefaultsCopyError {
        message: format!("failed to {action} {}: {e}", target.display()),
    }
}

/// Regular files in `defaults/`, minus `*.example` templates.
fn default_files(defaults_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let entries = std::fs::read_dir(defaults_dir).map_err(|e| copy_failed("read", defaults_dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| copy_failed("read", defaults_dir, e))?.path();
        let is_template = path
            .extension()
            .is_some_and(|ext| ext == "example");
        if path.is_file() && !is_template {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Copy `source` to `target` unless `target` already exists. The source is
/// read first so a failed read never leaves an empty config file behind.
fn copy_if_absent(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    if target.exists() {
        return Ok(false);
    }
    let content = std::fs::read(source).map_err(|e| copy_failed("read", source, e))?;
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_failed("create", target, e)),
    };
    std::io::Write::write_all(&mut dest, &content).map_err(|e| copy_failed("write", target, e))?;
    Ok(true)
}

/// Copy every file in `defaults/` that is missing from `config/`, never
/// overwriting local edits. Returns the files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/ nor config/ directory found in {}; \
                 run from the project root or ensure defaults/ is present",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| copy_failed("create", &config_dir, e))?;

    let mut copied = Vec::new();
    for source in default_files(&defaults_dir)? {
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);
        if copy_if_absent(&source, &target)? {
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Loads config relative to the current working directory, copying
/// defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.pipeline.top_n == 0 {
        return Err(invalid("pipeline.top_n", "must be at least 1"));
    }

    let avatars = &config.avatars;
    if !avatars.url_template.contains(PLAYER_ID_PLACEHOLDER) {
        return Err(invalid(
            "avatars.url_template",
            format!("must contain {PLAYER_ID_PLACEHOLDER}"),
        ));
    }
    if avatars.timeout_secs == 0 {
        return Err(invalid("avatars.timeout_secs", "must be > 0"));
    }
    if !(32..=1024).contains(&avatars.placeholder_size) {
        return Err(invalid(
            "avatars.placeholder_size",
            format!("must be between 32 and 1024, got {}", avatars.placeholder_size),
        ));
    }

    let mut seen = HashSet::new();
    for (field, column) in config.columns.entries() {
        if column.trim().is_empty() {
            return Err(invalid(field, "must not be empty"));
        }
        if !seen.insert(column) {
            return Err(invalid(field, format!("column `{column}` is mapped twice")));
        }
    }

    if config.scrape.timeout_secs == 0 {
        return Err(invalid("scrape.timeout_secs", "must be > 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Locate the repository root holding `defaults/`, whether tests run from
    /// the crate directory or the workspace root.
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        cwd.ancestors()
            .find(|dir| dir.join("defaults").join(CONFIG_FILE).exists())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| panic!("Cannot locate defaults/ directory from CWD {:?}", cwd))
    }

    fn default_text() -> String {
        fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE)).unwrap()
    }

    /// Write `text` as config/pipeline.toml under a fresh temp dir.
    fn temp_config(name: &str, text: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), text).unwrap();
        tmp
    }

    fn expect_validation_field(err: ConfigError, expected: &str) {
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn default_config_loads() {
        let tmp = temp_config("courtside_config_defaults", &default_text());
        let config = load_config_from(&tmp).expect("defaults should be valid");

        assert_eq!(config.pipeline.min_games, 20);
        assert_eq!(config.pipeline.top_n, 50);
        assert_eq!(config.columns, ColumnMap::default());
        assert_eq!(
            config.paths.output_csv,
            PathBuf::from("data/processed_players_for_visualization.csv")
        );
        assert_eq!(config.paths.avatar_dir, PathBuf::from("images/avatars"));
        assert_eq!(config.avatars.timeout_secs, 10);
        assert_eq!(config.avatars.fetch_delay_ms, 200);
        assert_eq!(config.avatars.placeholder_size, 100);
        assert!(config.avatars.url_template.contains(PLAYER_ID_PLACEHOLDER));
        assert_eq!(config.scrape.season, "2024-25");
        assert_eq!(config.scrape.season_type, "Regular Season");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_top_n() {
        let text = default_text().replace("top_n = 50", "top_n = 0");
        let tmp = temp_config("courtside_config_top_n", &text);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "pipeline.top_n");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let text = default_text().replace("{player_id}.png", "headshot.png");
        let tmp = temp_config("courtside_config_template", &text);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "avatars.url_template");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_tiny_placeholder() {
        let text = default_text().replace("placeholder_size = 100", "placeholder_size = 8");
        let tmp = temp_config("courtside_config_placeholder", &text);
        expect_validation_field(
            load_config_from(&tmp).unwrap_err(),
            "avatars.placeholder_size",
        );
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_duplicate_column_mapping() {
        let text = default_text().replace("attempts = \"FGA\"", "attempts = \"PTS\"");
        let tmp = temp_config("courtside_config_dup_column", &text);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "columns.attempts");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_avatar_timeout() {
        let text = default_text().replace("timeout_secs     = 10", "timeout_secs     = 0");
        let tmp = temp_config("courtside_config_avatar_timeout", &text);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "avatars.timeout_secs");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_config() {
        let tmp = std::env::temp_dir().join("courtside_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = temp_config("courtside_config_invalid", "this is not valid [[[ toml");
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("courtside_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE), default_text()).unwrap();
        fs::write(defaults_dir.join("pipeline.toml.example"), "# example\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(tmp.join("config").join(CONFIG_FILE).exists());
        assert!(!tmp.join("config/pipeline.toml.example").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = std::env::temp_dir().join("courtside_config_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), default_text()).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());
        let content = fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("courtside_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_ignores_subdirectories_and_is_repeatable() {
        let tmp = std::env::temp_dir().join("courtside_config_ensure_repeat");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(defaults_dir.join("nested")).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE), default_text()).unwrap();
        fs::write(defaults_dir.join("notes.txt"), "extra\n").unwrap();

        let first = ensure_config_files(&tmp).unwrap();
        assert_eq!(
            first,
            vec![
                tmp.join("config").join("notes.txt"),
                tmp.join("config").join(CONFIG_FILE),
            ]
        );
        assert!(!tmp.join("config").join("nested").exists());

        let second = ensure_config_files(&tmp).unwrap();
        assert!(second.is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }
}
