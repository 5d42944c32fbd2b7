// Error taxonomy for the statistics pipeline.

use std::path::PathBuf;

/// Fatal pipeline errors. Any of these aborts the run before output is written.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required field was missing or malformed. `row` is the 1-based data
    /// row (0 for header problems).
    #[error("data error in row {row}{}, field `{field}`: {message}", player_suffix(.player))]
    Data {
        row: usize,
        player: Option<String>,
        field: String,
        message: String,
    },

    #[error("stage `{stage}` received no records")]
    EmptyInput { stage: &'static str },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

fn player_suffix(player: &Option<String>) -> String {
    match player {
        Some(id) => format!(" (player {id})"),
        None => String::new(),
    }
}

impl PipelineError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}
