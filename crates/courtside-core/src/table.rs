// Finalized visualization table: the hand-off to the chart renderer.
//
// Output columns are the input columns followed by the three derived ones.
// The file is written to a sibling temp path and renamed into place, so a
// failed run never leaves a half-written table behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::info;

use crate::config::ColumnMap;
use crate::error::PipelineError;
use crate::quadrant::{ClassifiedPlayer, Quadrant};
use crate::record::{ColumnIndex, RowReader};

pub const EFFICIENCY_COLUMN: &str = "PTS_per_FGA";
pub const QUADRANT_COLUMN: &str = "Quadrant";
pub const AVATAR_COLUMN: &str = "AVATAR_PATH";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// How a player's avatar file came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvatarKind {
    /// Already present in the cache directory; nothing was fetched.
    Cached,
    /// Downloaded from the image source during this run.
    Fetched,
    /// Drawn locally because the image source was unavailable.
    Synthesized,
}

/// A classified player with a resolved, existing avatar file.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedPlayer {
    pub player: ClassifiedPlayer,
    pub avatar_path: PathBuf,
    pub avatar_kind: AvatarKind,
}

/// One row of the table as read back by a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationRow {
    pub id: String,
    pub name: String,
    pub team: String,
    pub games: u32,
    pub points: f64,
    pub attempts: f64,
    pub efficiency: f64,
    pub quadrant: Quadrant,
    pub avatar_path: PathBuf,
    /// Every column of the row, input and derived.
    pub raw: StringRecord,
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn output_headers(input_headers: &StringRecord) -> StringRecord {
    let mut headers = input_headers.clone();
    headers.push_field(EFFICIENCY_COLUMN);
    headers.push_field(QUADRANT_COLUMN);
    headers.push_field(AVATAR_COLUMN);
    headers
}

fn write_rows<W: Write>(
    writer: W,
    input_headers: &StringRecord,
    players: &[FinalizedPlayer],
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&output_headers(input_headers))?;
    for finalized in players {
        let ranked = &finalized.player.player;
        let mut row = ranked.record.raw().clone();
        row.push_field(&ranked.efficiency.to_string());
        row.push_field(finalized.player.quadrant.as_str());
        row.push_field(&finalized.avatar_path.to_string_lossy());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the finalized table to `path`, replacing any previous output.
pub fn write_visualization_table(
    path: &Path,
    input_headers: &StringRecord,
    players: &[FinalizedPlayer],
) -> Result<(), PipelineError> {
    let tmp = path.with_extension("csv.tmp");
    let file = std::fs::File::create(&tmp).map_err(|e| PipelineError::io(&tmp, e))?;
    if let Err(e) = write_rows(file, input_headers, players) {
        let _ = std::fs::remove_file(&tmp);
        return Err(PipelineError::csv(path, e));
    }
    std::fs::rename(&tmp, path).map_err(|e| PipelineError::io(path, e))?;
    info!("Wrote {} rows to {}", players.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read a table written by [`write_visualization_table`].
///
/// Every row must carry a quadrant label and a non-empty avatar path.
pub fn read_visualization_table(
    path: &Path,
    columns: &ColumnMap,
) -> Result<Vec<VisualizationRow>, PipelineError> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::csv(path, e))?
        .clone();
    let idx = ColumnIndex::resolve(&headers, columns)?;
    let derived = |column: &str| {
        headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| PipelineError::Data {
                row: 0,
                player: None,
                field: column.to_string(),
                message: "column missing from header row".into(),
            })
    };
    let efficiency_idx = derived(EFFICIENCY_COLUMN)?;
    let quadrant_idx = derived(QUADRANT_COLUMN)?;
    let avatar_idx = derived(AVATAR_COLUMN)?;

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| PipelineError::csv(path, e))?;
        let mut row = RowReader {
            row: i + 1,
            record: &record,
            headers: &headers,
            player: None,
        };
        let id = row.text(idx.id)?.to_string();
        row.player = Some(id.clone());

        let label = row.text(quadrant_idx)?;
        let quadrant = Quadrant::parse(label)
            .ok_or_else(|| row.error(quadrant_idx, format!("unknown quadrant `{label}`")))?;

        rows.push(VisualizationRow {
            name: row.text(idx.name)?.to_string(),
            team: row.text(idx.team)?.to_string(),
            games: row.whole(idx.games)?,
            points: row.count(idx.points)?,
            attempts: row.count(idx.attempts)?,
            efficiency: row.count(efficiency_idx)?,
            avatar_path: PathBuf::from(row.text(avatar_idx)?),
            quadrant,
            id,
            raw: record.clone(),
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
