// Player statistics records and input CSV loading.
//
// Each record keeps its full raw CSV row so that every input column survives
// to the output table, while the six columns the pipeline needs are parsed
// into typed fields up front.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use crate::config::ColumnMap;
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One player-season row as delivered by the stats source.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub team: String,
    pub games: u32,
    pub points: f64,
    pub attempts: f64,
    raw: StringRecord,
}

impl PlayerRecord {
    /// Build a record from typed values. The raw row holds the six values in
    /// the order of [`ColumnMap::entries`], matching [`PlayerTable::new`].
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        team: impl Into<String>,
        games: u32,
        points: f64,
        attempts: f64,
    ) -> Self {
        let id = id.into();
        let name = name.into();
        let team = team.into();
        let raw = StringRecord::from(vec![
            id.clone(),
            name.clone(),
            team.clone(),
            games.to_string(),
            points.to_string(),
            attempts.to_string(),
        ]);
        Self {
            id,
            name,
            team,
            games,
            points,
            attempts,
            raw,
        }
    }

    /// The original CSV row, every column included.
    pub fn raw(&self) -> &StringRecord {
        &self.raw
    }
}

/// Input headers plus parsed records, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTable {
    pub headers: StringRecord,
    pub players: Vec<PlayerRecord>,
}

impl PlayerTable {
    /// Table whose headers are exactly the mapped columns, for records built
    /// with [`PlayerRecord::new`].
    pub fn new(columns: &ColumnMap, players: Vec<PlayerRecord>) -> Self {
        let headers = columns.entries().iter().map(|(_, name)| *name).collect();
        Self { headers, players }
    }
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Positions of the mapped columns within a header row.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnIndex {
    pub id: usize,
    pub name: usize,
    pub team: usize,
    pub games: usize,
    pub points: usize,
    pub attempts: usize,
}

impl ColumnIndex {
    pub(crate) fn resolve(headers: &StringRecord, columns: &ColumnMap) -> Result<Self, PipelineError> {
        let find = |column: &str| {
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
        Ok(Self {
            id: find(&columns.id)?,
            name: find(&columns.name)?,
            team: find(&columns.team)?,
            games: find(&columns.games)?,
            points: find(&columns.points)?,
            attempts: find(&columns.attempts)?,
        })
    }
}

/// Borrowing view over one CSV row that produces field-tagged data errors.
pub(crate) struct RowReader<'a> {
    pub row: usize,
    pub record: &'a StringRecord,
    pub headers: &'a StringRecord,
    pub player: Option<String>,
}

impl RowReader<'_> {
    pub(crate) fn error(&self, index: usize, message: String) -> PipelineError {
        PipelineError::Data {
            row: self.row,
            player: self.player.clone(),
            field: self.headers.get(index).unwrap_or("?").trim().to_string(),
            message,
        }
    }

    pub(crate) fn text(&self, index: usize) -> Result<&str, PipelineError> {
        let value = self.record.get(index).map(str::trim).unwrap_or("");
        if value.is_empty() {
            return Err(self.error(index, "value is empty".into()));
        }
        Ok(value)
    }

    /// A non-negative whole number; `25` and `25.0` are both accepted.
    pub(crate) fn whole(&self, index: usize) -> Result<u32, PipelineError> {
        let text = self.text(index)?;
        if let Ok(v) = text.parse::<u32>() {
            return Ok(v);
        }
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => {
                Ok(v as u32)
            }
            _ => Err(self.error(
                index,
                format!("expected a non-negative whole number, got `{text}`"),
            )),
        }
    }

    /// A finite, non-negative number.
    pub(crate) fn count(&self, index: usize) -> Result<f64, PipelineError> {
        let text = self.text(index)?;
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(self.error(
                index,
                format!("expected a non-negative number, got `{text}`"),
            )),
        }
    }
}

fn parse_row(
    row: usize,
    record: &StringRecord,
    headers: &StringRecord,
    idx: ColumnIndex,
) -> Result<PlayerRecord, PipelineError> {
    let mut reader = RowReader {
        row,
        record,
        headers,
        player: None,
    };
    let id = reader.text(idx.id)?.to_string();
    reader.player = Some(id.clone());

    Ok(PlayerRecord {
        name: reader.text(idx.name)?.to_string(),
        team: reader.text(idx.team)?.to_string(),
        games: reader.whole(idx.games)?,
        points: reader.count(idx.points)?,
        attempts: reader.count(idx.attempts)?,
        id,
        raw: record.clone(),
    })
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

fn load_from_reader<R: Read>(
    rdr: R,
    columns: &ColumnMap,
    path: &Path,
) -> Result<PlayerTable, PipelineError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::csv(path, e))?
        .clone();
    let idx = ColumnIndex::resolve(&headers, columns)?;

    let mut players = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| PipelineError::csv(path, e))?;
        players.push(parse_row(i + 1, &record, &headers, idx)?);
    }

    Ok(PlayerTable { headers, players })
}

/// Load every player row from the stats CSV at `path`.
///
/// Unlike a lenient import, a malformed row aborts the load: a chart built
/// from a silently shrunken table would misplace the quadrant lines.
pub fn load_players(path: &Path, columns: &ColumnMap) -> Result<PlayerTable, PipelineError> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let table = load_from_reader(file, columns, path)?;
    info!(
        "Loaded {} players ({} columns) from {}",
        table.players.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

/// Parse an in-memory CSV document; used by tests and by callers that
/// already hold the bytes.
pub fn parse_players(text: &str, columns: &ColumnMap) -> Result<PlayerTable, PipelineError> {
    load_from_reader(text.as_bytes(), columns, Path::new("<memory>"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
