// Conversion of the stats API's `resultSets` payload into a flat table.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::StatsError;

/// Header row plus stringified cells, in API order.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub fetched_at: DateTime<Utc>,
}

impl StatsTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Rows ordered by the numeric value in `column`, highest first. Rows
    /// whose cell does not parse sort last.
    pub fn top_by<'a>(&'a self, column: &str, n: usize) -> Vec<&'a [String]> {
        let Some(idx) = self.column(column) else {
            return Vec::new();
        };
        let value = |row: &[String]| {
            row.get(idx)
                .and_then(|cell| cell.parse::<f64>().ok())
                .unwrap_or(f64::NEG_INFINITY)
        };
        let mut rows: Vec<&[String]> = self.rows.iter().map(Vec::as_slice).collect();
        rows.sort_by(|a, b| value(b).total_cmp(&value(a)));
        rows.truncate(n);
        rows
    }
}

/// Render one JSON cell the way it should appear in the CSV.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Extract `resultSets[0]` as a table.
pub fn result_table(doc: &Value, fetched_at: DateTime<Utc>) -> Result<StatsTable, StatsError> {
    let set = doc
        .get("resultSets")
        .and_then(Value::as_array)
        .and_then(|sets| sets.first())
        .ok_or_else(|| StatsError::Shape("missing resultSets[0]".into()))?;

    let headers: Vec<String> = set
        .get("headers")
        .and_then(Value::as_array)
        .ok_or_else(|| StatsError::Shape("resultSets[0].headers is not an array".into()))?
        .iter()
        .map(|h| {
            h.as_str()
                .map(str::to_string)
                .ok_or_else(|| StatsError::Shape(format!("non-string header {h}")))
        })
        .collect::<Result<_, _>>()?;

    let raw_rows = set
        .get("rowSet")
        .and_then(Value::as_array)
        .ok_or_else(|| StatsError::Shape("resultSets[0].rowSet is not an array".into()))?;

    let mut rows = Vec::with_capacity(raw_rows.len());
    for (i, raw) in raw_rows.iter().enumerate() {
        let cells = raw
            .as_array()
            .ok_or_else(|| StatsError::Shape(format!("rowSet[{i}] is not an array")))?;
        if cells.len() != headers.len() {
            return Err(StatsError::Shape(format!(
                "rowSet[{i}] has {} cells, expected {}",
                cells.len(),
                headers.len()
            )));
        }
        rows.push(cells.iter().map(cell_text).collect());
    }

    Ok(StatsTable {
        headers,
        rows,
        fetched_at,
    })
}

/// Write the table as CSV (header row first).
pub fn write_csv(table: &StatsTable, path: &Path) -> Result<(), StatsError> {
    let csv_err = |source| StatsError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(&table.headers).map_err(csv_err)?;
    for row in &table.rows {
        wtr.write_record(row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| StatsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
