//! # Table I/O
//!
//! Reading trace tables and writing result tables.
//!
//! Input is a delimited text table whose header names the `id`,
//! `timestamp`, `x` and `y` columns (any case, any order, extra columns
//! ignored), or a JSON array of [`TracePoint`] for `.json` files. The
//! delimiter is taken from the header line: comma, then semicolon, then
//! tab, otherwise runs of whitespace.
//!
//! Output format follows the file extension:
//! - `.csv` - comma separated with header
//! - `.txt` - space separated with header
//! - `.json` - pretty printed JSON
//!
//! Any other extension logs a warning and writes nothing.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::metrics::MetricTable;
use crate::{
    Contact, HomeLocation, LocatedPoint, MobilityError, Result, StayLocationCenter, Trace,
    TracePoint,
};

/// Columns every trace table must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["id", "timestamp", "x", "y"];

// ============================================================================
// Table Records
// ============================================================================

/// A record that can be written as one row of a delimited table.
pub trait TableRecord {
    /// Header names, in row order.
    const COLUMNS: &'static [&'static str];

    fn row(&self) -> Vec<String>;
}

/// Render records as a header line followed by one line per record.
pub fn to_delimited<R: TableRecord>(records: &[R], sep: char) -> String {
    let sep_str = sep.to_string();
    let mut out = R::COLUMNS.join(&sep_str);
    out.push('\n');

    for record in records {
        out.push_str(&record.row().join(&sep_str));
        out.push('\n');
    }

    out
}

impl TableRecord for TracePoint {
    const COLUMNS: &'static [&'static str] = &["id", "timestamp", "x", "y"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.timestamp.to_string(),
            self.x.to_string(),
            self.y.to_string(),
        ]
    }
}

impl TableRecord for LocatedPoint {
    const COLUMNS: &'static [&'static str] = &["id", "timestamp", "x", "y", "sl", "gl"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.timestamp.to_string(),
            self.x.to_string(),
            self.y.to_string(),
            self.sl.to_string(),
            self.gl.to_string(),
        ]
    }
}

impl TableRecord for StayLocationCenter {
    const COLUMNS: &'static [&'static str] =
        &["id", "sl", "x", "y", "min_x", "max_x", "min_y", "max_y"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.sl.to_string(),
            self.x.to_string(),
            self.y.to_string(),
            self.min_x.to_string(),
            self.max_x.to_string(),
            self.min_y.to_string(),
            self.max_y.to_string(),
        ]
    }
}

impl TableRecord for HomeLocation {
    const COLUMNS: &'static [&'static str] = &["id", "home_location", "x", "y", "dwell_time"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.home_location.to_string(),
            self.x.to_string(),
            self.y.to_string(),
            self.dwell_time.to_string(),
        ]
    }
}

impl TableRecord for Contact {
    const COLUMNS: &'static [&'static str] = &["id1", "id2", "x1", "y1", "x2", "y2", "timestamp"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id1.to_string(),
            self.id2.to_string(),
            self.x1.to_string(),
            self.y1.to_string(),
            self.x2.to_string(),
            self.y2.to_string(),
            self.timestamp.to_string(),
        ]
    }
}

// ============================================================================
// Trace Input
// ============================================================================

/// Optional clean-up applied after a trace is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessOptions {
    /// Sort rows by `(id, timestamp)`
    pub sort: bool,
    /// Shift timestamps so the earliest becomes zero
    pub zero_base: bool,
}

impl PreprocessOptions {
    pub fn apply(&self, trace: &mut Trace) {
        if self.zero_base {
            trace.normalize_timestamps();
        }
        if self.sort {
            trace.sort();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Char(char),
    Whitespace,
}

impl Delimiter {
    fn sniff(header: &str) -> Self {
        [',', ';', '\t']
            .into_iter()
            .find(|c| header.contains(*c))
            .map_or(Delimiter::Whitespace, Delimiter::Char)
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Char(c) => line.split(*c).map(str::trim).collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }
}

fn parse_id(cell: &str) -> Option<i64> {
    cell.parse::<i64>().ok().or_else(|| {
        // integral floats such as "3.0"
        let value = cell.parse::<f64>().ok()?;
        (value.fract() == 0.0 && value.abs() < i64::MAX as f64).then_some(value as i64)
    })
}

/// Parse a delimited trace table.
pub fn parse_trace(text: &str, options: &PreprocessOptions) -> Result<Trace> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or(MobilityError::EmptyTrace)?;
    let header = header.trim_start_matches('\u{feff}');
    let delimiter = Delimiter::sniff(header);

    let columns: Vec<String> = delimiter
        .split(header)
        .into_iter()
        .map(|c| c.to_lowercase())
        .collect();

    if columns.len() < REQUIRED_COLUMNS.len() {
        return Err(MobilityError::InsufficientColumns {
            found: columns.len(),
            minimum_required: REQUIRED_COLUMNS.len(),
        });
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !columns.iter().any(|c| c == *name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(MobilityError::MissingColumns { missing });
    }

    let position = |name: &str| columns.iter().position(|c| c == name).unwrap_or_default();
    let (id_col, ts_col, x_col, y_col) = (
        position("id"),
        position("timestamp"),
        position("x"),
        position("y"),
    );

    let mut points = Vec::new();
    for (line_no, line) in lines {
        let cells = delimiter.split(line);

        let cell = |col: usize| cells.get(col).copied().unwrap_or("");
        let invalid = |col: usize| MobilityError::InvalidValue {
            line: line_no,
            column: columns[col].clone(),
            value: cell(col).to_string(),
        };
        let float = |col: usize| cell(col).parse::<f64>().map_err(|_| invalid(col));

        let id = parse_id(cell(id_col)).ok_or_else(|| invalid(id_col))?;
        points.push(TracePoint::new(id, float(ts_col)?, float(x_col)?, float(y_col)?));
    }

    let mut trace = Trace::new(points);
    options.apply(&mut trace);
    Ok(trace)
}

/// Read a trace file. `.json` files hold an array of trace points, every
/// other extension is parsed as a delimited table.
pub fn read_trace(path: impl AsRef<Path>, options: &PreprocessOptions) -> Result<Trace> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;

    let trace = if has_extension(path, "json") {
        let mut trace = Trace::new(serde_json::from_str::<Vec<TracePoint>>(&text)?);
        options.apply(&mut trace);
        trace
    } else {
        parse_trace(&text, options)?
    };

    info!(
        "[IO] Read {} points ({} nodes) from {}",
        trace.len(),
        trace.node_ids().len(),
        path.display()
    );

    Ok(trace)
}

// ============================================================================
// Table Output
// ============================================================================

/// Output format chosen from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Txt,
    Json,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(TableFormat::Csv),
            "txt" => Some(TableFormat::Txt),
            "json" => Some(TableFormat::Json),
            _ => None,
        }
    }

    /// Column separator for delimited formats.
    pub fn separator(&self) -> Option<char> {
        match self {
            TableFormat::Csv => Some(','),
            TableFormat::Txt => Some(' '),
            TableFormat::Json => None,
        }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(ext))
}

/// Render with `render` in the format picked from `path` and write the
/// result. Returns whether a file was written.
fn write_as<F>(path: &Path, render: F) -> Result<bool>
where
    F: FnOnce(TableFormat) -> Result<String>,
{
    let Some(format) = TableFormat::from_path(path) else {
        warn!(
            "[IO] Unsupported output format for {}, expected .csv, .txt or .json; nothing written",
            path.display()
        );
        return Ok(false);
    };

    fs::write(path, render(format)?)?;
    info!("[IO] Wrote {}", path.display());
    Ok(true)
}

/// Write records (located trace, centers, homes, contacts or metric
/// records) to `path`.
pub fn write_records<R>(path: impl AsRef<Path>, records: &[R]) -> Result<bool>
where
    R: TableRecord + Serialize,
{
    write_as(path.as_ref(), |format| match format.separator() {
        Some(sep) => Ok(to_delimited(records, sep)),
        None => Ok(serde_json::to_string_pretty(records)?),
    })
}

/// Write a metric table to `path`. JSON output keeps the metric tag.
pub fn write_table(path: impl AsRef<Path>, table: &MetricTable) -> Result<bool> {
    write_as(path.as_ref(), |format| match format.separator() {
        Some(sep) => Ok(table.to_delimited(sep)),
        None => Ok(serde_json::to_string_pretty(table)?),
    })
}
