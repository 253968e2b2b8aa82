//! Flat text format for point lists.
//!
//! Export
//! - Header `x   y   z   stripId`, then one `x   y   z   id` line per point,
//!   strip by strip. Lines are joined with CRLF.
//!
//! Import
//! - LF or CRLF line endings; blank lines ignored.
//! - The first non-blank line is a header if it mentions both `x` and `y`.
//! - Fields are whitespace separated: `x y z stripId`, or `x y z` (assigned to
//!   the caller's default strip).
//! - Bad rows are skipped and reported, never fatal.

use std::fmt;

use tracing::warn;

use crate::points::{Point, StripId, StripSet};

pub const HEADER: &str = "x   y   z   stripId";
const SEP: &str = "   ";

/// Serialize every point with its strip id.
pub fn export_points(set: &StripSet) -> String {
    let mut lines = Vec::with_capacity(set.len() + 1);
    lines.push(HEADER.to_string());
    for (p, StripId(id)) in set.iter_tagged() {
        lines.push(format!("{}{SEP}{}{SEP}{}{SEP}{}", p.x, p.y, p.z, id));
    }
    lines.join("\r\n")
}

/// Why a row was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither 3 nor 4 fields.
    ColumnCount(usize),
    /// Field (0-based) does not parse as a number.
    NotANumber { column: usize },
    /// Field (0-based) parses to NaN or infinity.
    NonFinite { column: usize },
    /// Fourth field is not an integer.
    BadStripId,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ColumnCount(n) => write!(f, "expected 3 or 4 columns, found {n}"),
            SkipReason::NotANumber { column } => write!(f, "column {column} is not a number"),
            SkipReason::NonFinite { column } => write!(f, "column {column} is not finite"),
            SkipReason::BadStripId => write!(f, "strip id is not an integer"),
        }
    }
}

/// A skipped input row (1-based line number in the source text).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: SkipReason,
}

/// Outcome of an import: how many points landed and which rows were dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReport {
    #[inline]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Parse a point list. Three-column rows go to `default_strip`.
pub fn import_points(text: &str, default_strip: StripId) -> (StripSet, ImportReport) {
    let mut set = StripSet::default();
    let mut report = ImportReport::default();
    let mut seen_content = false;
    for (idx, raw) in text.split('\n').enumerate() {
        let line_no = idx + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw).trim();
        if line.is_empty() {
            continue;
        }
        if !seen_content {
            seen_content = true;
            if is_header(line) {
                continue;
            }
        }
        match parse_row(line, default_strip) {
            Ok((point, id)) => {
                set.push(id, point);
                report.imported += 1;
            }
            Err(reason) => {
                warn!(line = line_no, %reason, "skipping point row");
                report.skipped.push(SkippedRow {
                    line: line_no,
                    reason,
                });
            }
        }
    }
    (set, report)
}

fn is_header(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.contains('x') && lower.contains('y')
}

fn parse_row(line: &str, default_strip: StripId) -> Result<(Point, StripId), SkipReason> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 && fields.len() != 4 {
        return Err(SkipReason::ColumnCount(fields.len()));
    }
    let mut xyz = [0.0; 3];
    for (column, slot) in xyz.iter_mut().enumerate() {
        let v: f64 = fields[column]
            .parse()
            .map_err(|_| SkipReason::NotANumber { column })?;
        if !v.is_finite() {
            return Err(SkipReason::NonFinite { column });
        }
        *slot = v;
    }
    let id = match fields.get(3) {
        Some(s) => StripId(s.parse().map_err(|_| SkipReason::BadStripId)?),
        None => default_strip,
    };
    Ok((Point::new(xyz[0], xyz[1], xyz[2]), id))
}
