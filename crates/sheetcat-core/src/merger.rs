//! Merge engine: baseline selection, header reconciliation, row accumulation
//!
//! The first file whose header row reads successfully becomes the baseline.
//! Its canonical header defines the required label set and the output column
//! order for the whole run. Every other file is admitted only if its
//! canonical label set equals the baseline's; admitted tables are read with
//! columns reordered to the baseline order and their rows appended in
//! processing order. Per-file failures never abort the run; they are
//! recorded in the outcome sequence.

use crate::error::{Error, Result};
use crate::header;
use crate::reader::{FsReader, TableReader};
use crate::scanner;
use crate::table::{Column, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Why a discovered file was left out of the compiled table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The header row could not be read
    HeaderReadFailed,
    /// The canonical label set differs from the baseline's
    HeaderMismatch,
    /// The full table read failed after the header probe succeeded
    RowReadFailed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::HeaderReadFailed => write!(f, "header read failed"),
            SkipReason::HeaderMismatch => write!(f, "header mismatch"),
            SkipReason::RowReadFailed => write!(f, "row read failed"),
        }
    }
}

/// Per-file result of one merge run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// The discovered file
    pub path: PathBuf,
    /// What happened to it
    pub status: FileStatus,
}

/// Inclusion or exclusion, with detail for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileStatus {
    /// Rows were appended to the compiled table
    Included { rows: usize },
    /// File was left out
    Skipped { reason: SkipReason, detail: String },
}

impl FileOutcome {
    fn included(path: &Path, rows: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Included { rows },
        }
    }

    fn skipped(path: &Path, reason: SkipReason, detail: String) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Skipped { reason, detail },
        }
    }

    /// Whether the file contributed rows
    pub fn is_included(&self) -> bool {
        matches!(self.status, FileStatus::Included { .. })
    }
}

/// Result of one merge run: the compiled table plus per-file outcomes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResult {
    /// The file whose header defined the schema and column order
    pub baseline: PathBuf,
    /// Compiled table in baseline column order
    pub table: Table,
    /// One outcome per discovered file, in discovery order
    pub outcomes: Vec<FileOutcome>,
}

impl MergeResult {
    /// Number of files that contributed rows
    pub fn included_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_included()).count()
    }

    /// Number of files that were skipped
    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.included_count()
    }

    /// Total rows in the compiled table
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// True when a baseline existed but no file contributed rows.
    /// Callers should not write an output file in this case.
    pub fn is_empty(&self) -> bool {
        self.included_count() == 0
    }

    /// Render the full report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The schema chosen from the first readable header
struct Baseline {
    /// Raw labels in the baseline file's original order
    labels: Vec<String>,
    /// Canonical labels in the same order; the reorder target for reads
    canonical: Vec<String>,
    /// Canonical label set for equivalence checks
    label_set: BTreeSet<String>,
}

impl Baseline {
    fn new(labels: Vec<String>) -> Self {
        let canonical = header::canonical_labels(&labels);
        let label_set = header::label_set(&labels);
        Self {
            labels,
            canonical,
            label_set,
        }
    }
}

/// Merge the given files, in order, against the given reader.
///
/// `header_row` is 0-based. Returns [`Error::NoBaseline`] when no file
/// yields a readable header row; every other failure is per-file and shows
/// up in the outcome sequence.
pub fn merge_files<R: TableReader>(
    reader: &R,
    files: &[PathBuf],
    header_row: usize,
) -> Result<MergeResult> {
    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(files.len());
    let mut baseline: Option<(PathBuf, Baseline)> = None;
    let mut compiled: Vec<Row> = Vec::new();

    for path in files {
        match &baseline {
            None => match reader.read_headers(path, header_row) {
                Err(e) => outcomes.push(FileOutcome::skipped(
                    path,
                    SkipReason::HeaderReadFailed,
                    e.to_string(),
                )),
                Ok(labels) => {
                    let base = Baseline::new(labels);

                    // The baseline file's own read failure does not revoke
                    // its schema; it just contributes no rows.
                    match reader.read_table(path, &base.canonical, header_row) {
                        Ok(table) => {
                            outcomes.push(FileOutcome::included(path, table.rows.len()));
                            compiled.extend(table.rows);
                        }
                        Err(e) => outcomes.push(FileOutcome::skipped(
                            path,
                            SkipReason::RowReadFailed,
                            e.to_string(),
                        )),
                    }

                    baseline = Some((path.clone(), base));
                }
            },
            Some((_, base)) => match reader.read_headers(path, header_row) {
                Err(e) => outcomes.push(FileOutcome::skipped(
                    path,
                    SkipReason::HeaderReadFailed,
                    e.to_string(),
                )),
                Ok(labels) => {
                    let candidate = header::label_set(&labels);
                    if candidate != base.label_set {
                        outcomes.push(FileOutcome::skipped(
                            path,
                            SkipReason::HeaderMismatch,
                            mismatch_detail(&base.label_set, &candidate),
                        ));
                        continue;
                    }

                    match reader.read_table(path, &base.canonical, header_row) {
                        Ok(table) => {
                            outcomes.push(FileOutcome::included(path, table.rows.len()));
                            compiled.extend(table.rows);
                        }
                        Err(e) => outcomes.push(FileOutcome::skipped(
                            path,
                            SkipReason::RowReadFailed,
                            e.to_string(),
                        )),
                    }
                }
            },
        }
    }

    let (baseline_path, base) = baseline.ok_or(Error::NoBaseline)?;

    // Output columns carry the baseline file's original labels
    let columns: Vec<Column> = base
        .labels
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), i))
        .collect();

    let table = Table {
        columns,
        rows: compiled,
        source_path: baseline_path.clone(),
    };

    Ok(MergeResult {
        baseline: baseline_path,
        table,
        outcomes,
    })
}

/// Discover the files in `dir` and merge them with the filesystem reader
pub fn merge_directory<P: AsRef<Path>>(dir: P, header_row: usize) -> Result<MergeResult> {
    let files = scanner::discover(dir)?;
    merge_files(&FsReader, &files, header_row)
}

fn mismatch_detail(expected: &BTreeSet<String>, found: &BTreeSet<String>) -> String {
    let missing: Vec<&str> = expected.difference(found).map(|s| s.as_str()).collect();
    let extra: Vec<&str> = found.difference(expected).map(|s| s.as_str()).collect();

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing: {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        parts.push(format!("extra: {}", extra.join(", ")));
    }
    parts.join("; ")
}
