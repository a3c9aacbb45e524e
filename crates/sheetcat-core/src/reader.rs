//! File readers: header probing and full-table loading
//!
//! The merge engine only depends on the [`TableReader`] contract; the
//! filesystem implementation dispatches on extension and decodes delimited
//! text with the csv crate and workbooks with calamine. Every read opens
//! and closes its own file handle.

use crate::error::{Error, Result};
use crate::header;
use crate::table::{CellValue, Column, Row, Table};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Recognized tabular file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Excel workbook (xlsx)
    Xlsx,
    /// Legacy Excel workbook (xls)
    Xls,
    /// Delimited text
    Csv,
}

impl FileFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            "csv" => Some(FileFormat::Csv),
            _ => None,
        }
    }
}

/// Read access to tabular files, as consumed by the merge engine.
///
/// `header_row` is the 0-based index of the row holding column labels.
pub trait TableReader {
    /// Read the raw ordered header labels of a file without materializing
    /// row data. Fails if the row does not exist or holds no labels.
    fn read_headers(&self, path: &Path, header_row: usize) -> Result<Vec<String>>;

    /// Read the full table with columns physically reordered to `order`
    /// (a sequence of canonical labels). Fails with
    /// [`Error::ColumnMissing`] when a requested column is absent and with
    /// [`Error::DuplicateColumn`] when two of the file's labels normalize
    /// to the same canonical label.
    fn read_table(&self, path: &Path, order: &[String], header_row: usize) -> Result<Table>;
}

/// Filesystem-backed reader for the recognized formats
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl TableReader for FsReader {
    fn read_headers(&self, path: &Path, header_row: usize) -> Result<Vec<String>> {
        match FileFormat::from_path(path) {
            Some(FileFormat::Csv) => csv_headers(path, header_row),
            Some(FileFormat::Xlsx) | Some(FileFormat::Xls) => {
                let range = open_first_sheet(path)?;
                sheet_header_labels(&range, path, header_row)
            }
            None => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn read_table(&self, path: &Path, order: &[String], header_row: usize) -> Result<Table> {
        match FileFormat::from_path(path) {
            Some(FileFormat::Csv) => csv_table(path, order, header_row),
            Some(FileFormat::Xlsx) | Some(FileFormat::Xls) => sheet_table(path, order, header_row),
            None => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Reorder a raw grid to the requested canonical column order.
///
/// Rows shorter than the header are padded with empty cells; cells beyond
/// the header width are ignored.
fn project(
    path: &Path,
    labels: Vec<String>,
    raw_rows: Vec<Vec<CellValue>>,
    order: &[String],
) -> Result<Table> {
    let canonical = header::canonical_labels(&labels);

    let mut index_of: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, label) in canonical.iter().enumerate() {
        if index_of.insert(label.as_str(), i).is_some() {
            return Err(Error::DuplicateColumn {
                path: path.to_path_buf(),
                label: label.clone(),
            });
        }
    }

    let mut picks = Vec::with_capacity(order.len());
    let mut columns = Vec::with_capacity(order.len());
    for (out_idx, wanted) in order.iter().enumerate() {
        let &src_idx = index_of
            .get(wanted.as_str())
            .ok_or_else(|| Error::ColumnMissing {
                path: path.to_path_buf(),
                label: wanted.clone(),
            })?;
        picks.push(src_idx);
        columns.push(Column::new(labels[src_idx].clone(), out_idx));
    }

    let rows = raw_rows
        .into_iter()
        .map(|cells| {
            Row::new(
                picks
                    .iter()
                    .map(|&i| cells.get(i).cloned().unwrap_or(CellValue::Empty))
                    .collect(),
            )
        })
        .collect();

    Ok(Table {
        columns,
        rows,
        source_path: path.to_path_buf(),
    })
}

/// Drop trailing empty labels; workbook used-ranges can be wider than the
/// header row.
fn trim_trailing_empty(labels: &mut Vec<String>) {
    while labels.last().is_some_and(|l| l.trim().is_empty()) {
        labels.pop();
    }
}

fn csv_reader(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file)))
}

fn csv_headers(path: &Path, header_row: usize) -> Result<Vec<String>> {
    let mut reader = csv_reader(path)?;

    let record = reader
        .records()
        .nth(header_row)
        .transpose()
        .map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .ok_or_else(|| Error::HeaderRow {
            path: path.to_path_buf(),
            row: header_row,
        })?;

    let mut labels: Vec<String> = record.iter().map(|s| s.to_string()).collect();
    trim_trailing_empty(&mut labels);

    if labels.is_empty() {
        return Err(Error::HeaderRow {
            path: path.to_path_buf(),
            row: header_row,
        });
    }
    Ok(labels)
}

fn csv_table(path: &Path, order: &[String], header_row: usize) -> Result<Table> {
    let mut reader = csv_reader(path)?;

    let mut labels: Option<Vec<String>> = None;
    let mut raw_rows: Vec<Vec<CellValue>> = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        if idx < header_row {
            // Rows above the header are ignored
            continue;
        }

        if idx == header_row {
            let mut header: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            trim_trailing_empty(&mut header);
            if header.is_empty() {
                return Err(Error::HeaderRow {
                    path: path.to_path_buf(),
                    row: header_row,
                });
            }
            labels = Some(header);
        } else {
            raw_rows.push(record.iter().map(CellValue::parse).collect());
        }
    }

    let labels = labels.ok_or_else(|| Error::HeaderRow {
        path: path.to_path_buf(),
        row: header_row,
    })?;

    project(path, labels, raw_rows, order)
}

fn open_first_sheet(path: &Path) -> Result<Range<Data>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names.first().ok_or_else(|| Error::Workbook {
        path: path.to_path_buf(),
        message: "workbook has no sheets".to_string(),
    })?;

    workbook.worksheet_range(first).map_err(|e| Error::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Resolve `header_row` (an absolute sheet row) against the used range,
/// which may not start at the top of the sheet.
fn sheet_header_index(range: &Range<Data>, path: &Path, header_row: usize) -> Result<usize> {
    let start_row = range.start().map(|(r, _)| r as usize);
    match start_row {
        Some(start) if header_row >= start => Ok(header_row - start),
        _ => Err(Error::HeaderRow {
            path: path.to_path_buf(),
            row: header_row,
        }),
    }
}

fn sheet_header_labels(range: &Range<Data>, path: &Path, header_row: usize) -> Result<Vec<String>> {
    let rel = sheet_header_index(range, path, header_row)?;

    let row = range.rows().nth(rel).ok_or_else(|| Error::HeaderRow {
        path: path.to_path_buf(),
        row: header_row,
    })?;

    let mut labels: Vec<String> = row.iter().map(sheet_label).collect();
    trim_trailing_empty(&mut labels);

    if labels.is_empty() {
        return Err(Error::HeaderRow {
            path: path.to_path_buf(),
            row: header_row,
        });
    }
    Ok(labels)
}

fn sheet_table(path: &Path, order: &[String], header_row: usize) -> Result<Table> {
    let range = open_first_sheet(path)?;
    let labels = sheet_header_labels(&range, path, header_row)?;
    let rel = sheet_header_index(&range, path, header_row)?;

    let raw_rows: Vec<Vec<CellValue>> = range
        .rows()
        .skip(rel + 1)
        .map(|row| row.iter().map(sheet_cell).collect())
        .collect();

    project(path, labels, raw_rows, order)
}

fn sheet_label(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn sheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::String(trimmed.to_string())
            }
        }
        Data::Int(i) => CellValue::Integer(*i),
        // Excel stores all numbers as floats; keep whole values integral
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => CellValue::Integer(*f as i64),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::String(b.to_string()),
        other => CellValue::String(other.to_string()),
    }
}
