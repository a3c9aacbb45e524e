//! Output writers for the compiled table

use crate::error::{Error, Result};
use crate::reader::FileFormat;
use crate::table::{CellValue, Table};
use chrono::Local;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

/// Conventional output destination: a timestamped workbook in the source
/// directory, so repeated runs never collide.
pub fn timestamped_output_path(dir: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("merged_{}.xlsx", stamp))
}

/// Write the table to `path`, picking the format from the extension.
/// Workbook output is xlsx only; xls is read-only.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    match FileFormat::from_path(path) {
        Some(FileFormat::Xlsx) => write_xlsx(table, path),
        Some(FileFormat::Csv) => write_csv(table, path),
        _ => Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Write the table as an xlsx workbook with a single sheet
pub fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (c, column) in table.columns.iter().enumerate() {
        worksheet
            .write_string(0, c as u16, column.name.as_str())
            .map_err(|e| wb_err(path, e))?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_idx = (r + 1) as u32;
        for (c, cell) in row.cells.iter().enumerate() {
            let col_idx = c as u16;
            match cell {
                CellValue::Integer(i) => {
                    worksheet
                        .write_number(row_idx, col_idx, *i as f64)
                        .map_err(|e| wb_err(path, e))?;
                }
                CellValue::Float(f) => {
                    worksheet
                        .write_number(row_idx, col_idx, *f)
                        .map_err(|e| wb_err(path, e))?;
                }
                CellValue::String(s) => {
                    worksheet
                        .write_string(row_idx, col_idx, s.as_str())
                        .map_err(|e| wb_err(path, e))?;
                }
                CellValue::Empty => {}
            }
        }
    }

    workbook.save(path).map_err(|e| wb_err(path, e))?;
    Ok(())
}

/// Write the table as delimited text
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_err(path, e))?;

    writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .map_err(|e| csv_err(path, e))?;

    for row in &table.rows {
        writer
            .write_record(row.cells.iter().map(|c| c.to_string_value()))
            .map_err(|e| csv_err(path, e))?;
    }

    writer.flush()?;
    Ok(())
}

fn wb_err(path: &Path, e: rust_xlsxwriter::XlsxError) -> Error {
    Error::WorkbookWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn csv_err(path: &Path, e: csv::Error) -> Error {
    Error::Csv {
        path: path.to_path_buf(),
        source: e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header;
    use crate::reader::{FsReader, TableReader};
    use crate::table::{Column, Row};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sample_table() -> Table {
        Table {
            columns: vec![
                Column::new("Name".to_string(), 0),
                Column::new("Age".to_string(), 1),
            ],
            rows: vec![
                Row::new(vec![
                    CellValue::String("ada".to_string()),
                    CellValue::Integer(36),
                ]),
                Row::new(vec![
                    CellValue::String("grace".to_string()),
                    CellValue::Float(41.5),
                ]),
            ],
            source_path: PathBuf::from("a.csv"),
        }
    }

    fn canon(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| header::normalize(l)).collect()
    }

    #[test]
    fn test_timestamped_output_path() {
        let path = timestamped_output_path(Path::new("/data"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("merged_"));
        assert!(name.ends_with(".xlsx"));
        assert_eq!(path.parent(), Some(Path::new("/data")));
    }

    #[test]
    fn test_write_table_rejects_xls() {
        let dir = tempdir().unwrap();
        let err = write_table(&sample_table(), &dir.path().join("out.xls")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_csv_output_readable_by_reader() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.csv");
        write_table(&sample_table(), &out).unwrap();

        let labels = FsReader.read_headers(&out, 0).unwrap();
        assert_eq!(labels, vec!["Name".to_string(), "Age".to_string()]);

        let table = FsReader
            .read_table(&out, &canon(&["Name", "Age"]), 0)
            .unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows[0].cells,
            vec![CellValue::String("ada".to_string()), CellValue::Integer(36)]
        );
        assert_eq!(table.rows[1].cells[1], CellValue::Float(41.5));
    }

    #[test]
    fn test_xlsx_output_readable_by_reader() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.xlsx");
        write_table(&sample_table(), &out).unwrap();

        let labels = FsReader.read_headers(&out, 0).unwrap();
        assert_eq!(labels, vec!["Name".to_string(), "Age".to_string()]);

        let table = FsReader
            .read_table(&out, &canon(&["Name", "Age"]), 0)
            .unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows[0].cells,
            vec![CellValue::String("ada".to_string()), CellValue::Integer(36)]
        );
        assert_eq!(table.rows[1].cells[1], CellValue::Float(41.5));
    }
}
