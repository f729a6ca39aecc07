//! CSV loader for the movie plot dataset
//!
//! Columns are matched by header name, so the loader accepts the Wikipedia
//! movie plots export as well as trimmed-down files with only the columns it
//! needs. Rows that cannot be used are counted, never reported one by one.

use csv::StringRecord;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{MovieRagError, Result};
use crate::models::{LoadReport, Record};

const TITLE_COLUMNS: &[&str] = &["title"];
const PLOT_COLUMNS: &[&str] = &["plot"];
const YEAR_COLUMNS: &[&str] = &["release year", "release_year", "year"];

/// Load up to `max_rows` usable records from a CSV file
pub fn load_records(path: &Path, max_rows: usize) -> Result<LoadReport> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MovieRagError::DatasetNotFound { path: path.to_path_buf() },
        _ => MovieRagError::Io(e),
    })?;

    let report = read_records(file, max_rows)?;

    tracing::info!(
        path = %path.display(),
        kept = report.records.len(),
        skipped = report.skipped,
        total = report.total_rows,
        "Loaded movie records"
    );

    Ok(report)
}

/// Parse records from any CSV source
///
/// Every row is parsed so that `skipped` reflects the whole file; only the
/// first `max_rows` usable rows are kept.
pub fn read_records<R: Read>(reader: R, max_rows: usize) -> Result<LoadReport> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = Columns::locate(&headers)?;

    let mut report = LoadReport::default();

    for row in csv_reader.records() {
        report.total_rows += 1;

        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::debug!(row = report.total_rows, error = %e, "Dropping malformed row");
                report.skipped += 1;
                continue;
            }
        };

        match columns.extract(&row) {
            Some(record) => {
                if report.records.len() < max_rows {
                    report.records.push(record);
                }
            }
            None => report.skipped += 1,
        }
    }

    Ok(report)
}

/// Positions of the columns the loader reads
#[derive(Debug, Clone, Copy)]
struct Columns {
    title: usize,
    plot: usize,
    year: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers.iter().position(|header| {
                let header = header.trim_start_matches('\u{feff}').trim().to_lowercase();
                names.contains(&header.as_str())
            })
        };

        let missing = |column: &str| MovieRagError::MissingColumn { column: column.to_string() };
        let title = find(TITLE_COLUMNS).ok_or_else(|| missing("Title"))?;
        let plot = find(PLOT_COLUMNS).ok_or_else(|| missing("Plot"))?;

        Ok(Self { title, plot, year: find(YEAR_COLUMNS) })
    }

    fn extract(&self, row: &StringRecord) -> Option<Record> {
        let title = non_blank(row.get(self.title))?;
        let plot = non_blank(row.get(self.plot))?;
        let release_year = self.year.and_then(|idx| row.get(idx)).and_then(parse_year);

        Some(Record::new(title, plot, release_year))
    }
}

fn non_blank(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|value| !value.is_empty())
}

/// Parse a year cell, accepting float renderings such as `1995.0`
fn parse_year(cell: &str) -> Option<u16> {
    let cell = cell.trim();
    if let Ok(year) = cell.parse::<u16>() {
        return Some(year);
    }

    let value = cell.parse::<f64>().ok()?;
    if value.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&value) {
        Some(value as u16)
    } else {
        None
    }
}
