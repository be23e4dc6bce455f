// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Lastgang.

//! Loaders turning measurement files into [`Series`].
//!
//! Both formats share the same row layout: a header row, then a timestamp in
//! the first column and a reading in the second. Rows that cannot be parsed
//! are skipped with a warning. A file without a single usable row loads as an
//! empty [`Series`]; the caller decides whether that is fatal.

use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, DataType, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use lastgang_core::{Series, TimePoint};
use tracing::{debug, warn};

use super::config::InputSettings;

/// Trait for loading one load curve from a file
pub trait SeriesLoader {
    fn load(&self, path: &Path) -> Result<Series>;
}

/// Resolve the loader by file extension
pub fn loader_for(path: &Path, settings: &InputSettings) -> Result<Box<dyn SeriesLoader>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(SpreadsheetLoader::new(settings))),
        "csv" | "txt" => Ok(Box::new(CsvLoader::new(settings))),
        other => bail!(
            "Unsupported file type '{other}' for {}; expected xlsx, xls, ods or csv",
            path.display()
        ),
    }
}

/// Shared cell parsing for both loaders
#[derive(Debug, Clone)]
struct CellParser {
    timestamp_formats: Vec<String>,
}

impl CellParser {
    fn parse_timestamp(&self, raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        self.timestamp_formats
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }

    /// Accepts both `12.5` and `12,5`
    fn parse_value(raw: &str) -> Option<f64> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        raw.replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    fn timestamp_cell(&self, cell: &Data) -> Option<NaiveDateTime> {
        match cell {
            Data::String(text) => self.parse_timestamp(text),
            Data::DateTime(_) | Data::DateTimeIso(_) | Data::Float(_) | Data::Int(_) => {
                cell.as_datetime()
            }
            Data::Bool(_) | Data::DurationIso(_) | Data::Error(_) | Data::Empty => None,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "meter readings are far below 2^52"
    )]
    fn value_cell(cell: &Data) -> Option<f64> {
        match cell {
            Data::Float(value) => Some(*value).filter(|v| v.is_finite()),
            Data::Int(value) => Some(*value as f64),
            Data::String(text) => Self::parse_value(text),
            Data::Bool(_)
            | Data::DateTime(_)
            | Data::DateTimeIso(_)
            | Data::DurationIso(_)
            | Data::Error(_)
            | Data::Empty => None,
        }
    }
}

fn finish(path: &Path, points: Vec<TimePoint>, skipped: usize) -> Result<Series> {
    if points.is_empty() {
        warn!(file = %path.display(), skipped, "No valid readings found");
        return Ok(Series::default());
    }
    if skipped > 0 {
        warn!(file = %path.display(), skipped, "Skipped unparseable rows");
    }
    debug!(file = %path.display(), readings = points.len(), "Loaded load curve");

    Series::new(points).with_context(|| format!("Invalid load curve in {}", path.display()))
}

/// Loader for Excel and OpenDocument workbooks
#[derive(Debug, Clone)]
pub struct SpreadsheetLoader {
    sheet: Option<String>,
    parser: CellParser,
}

impl SpreadsheetLoader {
    #[must_use]
    pub fn new(settings: &InputSettings) -> Self {
        Self {
            sheet: settings.sheet.clone(),
            parser: CellParser {
                timestamp_formats: settings.timestamp_formats.clone(),
            },
        }
    }
}

impl SeriesLoader for SpreadsheetLoader {
    fn load(&self, path: &Path) -> Result<Series> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook {}", path.display()))?;

        let sheet = match &self.sheet {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .with_context(|| format!("No worksheets in {}", path.display()))?,
        };

        let range = workbook
            .worksheet_range(&sheet)
            .with_context(|| format!("Failed to read sheet '{sheet}' in {}", path.display()))?;

        let mut points = Vec::new();
        let mut skipped = 0usize;

        for (row_idx, row) in range.rows().enumerate().skip(1) {
            if row.iter().all(|cell| matches!(cell, Data::Empty)) {
                continue;
            }

            let parsed = match (row.first(), row.get(1)) {
                (Some(ts_cell), Some(value_cell)) => self
                    .parser
                    .timestamp_cell(ts_cell)
                    .zip(CellParser::value_cell(value_cell)),
                _ => None,
            };

            match parsed {
                Some((timestamp, value)) => points.push(TimePoint::new(timestamp, value)),
                None => {
                    debug!(sheet = %sheet, row = row_idx + 1, "Skipping row");
                    skipped += 1;
                }
            }
        }

        finish(path, points, skipped)
    }
}

/// Loader for delimited text exports
#[derive(Debug, Clone)]
pub struct CsvLoader {
    delimiter: u8,
    parser: CellParser,
}

impl CsvLoader {
    #[must_use]
    pub fn new(settings: &InputSettings) -> Self {
        // validated as ASCII in AnalysisConfig::validate
        let delimiter = u8::try_from(settings.csv_delimiter).unwrap_or(b',');
        Self {
            delimiter,
            parser: CellParser {
                timestamp_formats: settings.timestamp_formats.clone(),
            },
        }
    }
}

impl SeriesLoader for CsvLoader {
    fn load(&self, path: &Path) -> Result<Series> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

        let mut points = Vec::new();
        let mut skipped = 0usize;

        for (row_idx, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(file = %path.display(), row = row_idx + 2, "Unreadable CSV row: {e}");
                    skipped += 1;
                    continue;
                }
            };
            if record.iter().all(str::is_empty) {
                continue;
            }

            let parsed = match (record.get(0), record.get(1)) {
                (Some(ts), Some(value)) => self
                    .parser
                    .parse_timestamp(ts)
                    .zip(CellParser::parse_value(value)),
                _ => None,
            };

            match parsed {
                Some((timestamp, value)) => points.push(TimePoint::new(timestamp, value)),
                None => {
                    debug!(row = row_idx + 2, "Skipping row");
                    skipped += 1;
                }
            }
        }

        finish(path, points, skipped)
    }
}
