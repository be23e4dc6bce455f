// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Lastgang.

//! Output formatters for the monthly table and load curves.

use std::io::Write;

use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, CellAlignment, Table, presets::UTF8_FULL};
use lastgang_core::{MonthlyRow, MonthlyTable, TimePoint};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MISSING: &str = "-";

/// Formatter for pretty terminal tables
#[derive(Debug)]
pub struct TableFormatter;

/// Formatter for CSV export
#[derive(Debug)]
pub struct CsvFormatter;

/// Formatter for JSON export
#[derive(Debug)]
pub struct JsonFormatter;

fn optional(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| MISSING.to_owned(), |v| format!("{v:.decimals$}"))
}

impl TableFormatter {
    /// Format the monthly statistics as a table followed by a short summary
    #[must_use]
    pub fn format_table(table: &MonthlyTable, threshold: f64) -> String {
        let mut output = Table::new();
        output.load_preset(UTF8_FULL);
        output.set_header(vec![
            Cell::new("Month").add_attribute(Attribute::Bold),
            Cell::new("Energy Sum").add_attribute(Attribute::Bold),
            Cell::new("Peak").add_attribute(Attribute::Bold),
            Cell::new(format!("Above\n{threshold}")).add_attribute(Attribute::Bold),
            Cell::new(format!("At/Below\n{threshold}")).add_attribute(Attribute::Bold),
            Cell::new("Above %").add_attribute(Attribute::Bold),
            Cell::new("Full-load h").add_attribute(Attribute::Bold),
        ]);

        for row in table {
            output.add_row(vec![
                Cell::new(format!("{} ({})", row.month, row.month.name())),
                Cell::new(optional(row.energy_sum, 0)).set_alignment(CellAlignment::Right),
                Cell::new(optional(row.peak, 2)).set_alignment(CellAlignment::Right),
                Cell::new(row.count_above).set_alignment(CellAlignment::Right),
                Cell::new(row.count_at_or_below).set_alignment(CellAlignment::Right),
                Cell::new(optional(row.percent_above, 2)).set_alignment(CellAlignment::Right),
                Cell::new(optional(row.load_ratio, 0)).set_alignment(CellAlignment::Right),
            ]);
        }

        let months_with_data = table.rows().iter().filter(|r| r.energy_sum.is_some()).count();
        let total: f64 = table.rows().iter().filter_map(|r| r.energy_sum).sum();

        format!(
            "{output}\nYear {}: {months_with_data} of 12 months with data, total energy {total:.0}\n",
            table.year()
        )
    }
}

impl CsvFormatter {
    /// Monthly table as CSV; missing values become empty fields
    pub fn write_table<W: Write>(table: &MonthlyTable, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "month",
            "energy_sum",
            "peak",
            "count_above",
            "count_at_or_below",
            "percent_above",
            "load_ratio",
        ])?;

        for row in table {
            csv.write_record(Self::table_record(row))?;
        }

        csv.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    fn table_record(row: &MonthlyRow) -> [String; 7] {
        let field = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        [
            row.month.to_string(),
            field(row.energy_sum),
            field(row.peak),
            row.count_above.to_string(),
            row.count_at_or_below.to_string(),
            field(row.percent_above),
            field(row.load_ratio),
        ]
    }

    /// A load curve as `timestamp,value` rows
    pub fn write_series<'a, W, I>(points: I, writer: W) -> Result<()>
    where
        W: Write,
        I: IntoIterator<Item = &'a TimePoint>,
    {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["timestamp", "value"])?;
        for point in points {
            csv.write_record([
                point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                point.value.to_string(),
            ])?;
        }
        csv.flush().context("Failed to flush CSV output")?;
        Ok(())
    }
}

impl JsonFormatter {
    pub fn format_table(table: &MonthlyTable) -> Result<String> {
        serde_json::to_string_pretty(table).context("Failed to serialize monthly table")
    }
}
