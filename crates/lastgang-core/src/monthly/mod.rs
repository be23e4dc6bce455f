// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Lastgang.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Calendar-month statistics over a composite load curve.
//!
//! The table always has twelve rows (January to December of one year). Each
//! column is produced by an [`AggregationStep`]; steps declare the columns they
//! read so the [`MonthlyAggregator`] can refuse to run them out of order.

mod aggregator;
mod steps;

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, Month, NaiveDateTime};
use serde::{Serialize, Serializer};

pub use aggregator::{MonthlyAggregator, MonthlySamples};
pub use steps::{
    AggregationStep, CountAbove, CountAtOrBelow, EnergySum, LoadRatio, PercentAbove, Peak,
};

/// Year + month identifier, rendered as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// `month` is 1-based; returns `None` outside 1..=12
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    #[must_use]
    pub fn of(timestamp: NaiveDateTime) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// English month name ("January")
    #[must_use]
    pub fn name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("", |m| m.name())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Columns of the monthly table that are filled by aggregation steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    EnergySum,
    Peak,
    CountAbove,
    CountAtOrBelow,
    PercentAbove,
    LoadRatio,
}

impl Column {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnergySum => "energy_sum",
            Self::Peak => "peak",
            Self::CountAbove => "count_above",
            Self::CountAtOrBelow => "count_at_or_below",
            Self::PercentAbove => "percent_above",
            Self::LoadRatio => "load_ratio",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics for one calendar month.
///
/// `None` means "no readings in this month" (or a guarded division by zero),
/// which is different from a measured zero. Counts are plain zero when empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub month: YearMonth,
    /// Energy in value-units x hours (kWh for kW readings), rounded
    pub energy_sum: Option<f64>,
    /// Highest reading of the month
    pub peak: Option<f64>,
    pub count_above: u32,
    pub count_at_or_below: u32,
    /// Share of readings above the threshold in percent, two decimals
    pub percent_above: Option<f64>,
    /// Full-load hours: energy_sum / peak, rounded
    pub load_ratio: Option<f64>,
}

impl MonthlyRow {
    fn empty(month: YearMonth) -> Self {
        Self {
            month,
            energy_sum: None,
            peak: None,
            count_above: 0,
            count_at_or_below: 0,
            percent_above: None,
            load_ratio: None,
        }
    }
}

/// Twelve [`MonthlyRow`]s for one year plus the set of computed columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTable {
    year: i32,
    rows: Vec<MonthlyRow>,
    #[serde(skip)]
    computed: BTreeSet<Column>,
}

impl MonthlyTable {
    pub(crate) fn new(year: i32) -> Self {
        let rows = (1..=12)
            .filter_map(|month| YearMonth::new(year, month))
            .map(MonthlyRow::empty)
            .collect();
        Self {
            year,
            rows,
            computed: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn rows(&self) -> &[MonthlyRow] {
        &self.rows
    }

    /// Row for a 1-based month number
    #[must_use]
    pub fn row(&self, month: u32) -> Option<&MonthlyRow> {
        let idx = usize::try_from(month.checked_sub(1)?).ok()?;
        self.rows.get(idx)
    }

    #[must_use]
    pub fn has_column(&self, column: Column) -> bool {
        self.computed.contains(&column)
    }

    /// Columns computed so far, in declaration order
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.computed.iter().copied()
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [MonthlyRow] {
        &mut self.rows
    }

    pub(crate) fn mark(&mut self, column: Column) {
        self.computed.insert(column);
    }
}

impl<'a> IntoIterator for &'a MonthlyTable {
    type Item = &'a MonthlyRow;
    type IntoIter = std::slice::Iter<'a, MonthlyRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Round half away from zero to `decimals` places
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
