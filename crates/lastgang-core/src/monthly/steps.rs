// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Lastgang.

//! Aggregation steps. Each one fills exactly one column of the monthly table.

use std::fmt;

use super::aggregator::MonthlySamples;
use super::{Column, MonthlyTable, round_to};
use crate::error::{LoadCurveError, Result};

/// One pure `table -> table` stage of the monthly statistics.
///
/// `requires` lists the columns that must already be present in the table;
/// the aggregator checks them before calling `apply`.
pub trait AggregationStep: fmt::Debug {
    fn name(&self) -> &'static str;

    fn requires(&self) -> &'static [Column] {
        &[]
    }

    fn provides(&self) -> Column;

    fn apply(&self, samples: &MonthlySamples, table: MonthlyTable) -> MonthlyTable;
}

fn saturating_count(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Monthly energy: sum of readings divided by readings per hour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySum {
    samples_per_hour: f64,
}

impl EnergySum {
    /// `samples_per_hour` is 4 for 15 minute data, 1 for hourly data
    pub fn new(samples_per_hour: f64) -> Result<Self> {
        if !samples_per_hour.is_finite() || samples_per_hour <= 0.0 {
            return Err(LoadCurveError::invalid(format!(
                "samples per hour must be a positive number, got {samples_per_hour}"
            )));
        }
        Ok(Self { samples_per_hour })
    }

    #[must_use]
    pub fn samples_per_hour(&self) -> f64 {
        self.samples_per_hour
    }
}

impl AggregationStep for EnergySum {
    fn name(&self) -> &'static str {
        "energy_sum"
    }

    fn provides(&self) -> Column {
        Column::EnergySum
    }

    fn apply(&self, samples: &MonthlySamples, mut table: MonthlyTable) -> MonthlyTable {
        for (row, values) in table.rows_mut().iter_mut().zip(samples.months()) {
            row.energy_sum = (!values.is_empty())
                .then(|| round_to(values.iter().sum::<f64>() / self.samples_per_hour, 0));
        }
        table
    }
}

/// Highest reading per month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Peak;

impl AggregationStep for Peak {
    fn name(&self) -> &'static str {
        "peak"
    }

    fn provides(&self) -> Column {
        Column::Peak
    }

    fn apply(&self, samples: &MonthlySamples, mut table: MonthlyTable) -> MonthlyTable {
        for (row, values) in table.rows_mut().iter_mut().zip(samples.months()) {
            row.peak = values.iter().copied().reduce(f64::max);
        }
        table
    }
}

/// Readings strictly above the threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountAbove {
    pub threshold: f64,
}

impl AggregationStep for CountAbove {
    fn name(&self) -> &'static str {
        "count_above"
    }

    fn provides(&self) -> Column {
        Column::CountAbove
    }

    fn apply(&self, samples: &MonthlySamples, mut table: MonthlyTable) -> MonthlyTable {
        for (row, values) in table.rows_mut().iter_mut().zip(samples.months()) {
            row.count_above =
                saturating_count(values.iter().filter(|v| **v > self.threshold).count());
        }
        table
    }
}

/// Readings at or below the threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountAtOrBelow {
    pub threshold: f64,
}

impl AggregationStep for CountAtOrBelow {
    fn name(&self) -> &'static str {
        "count_at_or_below"
    }

    fn provides(&self) -> Column {
        Column::CountAtOrBelow
    }

    fn apply(&self, samples: &MonthlySamples, mut table: MonthlyTable) -> MonthlyTable {
        for (row, values) in table.rows_mut().iter_mut().zip(samples.months()) {
            row.count_at_or_below =
                saturating_count(values.iter().filter(|v| **v <= self.threshold).count());
        }
        table
    }
}

/// `count_above / (count_above + count_at_or_below)` in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PercentAbove;

impl AggregationStep for PercentAbove {
    fn name(&self) -> &'static str {
        "percent_above"
    }

    fn requires(&self) -> &'static [Column] {
        &[Column::CountAbove, Column::CountAtOrBelow]
    }

    fn provides(&self) -> Column {
        Column::PercentAbove
    }

    fn apply(&self, _samples: &MonthlySamples, mut table: MonthlyTable) -> MonthlyTable {
        for row in table.rows_mut() {
            let total = u64::from(row.count_above) + u64::from(row.count_at_or_below);
            row.percent_above = (total > 0).then(|| {
                #[expect(
                    clippy::cast_precision_loss,
                    reason = "monthly sample counts stay far below 2^52"
                )]
                let share = f64::from(row.count_above) / total as f64;
                round_to(share * 100.0, 2)
            });
        }
        table
    }
}

/// Full-load hours: monthly energy divided by monthly peak
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadRatio;

impl AggregationStep for LoadRatio {
    fn name(&self) -> &'static str {
        "load_ratio"
    }

    fn requires(&self) -> &'static [Column] {
        &[Column::EnergySum, Column::Peak]
    }

    fn provides(&self) -> Column {
        Column::LoadRatio
    }

    fn apply(&self, _samples: &MonthlySamples, mut table: MonthlyTable) -> MonthlyTable {
        for row in table.rows_mut() {
            row.load_ratio = match (row.energy_sum, row.peak) {
                (Some(sum), Some(peak)) if peak != 0.0 => Some(round_to(sum / peak, 0)),
                _ => None,
            };
        }
        table
    }
}
