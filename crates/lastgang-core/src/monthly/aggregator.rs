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

use chrono::Datelike;
use tracing::debug;

use super::steps::{
    AggregationStep, CountAbove, CountAtOrBelow, EnergySum, LoadRatio, PercentAbove, Peak,
};
use super::MonthlyTable;
use crate::error::{LoadCurveError, Result};
use crate::series::CompositeSeries;

/// Composite readings of one year, bucketed by calendar month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySamples {
    year: i32,
    buckets: [Vec<f64>; 12],
}

impl MonthlySamples {
    /// Buckets the readings of `composite` that fall into `year`
    #[must_use]
    pub fn from_composite(composite: &CompositeSeries, year: i32) -> Self {
        let mut samples = Self::empty(year);
        let mut outside_year = 0_usize;

        for point in composite {
            if point.timestamp.year() != year {
                outside_year += 1;
                continue;
            }
            let idx = point.timestamp.month0() as usize;
            samples.buckets[idx].push(point.value);
        }

        if outside_year > 0 {
            debug!(outside_year, year, "Ignoring readings outside the analysed year");
        }
        samples
    }

    #[must_use]
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            buckets: std::array::from_fn(|_| Vec::new()),
        }
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Readings per month, January first
    pub fn months(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.buckets.iter().map(Vec::as_slice)
    }

    /// Total number of readings in the year
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}

/// Computes the monthly table of one year step by step.
///
/// Start from [`MonthlyAggregator::initialize`] and thread the table through
/// the steps. A step whose input columns are not in the table yet is refused
/// with [`LoadCurveError::MissingColumn`]. Re-running a count step with a new
/// threshold only replaces that count; call `compute_percentage` again to keep
/// the percentage consistent.
#[derive(Debug, Clone)]
pub struct MonthlyAggregator {
    samples: MonthlySamples,
}

impl MonthlyAggregator {
    #[must_use]
    pub fn new(composite: &CompositeSeries, year: i32) -> Self {
        Self {
            samples: MonthlySamples::from_composite(composite, year),
        }
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.samples.year()
    }

    #[must_use]
    pub fn samples(&self) -> &MonthlySamples {
        &self.samples
    }

    /// Twelve empty rows, January to December
    #[must_use]
    pub fn initialize(&self) -> MonthlyTable {
        MonthlyTable::new(self.year())
    }

    /// Run a single step after checking its prerequisites
    pub fn run(&self, table: MonthlyTable, step: &dyn AggregationStep) -> Result<MonthlyTable> {
        if table.year() != self.year() {
            return Err(LoadCurveError::invalid(format!(
                "table for {} passed to aggregator for {}",
                table.year(),
                self.year()
            )));
        }
        if let Some(column) = step
            .requires()
            .iter()
            .copied()
            .find(|column| !table.has_column(*column))
        {
            return Err(LoadCurveError::MissingColumn {
                step: step.name(),
                column,
            });
        }

        debug!(step = step.name(), year = self.year(), "Running aggregation step");
        let mut table = step.apply(&self.samples, table);
        table.mark(step.provides());
        Ok(table)
    }

    /// Run several steps in the given order
    pub fn run_all(
        &self,
        table: MonthlyTable,
        steps: &[&dyn AggregationStep],
    ) -> Result<MonthlyTable> {
        steps.iter().try_fold(table, |table, step| self.run(table, *step))
    }

    pub fn compute_sum(&self, table: MonthlyTable, samples_per_hour: f64) -> Result<MonthlyTable> {
        self.run(table, &EnergySum::new(samples_per_hour)?)
    }

    pub fn compute_max(&self, table: MonthlyTable) -> Result<MonthlyTable> {
        self.run(table, &Peak)
    }

    pub fn count_above(&self, table: MonthlyTable, threshold: f64) -> Result<MonthlyTable> {
        self.run(table, &CountAbove { threshold })
    }

    pub fn count_at_or_below(&self, table: MonthlyTable, threshold: f64) -> Result<MonthlyTable> {
        self.run(table, &CountAtOrBelow { threshold })
    }

    pub fn compute_percentage(&self, table: MonthlyTable) -> Result<MonthlyTable> {
        self.run(table, &PercentAbove)
    }

    pub fn compute_load_ratio(&self, table: MonthlyTable) -> Result<MonthlyTable> {
        self.run(table, &LoadRatio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::combine;
    use crate::monthly::Column;
    use crate::series::Series;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn composite(pairs: &[(NaiveDateTime, f64)]) -> CompositeSeries {
        combine([Series::from_pairs(pairs.iter().copied()).unwrap()]).unwrap()
    }

    fn full_table(aggregator: &MonthlyAggregator, threshold: f64) -> MonthlyTable {
        let table = aggregator.initialize();
        let table = aggregator.compute_sum(table, 1.0).unwrap();
        let table = aggregator.compute_max(table).unwrap();
        let table = aggregator.count_above(table, threshold).unwrap();
        let table = aggregator.count_at_or_below(table, threshold).unwrap();
        let table = aggregator.compute_percentage(table).unwrap();
        aggregator.compute_load_ratio(table).unwrap()
    }

    #[test]
    fn test_empty_month_is_missing_not_zero() {
        let aggregator = MonthlyAggregator::new(&composite(&[(ts(2024, 1, 1, 0), 10.0)]), 2024);
        let table = full_table(&aggregator, 0.0);

        let feb = table.row(2).unwrap();
        assert_eq!(feb.energy_sum, None);
        assert_eq!(feb.peak, None);
        assert_eq!(feb.percent_above, None);
        assert_eq!(feb.load_ratio, None);
        assert_eq!(feb.count_above, 0);
        assert_eq!(feb.count_at_or_below, 0);

        let jan = table.row(1).unwrap();
        assert_eq!(jan.energy_sum, Some(10.0));
        assert_eq!(jan.peak, Some(10.0));
        assert_eq!(jan.load_ratio, Some(1.0));
    }

    #[test]
    fn test_zero_readings_are_not_missing() {
        let aggregator = MonthlyAggregator::new(
            &composite(&[(ts(2024, 3, 1, 0), 0.0), (ts(2024, 3, 1, 1), 0.0)]),
            2024,
        );
        let table = full_table(&aggregator, 0.0);

        let mar = table.row(3).unwrap();
        assert_eq!(mar.energy_sum, Some(0.0));
        assert_eq!(mar.peak, Some(0.0));
        assert_eq!(mar.count_at_or_below, 2);
        assert_eq!(mar.percent_above, Some(0.0));
        // peak 0 guards the division
        assert_eq!(mar.load_ratio, None);
    }

    #[test]
    fn test_threshold_boundary_counts_at_or_below() {
        let aggregator = MonthlyAggregator::new(
            &composite(&[
                (ts(2024, 5, 1, 0), 499.0),
                (ts(2024, 5, 1, 1), 500.0),
                (ts(2024, 5, 1, 2), 500.5),
            ]),
            2024,
        );
        let table = full_table(&aggregator, 500.0);

        let may = table.row(5).unwrap();
        assert_eq!(may.count_above, 1);
        assert_eq!(may.count_at_or_below, 2);
        assert_eq!(may.percent_above, Some(33.33));
    }

    #[test]
    fn test_readings_of_other_years_are_ignored() {
        let aggregator = MonthlyAggregator::new(
            &composite(&[
                (ts(2023, 12, 31, 23), 100.0),
                (ts(2024, 12, 1, 0), 8.0),
                (ts(2025, 1, 1, 0), 100.0),
            ]),
            2024,
        );
        assert_eq!(aggregator.samples().len(), 1);

        let table = full_table(&aggregator, 0.0);
        assert_eq!(table.row(12).unwrap().peak, Some(8.0));
        assert_eq!(table.row(1).unwrap().peak, None);
    }

    #[test]
    fn test_table_always_has_twelve_rows() {
        let aggregator = MonthlyAggregator::new(&composite(&[]), 1999);
        let table = full_table(&aggregator, 0.0);
        assert_eq!(table.rows().len(), 12);
        assert!(
            table
                .rows()
                .iter()
                .enumerate()
                .all(|(i, r)| r.month.year() == 1999 && r.month.month() as usize == i + 1)
        );
    }

    #[test]
    fn test_percentage_before_counts_is_refused() {
        let aggregator = MonthlyAggregator::new(&composite(&[(ts(2024, 1, 1, 0), 1.0)]), 2024);
        let table = aggregator.initialize();
        let table = aggregator.count_above(table, 0.0).unwrap();

        let err = aggregator.compute_percentage(table).unwrap_err();
        assert_eq!(
            err,
            LoadCurveError::MissingColumn {
                step: "percent_above",
                column: Column::CountAtOrBelow,
            }
        );
    }

    #[test]
    fn test_load_ratio_before_sum_is_refused() {
        let aggregator = MonthlyAggregator::new(&composite(&[(ts(2024, 1, 1, 0), 1.0)]), 2024);
        let table = aggregator.compute_max(aggregator.initialize()).unwrap();
        assert!(matches!(
            aggregator.compute_load_ratio(table),
            Err(LoadCurveError::MissingColumn {
                column: Column::EnergySum,
                ..
            })
        ));
    }

    #[test]
    fn test_steps_are_idempotent() {
        let aggregator = MonthlyAggregator::new(
            &composite(&[(ts(2024, 7, 1, 0), 4.0), (ts(2024, 7, 1, 1), 6.0)]),
            2024,
        );
        let once = full_table(&aggregator, 5.0);
        let twice = aggregator.compute_sum(once.clone(), 1.0).unwrap();
        let twice = aggregator.compute_max(twice).unwrap();
        let twice = aggregator.count_above(twice, 5.0).unwrap();
        let twice = aggregator.compute_percentage(twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_new_threshold_requires_recomputing_percentage() {
        let aggregator = MonthlyAggregator::new(
            &composite(&[(ts(2024, 7, 1, 0), 4.0), (ts(2024, 7, 1, 1), 6.0)]),
            2024,
        );
        let table = full_table(&aggregator, 5.0);
        assert_eq!(table.row(7).unwrap().percent_above, Some(50.0));

        let table = aggregator.count_above(table, 0.0).unwrap();
        let table = aggregator.count_at_or_below(table, 0.0).unwrap();
        // stale until recomputed
        assert_eq!(table.row(7).unwrap().percent_above, Some(50.0));
        let table = aggregator.compute_percentage(table).unwrap();
        assert_eq!(table.row(7).unwrap().percent_above, Some(100.0));
    }

    #[test]
    fn test_run_all_with_explicit_steps() {
        let aggregator = MonthlyAggregator::new(&composite(&[(ts(2024, 2, 1, 0), 8.0)]), 2024);
        let sum = EnergySum::new(4.0).unwrap();
        let table = aggregator
            .run_all(aggregator.initialize(), &[&sum, &Peak, &LoadRatio])
            .unwrap();

        let feb = table.row(2).unwrap();
        assert_eq!(feb.energy_sum, Some(2.0));
        assert_eq!(feb.load_ratio, Some(0.0));
        assert_eq!(
            table.columns().collect::<Vec<_>>(),
            vec![Column::EnergySum, Column::Peak, Column::LoadRatio]
        );
    }

    #[test]
    fn test_table_of_other_year_is_rejected() {
        let aggregator = MonthlyAggregator::new(&composite(&[]), 2024);
        let other = MonthlyAggregator::new(&composite(&[]), 2023).initialize();
        assert!(aggregator.compute_max(other).unwrap_err().is_invalid_input());
    }
}
