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

//! End-to-end analysis: regularize every source, combine, aggregate.

use std::ops::RangeInclusive;

use chrono::TimeDelta;
use serde::Serialize;
use tracing::info;

use crate::combine::combine;
use crate::error::{LoadCurveError, Result};
use crate::monthly::{MonthlyAggregator, MonthlyTable};
use crate::regularize::{interval_millis, regularize};
use crate::series::{CompositeSeries, Series};

/// Plausible range for the analysed year
pub const YEAR_RANGE: RangeInclusive<i32> = 1900..=2100;

/// Default sampling interval of load profile meters
pub const DEFAULT_INTERVAL_MINUTES: i64 = 15;

/// Parameters of one analysis run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub year: i32,
    pub interval: TimeDelta,
    /// Threshold for the `count_above` column
    pub above_threshold: f64,
    /// Threshold for the `count_at_or_below` column
    pub at_or_below_threshold: f64,
}

impl AnalysisParams {
    /// Same threshold for both count columns
    #[must_use]
    pub fn new(year: i32, interval: TimeDelta, threshold: f64) -> Self {
        Self {
            year,
            interval,
            above_threshold: threshold,
            at_or_below_threshold: threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !YEAR_RANGE.contains(&self.year) {
            return Err(LoadCurveError::invalid(format!(
                "year {} outside {}..={}",
                self.year,
                YEAR_RANGE.start(),
                YEAR_RANGE.end()
            )));
        }
        interval_millis(self.interval)?;
        if !self.above_threshold.is_finite() || !self.at_or_below_threshold.is_finite() {
            return Err(LoadCurveError::invalid("threshold must be a finite number"));
        }
        Ok(())
    }

    /// Readings per hour, the divisor that turns summed power into energy
    /// (4.0 for 15 minute data). Meaningful once [`validate`](Self::validate)
    /// has accepted the interval.
    #[must_use]
    pub fn samples_per_hour(&self) -> f64 {
        #[expect(
            clippy::cast_precision_loss,
            reason = "interval in milliseconds is far below 2^52"
        )]
        let interval_ms = self.interval.num_milliseconds() as f64;
        3_600_000.0 / interval_ms
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self::new(2024, TimeDelta::minutes(DEFAULT_INTERVAL_MINUTES), 0.0)
    }
}

/// Result of a full run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub composite: CompositeSeries,
    pub table: MonthlyTable,
}

/// Regularize each source, combine them and compute all monthly columns
pub fn analyze<I>(sources: I, params: &AnalysisParams) -> Result<Analysis>
where
    I: IntoIterator<Item = Series>,
{
    params.validate()?;

    let regularized = sources
        .into_iter()
        .map(|series| regularize(series, params.interval))
        .collect::<Result<Vec<_>>>()?;

    let composite = combine(regularized)?;
    info!(
        sources = composite.source_count(),
        samples = composite.len(),
        year = params.year,
        "Built composite load curve"
    );

    let table = monthly_statistics(&composite, params)?;
    Ok(Analysis { composite, table })
}

/// All monthly columns in dependency order
pub fn monthly_statistics(
    composite: &CompositeSeries,
    params: &AnalysisParams,
) -> Result<MonthlyTable> {
    let aggregator = MonthlyAggregator::new(composite, params.year);

    let table = aggregator.initialize();
    let table = aggregator.compute_sum(table, params.samples_per_hour())?;
    let table = aggregator.compute_max(table)?;
    let table = aggregator.count_above(table, params.above_threshold)?;
    let table = aggregator.count_at_or_below(table, params.at_or_below_threshold)?;
    let table = aggregator.compute_percentage(table)?;
    aggregator.compute_load_ratio(table)
}
