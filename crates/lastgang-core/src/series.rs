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

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::error::{LoadCurveError, Result};

/// A single metered power reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub timestamp: NaiveDateTime,
    /// Instantaneous power (typically kW)
    pub value: f64,
}

impl TimePoint {
    #[must_use]
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Synthetic reading used to fill a gap in the time axis
    #[must_use]
    pub fn zero(timestamp: NaiveDateTime) -> Self {
        Self::new(timestamp, 0.0)
    }
}

/// Load curve of a single meter: strictly ascending, unique timestamps.
///
/// The ordering invariant is checked on construction, so every `Series` that
/// reaches the regularizer or the combiner is known to be sorted. Gaps are
/// allowed until the series has been regularized.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<TimePoint>,
}

impl Series {
    /// Build a series from readings delivered by a parser.
    ///
    /// Fails with [`LoadCurveError::InvalidInput`] on unsorted or duplicate
    /// timestamps and on non-finite values.
    pub fn new(points: Vec<TimePoint>) -> Result<Self> {
        if let Some(bad) = points.iter().position(|p| !p.value.is_finite()) {
            return Err(LoadCurveError::invalid(format!(
                "non-finite value {} at {} (row {bad})",
                points[bad].value, points[bad].timestamp
            )));
        }

        for (idx, pair) in points.windows(2).enumerate() {
            let (prev, next) = (pair[0].timestamp, pair[1].timestamp);
            if next == prev {
                return Err(LoadCurveError::invalid(format!(
                    "duplicate timestamp {next} at rows {idx} and {}",
                    idx + 1
                )));
            }
            if next < prev {
                return Err(LoadCurveError::invalid(format!(
                    "timestamps not ascending: {next} (row {}) follows {prev} (row {idx})",
                    idx + 1
                )));
            }
        }

        Ok(Self { points })
    }

    /// Convenience constructor from `(timestamp, value)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDateTime, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(timestamp, value)| TimePoint::new(timestamp, value))
                .collect(),
        )
    }

    /// Caller guarantees ascending, unique timestamps.
    pub(crate) fn from_sorted(points: Vec<TimePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<TimePoint> {
        self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimePoint> {
        self.points.iter()
    }

    /// First and last timestamp, `None` for an empty series
    #[must_use]
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.points.first()?.timestamp, self.points.last()?.timestamp))
    }

    /// True if every pair of neighbours is exactly `interval` apart
    #[must_use]
    pub fn is_regular(&self, interval: TimeDelta) -> bool {
        self.points
            .windows(2)
            .all(|w| w[1].timestamp - w[0].timestamp == interval)
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a TimePoint;
    type IntoIter = std::slice::Iter<'a, TimePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl IntoIterator for Series {
    type Item = TimePoint;
    type IntoIter = std::vec::IntoIter<TimePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

/// Additive load curve built from several meters.
///
/// Same shape as [`Series`]; built once by [`crate::combine`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeSeries {
    points: Vec<TimePoint>,
    source_count: usize,
}

impl CompositeSeries {
    pub(crate) fn new(points: Vec<TimePoint>, source_count: usize) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self {
            points,
            source_count,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    /// Number of meter series that were summed into this curve
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimePoint> {
        self.points.iter()
    }

    #[must_use]
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.points.first()?.timestamp, self.points.last()?.timestamp))
    }

    /// Raw view of the composite curve for charting and export
    #[must_use]
    pub fn as_series(&self) -> Series {
        Series::from_sorted(self.points.clone())
    }
}

impl<'a> IntoIterator for &'a CompositeSeries {
    type Item = &'a TimePoint;
    type IntoIter = std::slice::Iter<'a, TimePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
