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

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{LoadCurveError, Result};
use crate::series::{CompositeSeries, Series, TimePoint};

/// Sum several meter series into one composite load curve.
///
/// - The output covers the union of all input timestamps, ascending.
/// - A series without a reading at some timestamp contributes 0 there.
/// - Inputs are not re-gridded; regularize them to the same interval first
///   if their grids should line up.
///
/// Fails with [`LoadCurveError::InvalidInput`] on an empty list.
pub fn combine<I>(series_list: I) -> Result<CompositeSeries>
where
    I: IntoIterator<Item = Series>,
{
    // timestamp -> (sum of values, number of series contributing)
    let mut by_timestamp: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();
    let mut source_count = 0_usize;

    for series in series_list {
        source_count += 1;
        for point in series {
            let slot = by_timestamp.entry(point.timestamp).or_insert((0.0, 0));
            slot.0 += point.value;
            slot.1 += 1;
        }
    }

    if source_count == 0 {
        return Err(LoadCurveError::invalid("cannot combine an empty list of series"));
    }

    let partial = by_timestamp
        .values()
        .filter(|(_, contributors)| *contributors < source_count)
        .count();
    if partial > 0 {
        debug!(
            partial,
            total = by_timestamp.len(),
            sources = source_count,
            "Timestamps not covered by every source were summed as 0 for the missing ones"
        );
    }

    let points = by_timestamp
        .into_iter()
        .map(|(timestamp, (value, _))| TimePoint::new(timestamp, value))
        .collect();

    Ok(CompositeSeries::new(points, source_count))
}
