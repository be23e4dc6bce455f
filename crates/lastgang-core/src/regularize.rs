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

//! Gap filling on the time axis of a single meter series.

use chrono::TimeDelta;
use tracing::debug;

use crate::error::{LoadCurveError, Result};
use crate::series::{Series, TimePoint};

/// Interval length in whole milliseconds.
///
/// Gap counting, synthetic timestamps and the energy divisor all use this
/// value, so the interval must be positive and a whole number of milliseconds.
pub(crate) fn interval_millis(interval: TimeDelta) -> Result<i64> {
    if interval <= TimeDelta::zero() {
        return Err(LoadCurveError::invalid(format!(
            "sampling interval must be positive, got {interval}"
        )));
    }
    let interval_ms = interval.num_milliseconds();
    if interval_ms == 0 || TimeDelta::milliseconds(interval_ms) != interval {
        return Err(LoadCurveError::invalid(format!(
            "sampling interval {interval} is not a whole number of milliseconds"
        )));
    }
    Ok(interval_ms)
}

/// Fill missing samples of `series` so that neighbours are `interval` apart.
///
/// For each pair of neighbours whose gap exceeds `interval`,
/// `floor(gap / interval) - 1` zero readings are inserted at
/// `previous + k * interval`. When the gap is not a whole multiple of the
/// interval the synthetic points stay anchored to the start of the gap and the
/// remainder is left before the next real reading.
///
/// Original readings are returned untouched. Fails with
/// [`LoadCurveError::InvalidInput`] on an empty series or an interval that is
/// not a positive whole number of milliseconds.
pub fn regularize(series: Series, interval: TimeDelta) -> Result<Series> {
    if series.is_empty() {
        return Err(LoadCurveError::invalid("cannot regularize an empty series"));
    }
    let interval_ms = interval_millis(interval)?;

    let original_len = series.len();
    let mut points: Vec<TimePoint> = Vec::with_capacity(original_len);
    let mut misaligned_gaps = 0_usize;

    for point in series {
        if let Some(prev) = points.last().copied() {
            let gap_ms = (point.timestamp - prev.timestamp).num_milliseconds();
            if gap_ms > interval_ms {
                let missing_count = gap_ms.div_euclid(interval_ms) - 1;
                if gap_ms.rem_euclid(interval_ms) != 0 {
                    misaligned_gaps += 1;
                }

                let mut cursor = prev.timestamp;
                for _ in 0..missing_count {
                    cursor = cursor.checked_add_signed(interval).ok_or_else(|| {
                        LoadCurveError::invalid(format!("timestamp overflow after {cursor}"))
                    })?;
                    points.push(TimePoint::zero(cursor));
                }
            }
        }
        points.push(point);
    }

    let inserted = points.len() - original_len;
    if inserted > 0 {
        debug!(
            inserted,
            original = original_len,
            "Filled missing samples at {interval} resolution"
        );
    }
    if misaligned_gaps > 0 {
        debug!(
            misaligned_gaps,
            "Gaps not divisible by {interval}; synthetic samples anchored to gap start"
        );
    }

    Ok(Series::from_sorted(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn quarter_hour() -> TimeDelta {
        TimeDelta::minutes(15)
    }

    #[test]
    fn test_regular_series_is_unchanged() {
        let series = Series::from_pairs([
            (ts(0, 0), 1.0),
            (ts(0, 15), 2.0),
            (ts(0, 30), 3.0),
            (ts(0, 45), 4.0),
        ])
        .unwrap();

        let result = regularize(series.clone(), quarter_hour()).unwrap();
        assert_eq!(result, series);
    }

    #[test]
    fn test_gap_of_three_intervals_inserts_two_zeros() {
        let series = Series::from_pairs([(ts(0, 0), 10.0), (ts(0, 45), 20.0)]).unwrap();

        let result = regularize(series, quarter_hour()).unwrap();

        let expected = vec![
            TimePoint::new(ts(0, 0), 10.0),
            TimePoint::zero(ts(0, 15)),
            TimePoint::zero(ts(0, 30)),
            TimePoint::new(ts(0, 45), 20.0),
        ];
        assert_eq!(result.points(), expected.as_slice());
        assert!(result.is_regular(quarter_hour()));
    }

    #[test]
    fn test_multiple_gaps_are_filled_in_order() {
        let series = Series::from_pairs([
            (ts(0, 0), 1.0),
            (ts(0, 30), 2.0),
            (ts(0, 45), 3.0),
            (ts(2, 0), 4.0),
        ])
        .unwrap();

        let result = regularize(series, quarter_hour()).unwrap();

        assert_eq!(result.len(), 9);
        assert!(result.is_regular(quarter_hour()));
        assert_eq!(result.points()[1], TimePoint::zero(ts(0, 15)));
        assert_eq!(result.points()[8], TimePoint::new(ts(2, 0), 4.0));
    }

    #[test]
    fn test_non_multiple_gap_uses_floor() {
        // 40 minutes at a 15 minute grid: floor(40/15) - 1 = 1 synthetic point
        let series = Series::from_pairs([(ts(0, 0), 5.0), (ts(0, 40), 6.0)]).unwrap();

        let result = regularize(series, quarter_hour()).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.points()[1], TimePoint::zero(ts(0, 15)));
        assert_eq!(result.points()[2].timestamp, ts(0, 40));
    }

    #[test]
    fn test_gap_below_two_intervals_is_left_alone() {
        let series = Series::from_pairs([(ts(0, 0), 5.0), (ts(0, 25), 6.0)]).unwrap();
        let result = regularize(series.clone(), quarter_hour()).unwrap();
        assert_eq!(result, series);
    }

    #[test]
    fn test_single_point_series() {
        let series = Series::from_pairs([(ts(12, 0), 7.5)]).unwrap();
        let result = regularize(series.clone(), quarter_hour()).unwrap();
        assert_eq!(result, series);
    }

    #[test]
    fn test_large_gap_fills_whole_day() {
        let start = ts(0, 0);
        let end = start + TimeDelta::days(1);
        let series = Series::from_pairs([(start, 1.0), (end, 1.0)]).unwrap();

        let result = regularize(series, quarter_hour()).unwrap();

        assert_eq!(result.len(), 97);
        assert_eq!(result.iter().filter(|p| p.value == 0.0).count(), 95);
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let err = regularize(Series::default(), quarter_hour()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_non_positive_interval_is_rejected() {
        let series = Series::from_pairs([(ts(0, 0), 1.0)]).unwrap();
        assert!(regularize(series.clone(), TimeDelta::zero()).is_err());
        assert!(regularize(series, TimeDelta::minutes(-15)).is_err());
    }

    #[test]
    fn test_sub_millisecond_interval_is_rejected() {
        let series = Series::from_pairs([(ts(0, 0), 1.0), (ts(1, 0), 2.0)]).unwrap();

        let ragged = TimeDelta::minutes(15) + TimeDelta::microseconds(500);
        assert!(regularize(series.clone(), ragged).unwrap_err().is_invalid_input());
        assert!(regularize(series, TimeDelta::microseconds(999)).is_err());

        assert_eq!(interval_millis(TimeDelta::milliseconds(1)).unwrap(), 1);
        assert_eq!(interval_millis(quarter_hour()).unwrap(), 900_000);
    }
}
