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

use anyhow::Result;
use chrono::TimeDelta;
use lastgang_core::{CompositeSeries, MonthlyTable};
use plotters::prelude::*;

const BACKGROUND: RGBColor = RGBColor(26, 26, 26);
const LABEL: RGBColor = RGBColor(153, 153, 153);
const AXIS: RGBColor = RGBColor(58, 58, 58);
const ENERGY: RGBColor = RGBColor(33, 150, 243);
const PEAK: RGBColor = RGBColor(255, 152, 0);

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_label(month: u32) -> String {
    month
        .checked_sub(1)
        .and_then(|idx| usize::try_from(idx).ok())
        .and_then(|idx| MONTH_ABBR.get(idx))
        .map_or_else(String::new, |abbr| (*abbr).to_owned())
}

/// `0..max` with 10% headroom, extended below zero for negative readings
fn value_range(min: f64, max: f64) -> (f64, f64) {
    let span = (max - min).max(1.0);
    let low = if min < 0.0 { min - span * 0.1 } else { 0.0 };
    (low, max + span * 0.1)
}

/// Render the composite load curve as a line chart.
///
/// Returns an empty string for an empty curve.
pub fn load_curve_chart_svg(composite: &CompositeSeries, width: u32, height: u32) -> Result<String> {
    let mut svg_data = String::new();

    let Some((first, last)) = composite.span() else {
        return Ok(svg_data);
    };

    {
        let root = SVGBackend::with_string(&mut svg_data, (width, height)).into_drawing_area();
        root.fill(&BACKGROUND)?;

        let min = composite.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let max = composite.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
        let (y_min, y_max) = value_range(min, max);

        let x_start = first.and_utc();
        let mut x_end = last.and_utc();
        if x_end <= x_start {
            x_end = x_start + TimeDelta::hours(1);
        }

        let caption = format!(
            "Composite load curve ({} sources, {} samples)",
            composite.source_count(),
            composite.len()
        );

        let mut chart = ChartBuilder::on(&root)
            .caption(&caption, ("sans-serif", 20, &WHITE))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_start..x_end, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Time")
            .y_desc("Load")
            .x_labels(12)
            .y_labels(10)
            .x_label_formatter(&|dt| dt.format("%m-%d %H:%M").to_string())
            .label_style(("sans-serif", 12, &LABEL))
            .axis_style(AXIS)
            .draw()?;

        chart.draw_series(LineSeries::new(
            composite.iter().map(|p| (p.timestamp.and_utc(), p.value)),
            &ENERGY,
        ))?;

        root.present()?;
    }

    Ok(svg_data)
}

/// Monthly energy as bars with the monthly peak on a secondary axis
pub fn monthly_chart_svg(table: &MonthlyTable, width: u32, height: u32) -> Result<String> {
    let mut svg_data = String::new();

    {
        let root = SVGBackend::with_string(&mut svg_data, (width, height)).into_drawing_area();
        root.fill(&BACKGROUND)?;

        let energy_max = table.rows().iter().filter_map(|r| r.energy_sum).fold(0.0, f64::max);
        let peak_max = table.rows().iter().filter_map(|r| r.peak).fold(0.0, f64::max);
        let (_, energy_top) = value_range(0.0, energy_max);
        let (_, peak_top) = value_range(0.0, peak_max);

        let caption = format!("Monthly energy and peak load {}", table.year());

        let mut chart = ChartBuilder::on(&root)
            .caption(&caption, ("sans-serif", 20, &WHITE))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d((1u32..13u32).into_segmented(), 0.0..energy_top)?
            .set_secondary_coord((1u32..13u32).into_segmented(), 0.0..peak_top);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Energy")
            .x_label_formatter(&|value| match value {
                SegmentValue::Exact(month) | SegmentValue::CenterOf(month) => month_label(*month),
                SegmentValue::Last => String::new(),
            })
            .label_style(("sans-serif", 12, &LABEL))
            .axis_style(AXIS)
            .draw()?;

        chart
            .configure_secondary_axes()
            .y_desc("Peak")
            .label_style(("sans-serif", 12, &LABEL))
            .axis_style(AXIS)
            .draw()?;

        let energy_bars = Histogram::vertical(&*chart)
            .style(ENERGY.filled())
            .margin(8)
            .data(
                table
                    .rows()
                    .iter()
                    .filter_map(|r| r.energy_sum.map(|e| (r.month.month(), e))),
            );

        chart
            .draw_series(energy_bars)?
            .label("Energy")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], ENERGY.filled()));

        chart
            .draw_secondary_series(LineSeries::new(
                table
                    .rows()
                    .iter()
                    .filter_map(|r| r.peak.map(|p| (SegmentValue::CenterOf(r.month.month()), p))),
                PEAK.stroke_width(2),
            ))?
            .label("Peak")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], PEAK.stroke_width(2)));

        chart
            .configure_series_labels()
            .background_style(BACKGROUND.mix(0.8))
            .border_style(AXIS)
            .label_font(("sans-serif", 12, &LABEL))
            .draw()?;

        root.present()?;
    }

    Ok(svg_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lastgang_core::{AnalysisParams, Series, analyze};

    fn sample_analysis() -> lastgang_core::Analysis {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let series = Series::from_pairs(
            (0..8).map(|i| (start + TimeDelta::minutes(15 * i), f64::from(u32::try_from(i).unwrap()))),
        )
        .unwrap();
        analyze([series], &AnalysisParams::default()).unwrap()
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(12), "Dec");
        assert_eq!(month_label(0), "");
        assert_eq!(month_label(13), "");
    }

    #[test]
    fn test_value_range_has_headroom() {
        assert_eq!(value_range(0.0, 100.0), (0.0, 110.0));
        let (low, high) = value_range(-10.0, 10.0);
        assert!(low < -10.0);
        assert!(high > 10.0);
    }

    #[test]
    fn test_load_curve_chart_renders_svg() {
        let analysis = sample_analysis();
        let svg = load_curve_chart_svg(&analysis.composite, 800, 400).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Composite load curve"));
    }

    #[test]
    fn test_monthly_chart_renders_svg() {
        let analysis = sample_analysis();
        let svg = monthly_chart_svg(&analysis.table, 800, 400).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Monthly energy and peak load 2024"));
    }
}
