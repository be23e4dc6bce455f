// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Lastgang.

//! Subcommand handlers.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use lastgang_core::{Analysis, Series, analyze, regularize};
use tracing::{info, warn};

use super::args::{AnalyzeArgs, RegularizeArgs};
use super::charts::{load_curve_chart_svg, monthly_chart_svg};
use super::config::{AnalysisConfig, InputSettings, OutputFormat};
use super::formatters::{CsvFormatter, JsonFormatter, TableFormatter};
use super::loaders::loader_for;

pub const NO_DATA_MESSAGE: &str = "No data to display. Please supply valid load curve files.";

const CHART_WIDTH: u32 = 1200;
const CHART_HEIGHT: u32 = 500;

/// Open `path` for writing, or stdout when unset
fn output_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn load_series(path: &Path, input: &InputSettings) -> Result<Series> {
    loader_for(path, input)?.load(path)
}

/// `lastgang analyze`
pub fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let mut config = AnalysisConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.year, args.interval_minutes, args.threshold, args.output);
    config.validate()?;

    let mut sources = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let series = load_series(path, &config.input)?;
        if series.is_empty() {
            warn!(file = %path.display(), "Skipping file without readings");
        } else {
            sources.push(series);
        }
    }

    if sources.is_empty() {
        let mut out = output_writer(args.out.as_deref())?;
        writeln!(out, "{NO_DATA_MESSAGE}")?;
        out.flush()?;
        return Ok(());
    }

    let params = config.params();
    let analysis = analyze(sources, &params).context("Analysis failed")?;

    // created only after a successful analysis
    let mut out = output_writer(args.out.as_deref())?;
    write_table(&analysis, &config, &mut out)?;
    out.flush()?;

    if let Some(path) = &args.composite_csv {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        CsvFormatter::write_series(&analysis.composite, BufWriter::new(file))?;
        info!("Composite load curve written to {}", path.display());
    }

    if let Some(dir) = &args.chart_dir {
        write_charts(&analysis, dir)?;
    }

    Ok(())
}

fn write_table(analysis: &Analysis, config: &AnalysisConfig, out: &mut dyn Write) -> Result<()> {
    match config.output.format {
        OutputFormat::Table => {
            let text = TableFormatter::format_table(&analysis.table, config.analysis.threshold);
            out.write_all(text.as_bytes())?;
        }
        OutputFormat::Csv => CsvFormatter::write_table(&analysis.table, out)?,
        OutputFormat::Json => writeln!(out, "{}", JsonFormatter::format_table(&analysis.table)?)?,
    }
    Ok(())
}

fn write_charts(analysis: &Analysis, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let curve = load_curve_chart_svg(&analysis.composite, CHART_WIDTH, CHART_HEIGHT)?;
    let curve_path = dir.join("load_curve.svg");
    fs::write(&curve_path, curve)
        .with_context(|| format!("Failed to write {}", curve_path.display()))?;

    let monthly = monthly_chart_svg(&analysis.table, CHART_WIDTH, CHART_HEIGHT)?;
    let monthly_path = dir.join("monthly.svg");
    fs::write(&monthly_path, monthly)
        .with_context(|| format!("Failed to write {}", monthly_path.display()))?;

    info!("Charts written to {}", dir.display());
    Ok(())
}

/// `lastgang regularize`
pub fn run_regularize(args: &RegularizeArgs) -> Result<()> {
    let mut config = AnalysisConfig::load(args.config.as_deref())?;
    config.apply_overrides(None, args.interval_minutes, None, None);
    config.validate()?;

    let series = load_series(&args.file, &config.input)?;
    if series.is_empty() {
        bail!("No valid readings found in {}", args.file.display());
    }
    let before = series.len();
    let filled = regularize(series, config.interval())
        .with_context(|| format!("Failed to regularize {}", args.file.display()))?;
    info!(
        file = %args.file.display(),
        readings = before,
        inserted = filled.len() - before,
        "Regularized load curve"
    );

    let mut out = output_writer(args.out.as_deref())?;
    CsvFormatter::write_series(&filled, &mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn analyze_args(files: Vec<PathBuf>, out: PathBuf) -> AnalyzeArgs {
        AnalyzeArgs {
            files,
            config: None,
            year: Some(2024),
            interval_minutes: None,
            threshold: Some(500.0),
            output: Some(OutputFormat::Csv),
            out: Some(out),
            composite_csv: None,
            chart_dir: None,
        }
    }

    #[test]
    fn test_analyze_without_files_prints_no_data_message() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");

        run_analyze(&analyze_args(Vec::new(), out.clone())).unwrap();

        assert_eq!(fs::read_to_string(out).unwrap().trim(), NO_DATA_MESSAGE);
    }

    #[test]
    fn test_analyze_with_only_empty_files_prints_no_data_message() {
        let dir = tempfile::tempdir().unwrap();
        let header_only = write_file(dir.path(), "header.csv", "ts,kw\n");
        let garbage = write_file(dir.path(), "garbage.csv", "ts,kw\nfoo,bar\n");
        let out = dir.path().join("out.txt");

        run_analyze(&analyze_args(vec![header_only, garbage], out.clone())).unwrap();

        assert_eq!(fs::read_to_string(out).unwrap().trim(), NO_DATA_MESSAGE);
    }

    #[test]
    fn test_analyze_skips_empty_file_next_to_valid_one() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write_file(dir.path(), "empty.csv", "ts,kw\n");
        let meter = write_file(
            dir.path(),
            "meter.csv",
            "ts,kw\n2024-02-01 00:00:00,800\n2024-02-01 00:15:00,400\n",
        );
        let out = dir.path().join("table.csv");

        run_analyze(&analyze_args(vec![empty, meter], out.clone())).unwrap();

        let table = fs::read_to_string(out).unwrap();
        assert_eq!(table.lines().nth(2).unwrap(), "2024-02,300,800,1,1,50,0");
    }

    #[test]
    fn test_failed_analyze_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let unsorted = write_file(
            dir.path(),
            "unsorted.csv",
            "ts,kw\n2024-01-01 00:15:00,1\n2024-01-01 00:00:00,2\n",
        );
        let out = dir.path().join("table.csv");
        fs::write(&out, "previous result\n").unwrap();

        assert!(run_analyze(&analyze_args(vec![unsorted], out.clone())).is_err());
        assert_eq!(fs::read_to_string(out).unwrap(), "previous result\n");
    }

    #[test]
    fn test_analyze_combines_files_and_writes_exports() {
        let dir = tempfile::tempdir().unwrap();
        let one = write_file(
            dir.path(),
            "one.csv",
            "ts,kw\n2024-01-01 00:00:00,400\n2024-01-01 00:15:00,300\n2024-01-01 00:45:00,200\n",
        );
        let two = write_file(
            dir.path(),
            "two.csv",
            "ts,kw\n2024-01-01 00:00:00,200\n2024-01-01 00:15:00,300\n2024-01-01 00:30:00,250\n\
             2024-01-01 00:45:00,100\n2024-01-01 01:00:00,150\n2024-01-01 02:00:00,520\n",
        );
        let out = dir.path().join("table.csv");
        let composite = dir.path().join("composite.csv");
        let charts = dir.path().join("charts");

        let mut args = analyze_args(vec![one, two], out.clone());
        args.composite_csv = Some(composite.clone());
        args.chart_dir = Some(charts.clone());
        run_analyze(&args).unwrap();

        let table = fs::read_to_string(out).unwrap();
        let january = table.lines().nth(1).unwrap();
        assert_eq!(january, "2024-01,605,600,3,6,33.33,1");

        let composite = fs::read_to_string(composite).unwrap();
        assert_eq!(composite.lines().count(), 10);
        assert!(composite.contains("2024-01-01 01:15:00,0"));

        assert!(charts.join("load_curve.svg").exists());
        assert!(charts.join("monthly.svg").exists());
    }

    #[test]
    fn test_analyze_fails_on_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let out = dir.path().join("out.txt");

        assert!(run_analyze(&analyze_args(vec![missing], out)).is_err());
    }

    #[test]
    fn test_regularize_writes_filled_series() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(
            dir.path(),
            "meter.csv",
            "ts,kw\n2024-01-01 00:00:00,1\n2024-01-01 01:00:00,2\n",
        );
        let out = dir.path().join("filled.csv");

        run_regularize(&RegularizeArgs {
            file: input,
            config: None,
            interval_minutes: Some(15),
            out: Some(out.clone()),
        })
        .unwrap();

        assert_eq!(
            fs::read_to_string(out).unwrap(),
            "timestamp,value\n\
             2024-01-01 00:00:00,1\n\
             2024-01-01 00:15:00,0\n\
             2024-01-01 00:30:00,0\n\
             2024-01-01 00:45:00,0\n\
             2024-01-01 01:00:00,2\n"
        );
    }

    #[test]
    fn test_regularize_rejects_file_without_readings() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "empty.csv", "ts,kw\n");
        let out = dir.path().join("filled.csv");

        let err = run_regularize(&RegularizeArgs {
            file: input,
            config: None,
            interval_minutes: None,
            out: Some(out.clone()),
        })
        .unwrap_err();

        assert!(err.to_string().contains("No valid readings"));
        assert!(!out.exists());
    }
}
