// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Lastgang.

//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::config::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "lastgang")]
#[command(author, version, about = "Lastgang load curve analysis CLI")]
#[command(
    long_about = "Monthly demand statistics from interval-metered load curves.\n\
    \nReads one or more meter exports (xlsx, xls, ods or csv; first column timestamp,\n\
    second column power), fills gaps in the time axis, sums all meters into one\n\
    composite load curve and reports energy, peak, threshold counts and full-load\n\
    hours for every month of a year.\n\
    \nExamples:\n  \
    lastgang analyze meter1.xlsx meter2.xlsx --year 2024 --threshold 500\n  \
    lastgang analyze *.xlsx --config lastgang.toml --output json --out stats.json\n  \
    lastgang regularize meter1.csv --interval-minutes 15 --out filled.csv"
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyse one or more load curves and print the monthly table
    #[command(
        long_about = "Run the full analysis: regularize every file, combine them and\n\
        compute the monthly statistics for the configured year.\n\
        \nExamples:\n  \
        lastgang analyze meter.xlsx\n  \
        lastgang analyze a.xlsx b.xlsx --year 2023 --interval-minutes 15 --threshold 500\n  \
        lastgang analyze a.xlsx --chart-dir charts --composite-csv composite.csv"
    )]
    Analyze(AnalyzeArgs),

    /// Fill gaps in a single load curve and write it as CSV
    #[command(
        long_about = "Regularize one file to the sampling interval, inserting zero readings\n\
        where samples are missing. Output columns: timestamp,value.\n\
        \nExamples:\n  \
        lastgang regularize meter.xlsx\n  \
        lastgang regularize meter.csv --interval-minutes 60 --out hourly.csv"
    )]
    Regularize(RegularizeArgs),
}

#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Load curve files
    #[arg(value_name = "FILE", help = "Load curve files (xlsx, xls, ods, csv)")]
    pub files: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(
        long,
        value_name = "PATH",
        help = "Path to lastgang.toml",
        long_help = "TOML file with [analysis], [input] and [output] sections.\n\
          Command-line flags override values from the file."
    )]
    pub config: Option<PathBuf>,

    /// Year to analyse (1900-2100)
    #[arg(long, help = "Calendar year of the monthly table")]
    pub year: Option<i32>,

    /// Sampling interval in minutes
    #[arg(long, value_name = "MINUTES", help = "Nominal sampling interval (default 15)")]
    pub interval_minutes: Option<i64>,

    /// Power threshold for the count columns
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Readings strictly above this value count as above (default 0)"
    )]
    pub threshold: Option<f64>,

    /// Output format: table, csv or json
    #[arg(long, value_enum, help = "How to render the monthly table")]
    pub output: Option<OutputFormat>,

    /// Write the monthly table to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Export the composite load curve as CSV
    #[arg(long, value_name = "PATH", help = "Where to save the composite load curve")]
    pub composite_csv: Option<PathBuf>,

    /// Render SVG charts into this directory
    #[arg(
        long,
        value_name = "DIR",
        help = "Directory for load_curve.svg and monthly.svg",
        long_help = "Writes two charts:\n  \
          - load_curve.svg: the composite load curve over time\n  \
          - monthly.svg: monthly energy (bars) and monthly peak (line)"
    )]
    pub chart_dir: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct RegularizeArgs {
    /// Load curve file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Sampling interval in minutes
    #[arg(long, value_name = "MINUTES")]
    pub interval_minutes: Option<i64>,

    /// Write the regularized series to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}
