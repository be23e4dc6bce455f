// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Lastgang.

//! CLI module for the load curve analyser.

pub mod args;
pub mod charts;
pub mod commands;
pub mod config;
pub mod formatters;
pub mod loaders;

pub use args::{AnalyzeArgs, Cli, Commands, RegularizeArgs};
pub use config::{AnalysisConfig, OutputFormat};
pub use formatters::{CsvFormatter, JsonFormatter, TableFormatter};
pub use loaders::{CsvLoader, SeriesLoader, SpreadsheetLoader, loader_for};
