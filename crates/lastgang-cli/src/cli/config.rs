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

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use lastgang_core::AnalysisParams;
use lastgang_core::pipeline::{DEFAULT_INTERVAL_MINUTES, YEAR_RANGE};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: i64,
    #[serde(default)]
    pub threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputSettings {
    /// Worksheet to read; first sheet when unset
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,
    /// chrono formats tried in order for textual timestamps
    #[serde(default = "default_timestamp_formats")]
    pub timestamp_formats: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

fn default_year() -> i32 {
    2024
}

fn default_interval_minutes() -> i64 {
    DEFAULT_INTERVAL_MINUTES
}

fn default_csv_delimiter() -> char {
    ','
}

fn default_timestamp_formats() -> Vec<String> {
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%d.%m.%Y %H:%M:%S",
        "%d.%m.%Y %H:%M",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            year: default_year(),
            interval_minutes: default_interval_minutes(),
            threshold: 0.0,
        }
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            sheet: None,
            csv_delimiter: default_csv_delimiter(),
            timestamp_formats: default_timestamp_formats(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Defaults, or the given file on top of the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Command-line flags win over file values
    pub fn apply_overrides(
        &mut self,
        year: Option<i32>,
        interval_minutes: Option<i64>,
        threshold: Option<f64>,
        output: Option<OutputFormat>,
    ) {
        if let Some(year) = year {
            self.analysis.year = year;
        }
        if let Some(minutes) = interval_minutes {
            self.analysis.interval_minutes = minutes;
        }
        if let Some(threshold) = threshold {
            self.analysis.threshold = threshold;
        }
        if let Some(format) = output {
            self.output.format = format;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !YEAR_RANGE.contains(&self.analysis.year) {
            bail!(
                "analysis.year must be between {} and {}, got {}",
                YEAR_RANGE.start(),
                YEAR_RANGE.end(),
                self.analysis.year
            );
        }
        if self.analysis.interval_minutes < 1 {
            bail!(
                "analysis.interval_minutes must be at least 1, got {}",
                self.analysis.interval_minutes
            );
        }
        if self.analysis.interval_minutes > 24 * 60 {
            bail!("analysis.interval_minutes cannot exceed one day");
        }
        if !self.analysis.threshold.is_finite() {
            bail!("analysis.threshold must be a finite number");
        }
        if !self.input.csv_delimiter.is_ascii() {
            bail!("input.csv_delimiter must be a single ASCII character");
        }
        if self.input.timestamp_formats.is_empty() {
            bail!("input.timestamp_formats must contain at least one format");
        }
        Ok(())
    }

    #[must_use]
    pub fn interval(&self) -> TimeDelta {
        TimeDelta::minutes(self.analysis.interval_minutes)
    }

    #[must_use]
    pub fn params(&self) -> AnalysisParams {
        AnalysisParams::new(self.analysis.year, self.interval(), self.analysis.threshold)
    }
}
