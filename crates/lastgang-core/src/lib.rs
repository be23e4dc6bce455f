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

//! Lastgang load curve engine
//!
//! Turns interval-metered power readings from one or more meters into a
//! monthly demand summary.
//!
//! ## Pipeline
//!
//! - **Regularize**: fill missing samples of each meter with zero readings
//! - **Combine**: sum all meters into one composite load curve
//! - **Aggregate**: energy, peak, threshold counts and full-load hours per month
//!
//! Everything here is a pure in-memory transform; reading spreadsheets and
//! rendering results is left to the caller.

pub mod combine;
pub mod error;
pub mod monthly;
pub mod pipeline;
pub mod regularize;
pub mod series;

pub use combine::combine;
pub use error::{LoadCurveError, Result};
pub use monthly::{
    AggregationStep, Column, MonthlyAggregator, MonthlyRow, MonthlySamples, MonthlyTable,
    YearMonth,
};
pub use pipeline::{Analysis, AnalysisParams, analyze, monthly_statistics};
pub use regularize::regularize;
pub use series::{CompositeSeries, Series, TimePoint};
