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

//! Error types for the load curve engine

use thiserror::Error;

use crate::monthly::Column;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadCurveError {
    /// Empty or malformed input: empty series, empty series list, unsorted or
    /// duplicate timestamps, non-positive interval, implausible year.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("step '{step}' requires column '{column}' which has not been computed yet")]
    MissingColumn { step: &'static str, column: Column },
}

impl LoadCurveError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, LoadCurveError>;
