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
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lastgang_cli::cli::{Cli, Commands, commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respects RUST_LOG; logs go to stderr so stdout carries only results
    let default_level = if cli.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Analyze(args) => commands::run_analyze(args),
        Commands::Regularize(args) => commands::run_regularize(args),
    }
}
