//! winereg - Main Entry Point
//!
//! Fits an OLS wine quality model and answers prediction queries from the
//! command line.

use clap::Parser;
use winereg::cli::{cmd_export, cmd_predict, cmd_summary, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "winereg=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { data } => cmd_summary(&data)?,
        Commands::Predict {
            data,
            alcohol,
            volatile_acidity,
            sulphates,
            citric_acid,
            density,
            confidence,
        } => cmd_predict(
            &data,
            [alcohol, volatile_acidity, sulphates, citric_acid, density],
            confidence,
        )?,
        Commands::Export { data, output } => cmd_export(&data, &output)?,
    }

    Ok(())
}
