//! Command-line interface
//!
//! Presentation consumer of the regression engine: renders the model
//! summary and prediction results. All library errors surface here as
//! printed messages rather than panics.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use crate::cache::SessionCache;
use crate::regression::{predict, PredictionQuery, DEFAULT_CONFIDENCE};

#[derive(Parser)]
#[command(
    name = "winereg",
    about = "Wine quality regression: OLS fit and interval predictions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit the model and print the coefficient table
    Summary {
        /// Path to the delimited wine quality file
        #[arg(long)]
        data: PathBuf,
    },
    /// Predict quality for a feature vector
    Predict {
        /// Path to the delimited wine quality file
        #[arg(long)]
        data: PathBuf,
        /// Alcohol (%)
        #[arg(long, default_value_t = 10.0)]
        alcohol: f64,
        /// Volatile acidity (g/dm³)
        #[arg(long, default_value_t = 0.5)]
        volatile_acidity: f64,
        /// Sulphates (g/dm³)
        #[arg(long, default_value_t = 0.65)]
        sulphates: f64,
        /// Citric acid (g/dm³)
        #[arg(long, default_value_t = 0.25)]
        citric_acid: f64,
        /// Density (g/cm³)
        #[arg(long, default_value_t = 0.995)]
        density: f64,
        /// Confidence level for the prediction interval
        #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
        confidence: f64,
    },
    /// Fit the model and write it as JSON
    Export {
        /// Path to the delimited wine quality file
        #[arg(long)]
        data: PathBuf,
        /// Output path for the serialized model
        #[arg(long)]
        output: PathBuf,
    },
}

pub fn cmd_summary(data: &PathBuf) -> anyhow::Result<()> {
    let cache = SessionCache::new();
    let model = cache.model(data)?;
    println!("{}", "Wine Quality — OLS Summary".bold());
    println!("{}", model.summary());
    Ok(())
}

pub fn cmd_predict(
    data: &PathBuf,
    features: [f64; 5],
    confidence: f64,
) -> anyhow::Result<()> {
    let cache = SessionCache::new();
    let model = cache.model(data)?;
    let [alcohol, volatile_acidity, sulphates, citric_acid, density] = features;
    let query =
        PredictionQuery::from_features(alcohol, volatile_acidity, sulphates, citric_acid, density);
    let result = predict(&model, &query, confidence)?;

    println!(
        "{} {}",
        "predicted quality:".bold(),
        format!("{:.2}", result.estimate).green()
    );
    println!(
        "{:.0}% prediction interval: {:.2} – {:.2}",
        result.confidence * 100.0,
        result.lower,
        result.upper
    );
    Ok(())
}

pub fn cmd_export(data: &PathBuf, output: &PathBuf) -> anyhow::Result<()> {
    let cache = SessionCache::new();
    let model = cache.model(data)?;
    let json = serde_json::to_string_pretty(model.as_ref())?;
    std::fs::write(output, json)?;
    println!("model written to {}", output.display());
    Ok(())
}
