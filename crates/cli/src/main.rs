//! Prediction Service CLI
//!
//! A command-line tool for checking service health, listing models and
//! requesting trajectory, anomaly and threat predictions.

use anyhow::Result;
use clap::{Parser, Subcommand};
use engine_lib::{AnomalyDetectionRequest, ThreatAssessmentRequest, TrajectoryRequest};
use ps_cli::client::{ApiClient, ApiError};
use ps_cli::commands::{predict, status};
use ps_cli::output::{self, print_error};

/// Prediction Service CLI
#[derive(Parser)]
#[command(name = "psctl")]
#[command(author, version, about = "CLI for the Prediction Service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via PSCTL_API_URL env var)
    #[arg(long, env = "PSCTL_API_URL", default_value = "http://localhost:8001")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show service health
    Health,

    /// List registered models
    Models,

    /// Predict an aircraft trajectory
    Trajectory {
        /// ICAO 24-bit address of the aircraft
        #[arg(long)]
        icao24: String,

        /// Current latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Current longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Current altitude, negative below the datum
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        alt: f64,

        /// Ground speed in m/s
        #[arg(long)]
        velocity: f64,

        /// Heading in degrees clockwise from north
        #[arg(long)]
        heading: f64,
    },

    /// Detect anomalies in a series of values
    Anomalies {
        /// Comma-separated values, e.g. 1,2,3
        #[arg(long, allow_hyphen_values = true)]
        values: String,

        /// Z-score threshold
        #[arg(long, default_value_t = 2.0)]
        threshold: f64,

        /// Label for the series
        #[arg(long, default_value = "generic")]
        data_type: String,
    },

    /// Assess a threat from indicators
    Threat {
        /// Indicator name (repeatable)
        #[arg(long = "indicator", required = true)]
        indicators: Vec<String>,

        /// Confidence in the source, between 0 and 1
        #[arg(long, default_value_t = 1.0)]
        confidence: f64,

        /// Kind of source reporting the indicators
        #[arg(long, default_value = "sensor")]
        source_type: String,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let client = ApiClient::new(&cli.api_url)?;

    match cli.command {
        Commands::Health => status::show_health(&client, cli.format).await?,
        Commands::Models => status::list_models(&client, cli.format).await?,
        Commands::Trajectory {
            icao24,
            lat,
            lon,
            alt,
            velocity,
            heading,
        } => {
            let request = TrajectoryRequest {
                icao24,
                latitude: lat,
                longitude: lon,
                altitude: alt,
                velocity,
                heading,
                historical_positions: Vec::new(),
            };
            predict::predict_trajectory(&client, request, cli.format).await?;
        }
        Commands::Anomalies {
            values,
            threshold,
            data_type,
        } => {
            let request = AnomalyDetectionRequest {
                data_type,
                values: predict::parse_values(&values)?,
                threshold,
            };
            predict::detect_anomalies(&client, request, cli.format).await?;
        }
        Commands::Threat {
            indicators,
            confidence,
            source_type,
        } => {
            let request = ThreatAssessmentRequest {
                source_type,
                location: Default::default(),
                indicators,
                confidence_level: confidence,
            };
            predict::assess_threat(&client, request, cli.format).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ApiError>() {
            Some(api_err) if api_err.is_unavailable() => {
                print_error(&format!("Service unavailable: {}", api_err.message));
            }
            _ => print_error(&format!("{:#}", e)),
        }
        std::process::exit(1);
    }
}
