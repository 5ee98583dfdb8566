//! Prediction commands: trajectory, anomaly detection and threat assessment

use anyhow::Result;
use engine_lib::{AnomalyDetectionRequest, ThreatAssessmentRequest, TrajectoryRequest};
use tabled::Tabled;

use crate::client::{ApiClient, Envelope};
use crate::output::{
    color_confidence, color_level, format_timestamp, print_info, print_json, print_success,
    print_table, OutputFormat,
};

/// Row for predicted positions table
#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "T+ (s)")]
    timestamp: u32,
    #[tabled(rename = "Latitude")]
    latitude: String,
    #[tabled(rename = "Longitude")]
    longitude: String,
    #[tabled(rename = "Altitude")]
    altitude: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
}

/// Row for anomalies table
#[derive(Tabled)]
struct AnomalyRow {
    #[tabled(rename = "Index")]
    index: usize,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Z-Score")]
    z_score: String,
    #[tabled(rename = "Severity")]
    severity: String,
}

/// Row for triggered indicators table
#[derive(Tabled)]
struct IndicatorRow {
    #[tabled(rename = "Indicator")]
    indicator: String,
    #[tabled(rename = "Weight")]
    weight: String,
}

/// Comma-separated list of numbers, as accepted by `--values`
pub fn parse_values(raw: &str) -> Result<Vec<f64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|e| anyhow::anyhow!("Invalid value '{}': {}", s, e))
        })
        .collect()
}

fn print_envelope_footer<T>(envelope: &Envelope<T>) {
    print_info(&format!(
        "model {} answered in {:.3} ms at {}",
        envelope.model_version,
        envelope.processing_time_ms,
        format_timestamp(&envelope.timestamp)
    ));
}

/// Extrapolate an aircraft's path
pub async fn predict_trajectory(
    client: &ApiClient,
    request: TrajectoryRequest,
    format: OutputFormat,
) -> Result<()> {
    let envelope = client.predict_trajectory(&request).await?;

    match format {
        OutputFormat::Json => print_json(&envelope)?,
        OutputFormat::Table => {
            let prediction = &envelope.result;
            let rows: Vec<PositionRow> = prediction
                .predicted_positions
                .iter()
                .map(|p| PositionRow {
                    timestamp: p.timestamp,
                    latitude: format!("{:.5}", p.latitude),
                    longitude: format!("{:.5}", p.longitude),
                    altitude: format!("{:.0}", p.altitude),
                    confidence: color_confidence(p.confidence),
                })
                .collect();

            println!("Trajectory for {}", request.icao24);
            print_table(&rows, "No positions predicted");
            println!(
                "Overall confidence: {}",
                color_confidence(prediction.confidence_score)
            );
            let eta = &prediction.estimated_arrival;
            println!(
                "Estimated arrival:  T+{}s at ({:.5}, {:.5})",
                eta.timestamp, eta.latitude, eta.longitude
            );
            print_envelope_footer(&envelope);
        }
    }

    Ok(())
}

/// Flag outliers in a series of values
pub async fn detect_anomalies(
    client: &ApiClient,
    request: AnomalyDetectionRequest,
    format: OutputFormat,
) -> Result<()> {
    let envelope = client.detect_anomalies(&request).await?;

    match format {
        OutputFormat::Json => print_json(&envelope)?,
        OutputFormat::Table => {
            let report = &envelope.result;
            println!(
                "Series '{}': mean {:.4}, std {:.4}, threshold {}",
                request.data_type, report.mean, report.std, report.threshold
            );

            if report.anomaly_count == 0 {
                print_success("No anomalies detected");
            } else {
                let rows: Vec<AnomalyRow> = report
                    .anomalies
                    .iter()
                    .map(|a| AnomalyRow {
                        index: a.index,
                        value: format!("{}", a.value),
                        z_score: format!("{:.3}", a.z_score),
                        severity: color_level(a.severity.as_str()),
                    })
                    .collect();
                print_table(&rows, "No anomalies detected");
                println!("{} anomalies found", report.anomaly_count);
            }
            print_envelope_footer(&envelope);
        }
    }

    Ok(())
}

/// Score a set of threat indicators
pub async fn assess_threat(
    client: &ApiClient,
    request: ThreatAssessmentRequest,
    format: OutputFormat,
) -> Result<()> {
    let envelope = client.assess_threat(&request).await?;

    match format {
        OutputFormat::Json => print_json(&envelope)?,
        OutputFormat::Table => {
            let assessment = &envelope.result;
            println!(
                "Threat level: {} (score {:.3}, confidence {})",
                color_level(assessment.threat_level.as_str()),
                assessment.threat_score,
                color_confidence(assessment.confidence)
            );

            let rows: Vec<IndicatorRow> = assessment
                .triggered_indicators
                .iter()
                .map(|t| IndicatorRow {
                    indicator: t.indicator.clone(),
                    weight: format!("{:.2}", t.weight),
                })
                .collect();
            print_table(&rows, "No indicators supplied");

            println!("Recommendations:");
            for recommendation in &assessment.recommendations {
                println!("  - {}", recommendation);
            }
            print_envelope_footer(&envelope);
        }
    }

    Ok(())
}
