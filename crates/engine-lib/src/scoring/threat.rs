//! Weighted threat scoring
//!
//! Sums fixed per-indicator weights, scales by the reported confidence and
//! maps the score onto a threat level with canned recommendations.

use super::{ensure_finite, ScoringError, ScoringModel};
use crate::models::{
    ModelKind, PredictionOutput, PredictionRequest, ThreatAssessment, ThreatAssessmentRequest,
    ThreatLevel, TriggeredIndicator,
};

/// Weights for known indicators
pub const INDICATOR_WEIGHTS: &[(&str, f64)] = &[
    ("unusual_activity", 0.3),
    ("proximity_alert", 0.25),
    ("communication_anomaly", 0.2),
    ("pattern_deviation", 0.15),
    ("unauthorized_access", 0.1),
];

/// Weight for indicators missing from [`INDICATOR_WEIGHTS`]
pub const DEFAULT_INDICATOR_WEIGHT: f64 = 0.1;

const CRITICAL_ABOVE: f64 = 0.7;
const HIGH_ABOVE: f64 = 0.5;
const MEDIUM_ABOVE: f64 = 0.3;

const RECOMMENDATIONS: &[(&str, &[&str])] = &[
    ("low", &["Continue monitoring", "Log activity"]),
    ("medium", &["Increase monitoring frequency", "Notify supervisor"]),
    (
        "high",
        &[
            "Alert security team",
            "Prepare countermeasures",
            "Document evidence",
        ],
    ),
    (
        "critical",
        &[
            "Immediate response required",
            "Activate emergency protocols",
            "Notify all stakeholders",
        ],
    ),
];

const FALLBACK_RECOMMENDATION: &str = "Assess situation";

/// Weight of a single indicator label
pub fn indicator_weight(indicator: &str) -> f64 {
    INDICATOR_WEIGHTS
        .iter()
        .find(|(name, _)| *name == indicator)
        .map(|(_, weight)| *weight)
        .unwrap_or(DEFAULT_INDICATOR_WEIGHT)
}

/// Recommendations for a threat level label
pub fn recommendations_for(level: &str) -> Vec<String> {
    RECOMMENDATIONS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, recs)| recs.iter().map(|r| r.to_string()).collect())
        .unwrap_or_else(|| vec![FALLBACK_RECOMMENDATION.to_string()])
}

fn level_for_score(score: f64) -> ThreatLevel {
    if score > CRITICAL_ABOVE {
        ThreatLevel::Critical
    } else if score > HIGH_ABOVE {
        ThreatLevel::High
    } else if score > MEDIUM_ABOVE {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    }
}

/// Round to three decimals on the exact decimal value, ties to even
fn round_to_millis(value: f64) -> f64 {
    format!("{:.3}", value).parse().unwrap_or(value)
}

/// Scores threat indicators reported by a source
#[derive(Debug, Default, Clone)]
pub struct ThreatAssessor;

impl ThreatAssessor {
    pub fn new() -> Self {
        Self
    }

    /// Assess a set of indicators.
    ///
    /// Repeated indicators are counted once per occurrence.
    // TODO: decide whether repeated indicators should be deduplicated before weighting
    pub fn assess(
        &self,
        request: &ThreatAssessmentRequest,
    ) -> Result<ThreatAssessment, ScoringError> {
        let triggered_indicators: Vec<TriggeredIndicator> = request
            .indicators
            .iter()
            .map(|indicator| TriggeredIndicator {
                indicator: indicator.clone(),
                weight: indicator_weight(indicator),
                triggered: true,
            })
            .collect();

        let raw_score: f64 = triggered_indicators.iter().map(|t| t.weight).sum::<f64>()
            * request.confidence_level;
        let raw_score = ensure_finite("threat_score", raw_score)?;

        let threat_level = level_for_score(raw_score);

        Ok(ThreatAssessment {
            threat_level,
            threat_score: round_to_millis(raw_score),
            confidence: request.confidence_level,
            triggered_indicators,
            recommendations: recommendations_for(threat_level.as_str()),
        })
    }
}

impl ScoringModel for ThreatAssessor {
    fn kind(&self) -> ModelKind {
        ModelKind::ThreatAssessor
    }

    fn score(&self, request: &PredictionRequest) -> Result<PredictionOutput, ScoringError> {
        match request {
            PredictionRequest::Threat(req) => self.assess(req).map(PredictionOutput::Threat),
            other => Err(ScoringError::KindMismatch {
                model: self.kind(),
                received: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(indicators: &[&str], confidence_level: f64) -> ThreatAssessmentRequest {
        ThreatAssessmentRequest {
            source_type: "radar".to_string(),
            location: HashMap::from([("lat".to_string(), 48.85), ("lon".to_string(), 2.35)]),
            indicators: indicators.iter().map(|s| s.to_string()).collect(),
            confidence_level,
        }
    }

    #[test]
    fn test_known_weights_sum_to_one() {
        let total: f64 = INDICATOR_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_indicators_score_high() {
        let assessment = ThreatAssessor::new()
            .assess(&request(&["unusual_activity", "proximity_alert"], 1.0))
            .unwrap();

        assert_eq!(assessment.threat_score, 0.55);
        assert_eq!(assessment.threat_level, ThreatLevel::High);
        assert_eq!(
            assessment.recommendations,
            vec![
                "Alert security team",
                "Prepare countermeasures",
                "Document evidence"
            ]
        );
    }

    #[test]
    fn test_unknown_indicator_uses_default_weight() {
        let assessment = ThreatAssessor::new()
            .assess(&request(&["strange_noise"], 1.0))
            .unwrap();

        assert_eq!(assessment.triggered_indicators[0].weight, DEFAULT_INDICATOR_WEIGHT);
        assert_eq!(assessment.threat_score, 0.1);
        assert_eq!(assessment.threat_level, ThreatLevel::Low);
    }

    #[test]
    fn test_duplicate_indicators_are_counted_each_time() {
        let assessment = ThreatAssessor::new()
            .assess(&request(
                &["unusual_activity", "unusual_activity", "unusual_activity"],
                1.0,
            ))
            .unwrap();

        assert_eq!(assessment.triggered_indicators.len(), 3);
        assert_eq!(assessment.threat_score, 0.9);
        assert_eq!(assessment.threat_level, ThreatLevel::Critical);
    }

    #[test]
    fn test_confidence_scales_score() {
        let assessment = ThreatAssessor::new()
            .assess(&request(&["unusual_activity", "proximity_alert"], 0.5))
            .unwrap();

        assert_eq!(assessment.threat_score, 0.275);
        assert_eq!(assessment.threat_level, ThreatLevel::Low);
        assert_eq!(assessment.confidence, 0.5);
    }

    #[test]
    fn test_score_rounding_ties_to_even() {
        let assessment = ThreatAssessor::new()
            .assess(&request(&["proximity_alert"], 0.25))
            .unwrap();

        // 0.25 * 0.25 = 0.0625 exactly
        assert_eq!(assessment.threat_score, 0.062);
        assert_eq!(assessment.threat_level, ThreatLevel::Low);

        assert_eq!(round_to_millis(0.0635), 0.064);
        assert_eq!(round_to_millis(0.1234), 0.123);
        assert_eq!(round_to_millis(0.0), 0.0);
    }

    #[test]
    fn test_level_thresholds_are_strict() {
        assert_eq!(level_for_score(0.3), ThreatLevel::Low);
        assert_eq!(level_for_score(0.31), ThreatLevel::Medium);
        assert_eq!(level_for_score(0.5), ThreatLevel::Medium);
        assert_eq!(level_for_score(0.7), ThreatLevel::High);
        assert_eq!(level_for_score(0.71), ThreatLevel::Critical);
    }

    #[test]
    fn test_triggered_indicators_keep_request_order() {
        let assessment = ThreatAssessor::new()
            .assess(&request(&["pattern_deviation", "communication_anomaly"], 1.0))
            .unwrap();

        let names: Vec<&str> = assessment
            .triggered_indicators
            .iter()
            .map(|t| t.indicator.as_str())
            .collect();
        assert_eq!(names, vec!["pattern_deviation", "communication_anomaly"]);
        assert!(assessment.triggered_indicators.iter().all(|t| t.triggered));
        assert_eq!(assessment.threat_level, ThreatLevel::Medium);
    }

    #[test]
    fn test_no_indicators_is_low() {
        let assessment = ThreatAssessor::new().assess(&request(&[], 1.0)).unwrap();

        assert_eq!(assessment.threat_score, 0.0);
        assert_eq!(assessment.threat_level, ThreatLevel::Low);
        assert_eq!(assessment.recommendations.len(), 2);
    }

    #[test]
    fn test_unrecognized_level_falls_back() {
        assert_eq!(recommendations_for("severe"), vec!["Assess situation"]);
        assert_eq!(recommendations_for("medium").len(), 2);
    }
}
