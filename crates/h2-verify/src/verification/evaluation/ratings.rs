//! Ordinal classifications expressed as ordered breakpoint tables so each band can be
//! audited on its own.

use serde::{Deserialize, Serialize};

use super::correlation::OPTIMAL_EFFICIENCY_KWH_PER_KG;

/// Ascending `(threshold, label)` steps; the first step with `value <= threshold` wins.
#[derive(Debug)]
pub struct ThresholdLadder<L: 'static> {
    steps: &'static [(f64, L)],
    otherwise: L,
}

impl<L: Copy> ThresholdLadder<L> {
    pub const fn new(steps: &'static [(f64, L)], otherwise: L) -> Self {
        Self { steps, otherwise }
    }

    pub fn classify(&self, value: f64) -> L {
        self.steps
            .iter()
            .find(|(threshold, _)| value <= *threshold)
            .map(|(_, label)| *label)
            .unwrap_or(self.otherwise)
    }
}

/// Nested inclusive `(min, max, label)` bands, narrowest first.
#[derive(Debug)]
pub struct BandLadder<L: 'static> {
    bands: &'static [(f64, f64, L)],
}

impl<L: Copy> BandLadder<L> {
    pub const fn new(bands: &'static [(f64, f64, L)]) -> Self {
        Self { bands }
    }

    pub fn find(&self, value: f64) -> Option<L> {
        self.bands
            .iter()
            .find(|(min, max, _)| value >= *min && value <= *max)
            .map(|(_, _, label)| *label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyRating {
    Optimal,
    Excellent,
    Good,
    Acceptable,
    BelowStandard,
    Poor,
}

impl EfficiencyRating {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::BelowStandard => "below_standard",
            Self::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrelationRating {
    Perfect,
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl CorrelationRating {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "PERFECT",
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Acceptable => "ACCEPTABLE",
            Self::Poor => "POOR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl AnomalySeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Negligible,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

pub const EFFICIENCY_RATINGS: BandLadder<EfficiencyRating> = BandLadder::new(&[
    (48.0, 52.0, EfficiencyRating::Optimal),
    (45.0, 55.0, EfficiencyRating::Excellent),
    (42.0, 58.0, EfficiencyRating::Good),
    (40.0, 60.0, EfficiencyRating::Acceptable),
    (35.0, 65.0, EfficiencyRating::BelowStandard),
]);

pub const EFFICIENCY_SCORES: BandLadder<f64> = BandLadder::new(&[
    (48.0, 52.0, 0.98),
    (45.0, 55.0, 0.95),
    (42.0, 58.0, 0.90),
    (40.0, 60.0, 0.85),
]);

pub const CORRELATION_RATINGS: ThresholdLadder<CorrelationRating> = ThresholdLadder::new(
    &[
        (0.05, CorrelationRating::Perfect),
        (0.08, CorrelationRating::Excellent),
        (0.12, CorrelationRating::Good),
        (0.18, CorrelationRating::Acceptable),
    ],
    CorrelationRating::Poor,
);

pub const ANOMALY_SEVERITIES: ThresholdLadder<AnomalySeverity> = ThresholdLadder::new(
    &[
        (0.05, AnomalySeverity::None),
        (0.10, AnomalySeverity::Low),
        (0.20, AnomalySeverity::Moderate),
        (0.35, AnomalySeverity::High),
    ],
    AnomalySeverity::Critical,
);

pub const RISK_LEVELS: ThresholdLadder<RiskLevel> = ThresholdLadder::new(
    &[
        (0.05, RiskLevel::Negligible),
        (0.15, RiskLevel::Low),
        (0.30, RiskLevel::Medium),
        (0.50, RiskLevel::High),
    ],
    RiskLevel::Critical,
);

const EFFICIENCY_SCORE_FLOOR: f64 = 0.1;

pub fn efficiency_rating(observed_efficiency: f64) -> EfficiencyRating {
    EFFICIENCY_RATINGS
        .find(observed_efficiency)
        .unwrap_or(EfficiencyRating::Poor)
}

/// Banded score near the optimum, linear falloff (floored) outside the widest band.
pub fn efficiency_score(observed_efficiency: f64) -> f64 {
    EFFICIENCY_SCORES.find(observed_efficiency).unwrap_or_else(|| {
        let falloff = (observed_efficiency - OPTIMAL_EFFICIENCY_KWH_PER_KG).abs()
            / OPTIMAL_EFFICIENCY_KWH_PER_KG;
        (1.0 - falloff).max(EFFICIENCY_SCORE_FLOOR)
    })
}

pub fn correlation_rating(hydrogen_deviation: f64) -> CorrelationRating {
    CORRELATION_RATINGS.classify(hydrogen_deviation)
}

pub fn anomaly_severity(anomaly_score: f64) -> AnomalySeverity {
    ANOMALY_SEVERITIES.classify(anomaly_score)
}

pub fn risk_level(risk_score: f64) -> RiskLevel {
    RISK_LEVELS.classify(risk_score)
}
