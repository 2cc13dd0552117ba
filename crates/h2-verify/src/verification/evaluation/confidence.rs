use serde::{Deserialize, Serialize};

use super::correlation::CorrelationAnalysis;
use super::standards::ResolvedStandard;
use super::uncertainty::UncertaintyEstimate;

const CONFIDENCE_CEILING: f64 = 0.99;
const UNRECOGNIZED_METHOD_CONSISTENCY: f64 = 0.5;

/// Independent sub-scores in [0, 1]. The field comments record the intended weights;
/// aggregation is an unweighted mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationBreakdown {
    /// 40%
    pub energy_h2_correlation: f64,
    /// 30%
    pub efficiency_standard: f64,
    /// 20%
    pub production_method_consistency: f64,
    /// 10%
    pub seasonal_validation: f64,
}

impl ValidationBreakdown {
    pub fn mean(&self) -> f64 {
        (self.energy_h2_correlation
            + self.efficiency_standard
            + self.production_method_consistency
            + self.seasonal_validation)
            / 4.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceAssessment {
    pub breakdown: ValidationBreakdown,
    pub base_confidence: f64,
    pub final_confidence: f64,
}

pub(crate) fn method_consistency(observed_efficiency: f64, resolved: &ResolvedStandard<'_>) -> f64 {
    if !resolved.recognized {
        return UNRECOGNIZED_METHOD_CONSISTENCY;
    }
    let standard = resolved.standard;
    let deviation = (observed_efficiency - standard.optimal_efficiency).abs() / standard.tolerance;
    (1.0 - deviation).max(0.0)
}

/// Tiered fit of the hydrogen deviation against the swing the season itself explains.
pub(crate) fn seasonal_fit(hydrogen_deviation: f64, seasonal_factor: f64) -> f64 {
    let expected_swing = (1.0 - seasonal_factor).abs();
    if hydrogen_deviation <= expected_swing * 1.2 {
        1.0
    } else if hydrogen_deviation <= expected_swing * 1.5 {
        0.8
    } else {
        0.6
    }
}

pub(crate) fn aggregate(
    correlation: &CorrelationAnalysis,
    resolved: &ResolvedStandard<'_>,
    uncertainty: &UncertaintyEstimate,
) -> ConfidenceAssessment {
    let breakdown = ValidationBreakdown {
        energy_h2_correlation: (1.0 - correlation.hydrogen_deviation * 2.0).max(0.0),
        efficiency_standard: (1.0 - correlation.efficiency_deviation * 1.5).max(0.0),
        production_method_consistency: method_consistency(
            correlation.observed_efficiency,
            resolved,
        ),
        seasonal_validation: seasonal_fit(
            correlation.hydrogen_deviation,
            correlation.seasonal_factor,
        ),
    };

    let base_confidence = breakdown.mean();
    let final_confidence = (base_confidence * (1.0 - uncertainty.total)).min(CONFIDENCE_CEILING);

    ConfidenceAssessment {
        breakdown,
        base_confidence,
        final_confidence,
    }
}
