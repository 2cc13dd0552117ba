use serde::{Deserialize, Serialize};

use super::super::domain::{ProductionMethod, ProductionReport};
use super::confidence::{ConfidenceAssessment, ValidationBreakdown};
use super::correlation::CorrelationAnalysis;
use super::fraud::FraudAnalysis;
use super::policy::{GateOutcome, PolicyDecision, PolicyGate};
use super::ratings::{
    anomaly_severity, correlation_rating, efficiency_rating, efficiency_score, risk_level,
    AnomalySeverity, CorrelationRating, EfficiencyRating, RiskLevel,
};
use super::uncertainty::UncertaintyEstimate;

const EXPECTED_YIELD_LOWER: f64 = 0.88;
const EXPECTED_YIELD_UPPER: f64 = 1.12;
const RISK_HYDROGEN_DEVIATION: f64 = 0.12;
const RISK_EFFICIENCY_DEVIATION: f64 = 0.15;
const RISK_FRAUD_SCORE: f64 = 0.20;

const APPROVED_RECOMMENDATIONS: [&str; 3] = [
    "Production data validated successfully",
    "Monitor for consistency",
    "Verification complete",
];
const REJECTED_FOLLOW_UPS: [&str; 3] = [
    "Implement comprehensive audit",
    "Validate measurement equipment",
    "Review production processes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    EnergyH2CorrelationMismatch,
    EfficiencyDeviation,
    FraudIndicatorsDetected,
    NoSignificantRisks,
}

impl RiskFactor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::EnergyH2CorrelationMismatch => "energy_h2_correlation_mismatch",
            Self::EfficiencyDeviation => "efficiency_deviation",
            Self::FraudIndicatorsDetected => "fraud_indicators_detected",
            Self::NoSignificantRisks => "no_significant_risks",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAssessment {
    /// Combined deviation for rejected reports, zero once approved.
    pub score: f64,
    pub severity: AnomalySeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub level: RiskLevel,
    /// Never empty.
    pub factors: Vec<RiskFactor>,
}

/// Instruction to the ledger collaborator. The engine never mints anything itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CreditDirective {
    Issue { amount_kg: f64 },
    Withhold,
}

/// Complete structured result for one production report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub is_valid: bool,
    pub confidence: f64,
    pub fraud_probability: f64,
    pub production_method: ProductionMethod,
    pub method_recognized: bool,
    pub energy_input_mwh: f64,
    pub hydrogen_output_kg: f64,
    pub calculated_efficiency: f64,
    pub efficiency_score: f64,
    pub seasonal_factor: f64,
    pub expected_hydrogen_kg: f64,
    pub min_expected_hydrogen_kg: f64,
    pub max_expected_hydrogen_kg: f64,
    pub hydrogen_deviation: f64,
    pub efficiency_deviation: f64,
    pub efficiency_rating: EfficiencyRating,
    pub correlation_rating: CorrelationRating,
    pub validation_breakdown: ValidationBreakdown,
    pub base_confidence: f64,
    pub fraud_analysis: FraudAnalysis,
    pub uncertainty: UncertaintyEstimate,
    pub gates: Vec<GateOutcome>,
    pub anomaly: AnomalyAssessment,
    pub risk: RiskAssessment,
    pub recommendations: Vec<String>,
    pub credit: CreditDirective,
}

impl VerificationVerdict {
    pub fn should_issue_credit(&self) -> bool {
        matches!(self.credit, CreditDirective::Issue { .. })
    }

    pub fn summary(&self) -> String {
        if self.is_valid {
            format!(
                "approved with confidence {:.3} ({} efficiency, {} correlation)",
                self.confidence,
                self.efficiency_rating.label(),
                self.correlation_rating.label()
            )
        } else {
            let failed: Vec<&str> = self
                .gates
                .iter()
                .filter(|outcome| !outcome.passed)
                .map(|outcome| outcome.gate.label())
                .collect();
            format!("rejected: failed {}", failed.join(", "))
        }
    }
}

pub(crate) struct VerdictInputs<'a> {
    pub report: &'a ProductionReport,
    pub method_recognized: bool,
    pub correlation: CorrelationAnalysis,
    pub fraud: FraudAnalysis,
    pub uncertainty: UncertaintyEstimate,
    pub confidence: ConfidenceAssessment,
    pub decision: PolicyDecision,
}

pub fn risk_factors(
    hydrogen_deviation: f64,
    efficiency_deviation: f64,
    fraud_score: f64,
) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    if hydrogen_deviation > RISK_HYDROGEN_DEVIATION {
        factors.push(RiskFactor::EnergyH2CorrelationMismatch);
    }
    if efficiency_deviation > RISK_EFFICIENCY_DEVIATION {
        factors.push(RiskFactor::EfficiencyDeviation);
    }
    if fraud_score > RISK_FRAUD_SCORE {
        factors.push(RiskFactor::FraudIndicatorsDetected);
    }

    if factors.is_empty() {
        factors.push(RiskFactor::NoSignificantRisks);
    }
    factors
}

fn gate_recommendation(gate: PolicyGate) -> &'static str {
    match gate {
        PolicyGate::Confidence => {
            "Provide additional metering evidence to raise validation confidence"
        }
        PolicyGate::HydrogenDeviation => "Review energy input vs H₂ output correlation",
        PolicyGate::EfficiencyBand => "Optimize production efficiency parameters",
        PolicyGate::FraudScore => "Investigate flagged fraud indicators before resubmitting",
    }
}

pub fn recommendations(decision: &PolicyDecision) -> Vec<String> {
    if decision.approved {
        return APPROVED_RECOMMENDATIONS
            .iter()
            .map(|line| line.to_string())
            .collect();
    }

    decision
        .failed_gates()
        .map(gate_recommendation)
        .chain(REJECTED_FOLLOW_UPS)
        .map(str::to_string)
        .collect()
}

pub(crate) fn synthesize(inputs: VerdictInputs<'_>) -> VerificationVerdict {
    let VerdictInputs {
        report,
        method_recognized,
        correlation,
        fraud,
        uncertainty,
        confidence,
        decision,
    } = inputs;

    let is_valid = decision.approved;
    let combined_deviation = correlation.hydrogen_deviation + correlation.efficiency_deviation;

    let anomaly = AnomalyAssessment {
        score: if is_valid { 0.0 } else { combined_deviation },
        severity: anomaly_severity(combined_deviation),
    };

    let risk_score = (combined_deviation + fraud.score) / 3.0;
    let risk = RiskAssessment {
        score: risk_score,
        level: risk_level(risk_score),
        factors: risk_factors(
            correlation.hydrogen_deviation,
            correlation.efficiency_deviation,
            fraud.score,
        ),
    };

    let credit = if is_valid {
        CreditDirective::Issue {
            amount_kg: report.hydrogen_output_kg,
        }
    } else {
        CreditDirective::Withhold
    };

    VerificationVerdict {
        is_valid,
        confidence: confidence.final_confidence,
        fraud_probability: fraud.score,
        production_method: report.production_method,
        method_recognized,
        energy_input_mwh: report.energy_input_mwh,
        hydrogen_output_kg: report.hydrogen_output_kg,
        calculated_efficiency: correlation.observed_efficiency,
        efficiency_score: efficiency_score(correlation.observed_efficiency),
        seasonal_factor: correlation.seasonal_factor,
        expected_hydrogen_kg: correlation.expected_hydrogen_kg,
        min_expected_hydrogen_kg: correlation.expected_hydrogen_kg * EXPECTED_YIELD_LOWER,
        max_expected_hydrogen_kg: correlation.expected_hydrogen_kg * EXPECTED_YIELD_UPPER,
        hydrogen_deviation: correlation.hydrogen_deviation,
        efficiency_deviation: correlation.efficiency_deviation,
        efficiency_rating: efficiency_rating(correlation.observed_efficiency),
        correlation_rating: correlation_rating(correlation.hydrogen_deviation),
        validation_breakdown: confidence.breakdown,
        base_confidence: confidence.base_confidence,
        recommendations: recommendations(&decision),
        gates: decision.gates,
        fraud_analysis: fraud,
        uncertainty,
        anomaly,
        risk,
        credit,
    }
}
