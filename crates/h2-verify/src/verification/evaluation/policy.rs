use serde::{Deserialize, Serialize};

use super::config::ConfigurationError;
use super::standards::EfficiencyBand;

/// Hard gates a report must clear for a credit to be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyGate {
    Confidence,
    HydrogenDeviation,
    EfficiencyBand,
    FraudScore,
}

impl PolicyGate {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Confidence,
            Self::HydrogenDeviation,
            Self::EfficiencyBand,
            Self::FraudScore,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Confidence => "confidence",
            Self::HydrogenDeviation => "hydrogen_deviation",
            Self::EfficiencyBand => "efficiency_band",
            Self::FraudScore => "fraud_score",
        }
    }
}

/// Aggregated numbers the policy decides on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionSignals {
    pub final_confidence: f64,
    pub hydrogen_deviation: f64,
    pub observed_efficiency: f64,
    pub fraud_score: f64,
}

impl DecisionSignals {
    fn observed(&self, gate: PolicyGate) -> f64 {
        match gate {
            PolicyGate::Confidence => self.final_confidence,
            PolicyGate::HydrogenDeviation => self.hydrogen_deviation,
            PolicyGate::EfficiencyBand => self.observed_efficiency,
            PolicyGate::FraudScore => self.fraud_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateOutcome {
    pub gate: PolicyGate,
    pub observed: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub approved: bool,
    pub gates: Vec<GateOutcome>,
}

impl PolicyDecision {
    pub fn failed_gates(&self) -> impl Iterator<Item = PolicyGate> + '_ {
        self.gates
            .iter()
            .filter(|outcome| !outcome.passed)
            .map(|outcome| outcome.gate)
    }
}

/// Conjunctive accept policy. Every bound is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    pub min_confidence: f64,
    pub max_hydrogen_deviation: f64,
    pub efficiency_band: EfficiencyBand,
    pub max_fraud_score: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            min_confidence: 0.96,
            max_hydrogen_deviation: 0.12,
            efficiency_band: EfficiencyBand::new(42.0, 58.0),
            max_fraud_score: 0.15,
        }
    }
}

impl DecisionPolicy {
    pub fn confidence_gate(&self, final_confidence: f64) -> bool {
        final_confidence >= self.min_confidence
    }

    pub fn hydrogen_deviation_gate(&self, hydrogen_deviation: f64) -> bool {
        hydrogen_deviation <= self.max_hydrogen_deviation
    }

    pub fn efficiency_gate(&self, observed_efficiency: f64) -> bool {
        self.efficiency_band.contains(observed_efficiency)
    }

    pub fn fraud_gate(&self, fraud_score: f64) -> bool {
        fraud_score <= self.max_fraud_score
    }

    pub fn passes(&self, gate: PolicyGate, observed: f64) -> bool {
        match gate {
            PolicyGate::Confidence => self.confidence_gate(observed),
            PolicyGate::HydrogenDeviation => self.hydrogen_deviation_gate(observed),
            PolicyGate::EfficiencyBand => self.efficiency_gate(observed),
            PolicyGate::FraudScore => self.fraud_gate(observed),
        }
    }

    /// Any failing gate rejects, regardless of the others.
    pub fn decide(&self, signals: &DecisionSignals) -> PolicyDecision {
        let gates: Vec<GateOutcome> = PolicyGate::ordered()
            .into_iter()
            .map(|gate| {
                let observed = signals.observed(gate);
                GateOutcome {
                    gate,
                    observed,
                    passed: self.passes(gate, observed),
                }
            })
            .collect();

        let approved = gates.iter().all(|outcome| outcome.passed);
        PolicyDecision { approved, gates }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        let bounds = [
            self.min_confidence,
            self.max_hydrogen_deviation,
            self.efficiency_band.min,
            self.efficiency_band.max,
            self.max_fraud_score,
        ];
        if bounds.iter().any(|bound| !bound.is_finite() || *bound < 0.0) {
            return Err(ConfigurationError::InvalidPolicy(
                "bounds must be finite and non-negative".to_string(),
            ));
        }
        if self.min_confidence > 1.0 || self.max_fraud_score > 1.0 {
            return Err(ConfigurationError::InvalidPolicy(
                "confidence and fraud bounds are fractions".to_string(),
            ));
        }
        if self.efficiency_band.min > self.efficiency_band.max {
            return Err(ConfigurationError::InvalidPolicy(
                "efficiency band minimum exceeds maximum".to_string(),
            ));
        }
        Ok(())
    }
}
