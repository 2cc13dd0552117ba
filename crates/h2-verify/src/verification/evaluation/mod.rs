mod config;
mod confidence;
mod correlation;
mod fraud;
mod policy;
pub mod ratings;
mod seasonal;
mod standards;
mod uncertainty;
mod verdict;

pub use config::{ConfigurationError, EvaluationConfig};
pub use confidence::{ConfidenceAssessment, ValidationBreakdown};
pub use correlation::{CorrelationAnalysis, OPTIMAL_EFFICIENCY_KWH_PER_KG};
pub use fraud::{FraudAnalysis, FraudIndicator, GLOBAL_REFERENCE_YIELD_KG_PER_MWH};
pub use policy::{DecisionPolicy, DecisionSignals, GateOutcome, PolicyDecision, PolicyGate};
pub use seasonal::{SeasonalFactorTable, MAX_SEASONAL_FACTOR, MIN_SEASONAL_FACTOR};
pub use standards::{EfficiencyBand, MethodStandard, MethodStandardsTable, ResolvedStandard};
pub use uncertainty::UncertaintyEstimate;
pub use verdict::{
    recommendations, risk_factors, AnomalyAssessment, CreditDirective, RiskAssessment,
    RiskFactor, VerificationVerdict,
};

use super::domain::{InvalidInput, ProductionMethod, ProductionReport};
use tracing::{debug, warn};
use verdict::VerdictInputs;

/// Reasons an evaluation produced no verdict at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error("{quantity} is zero; ratio is undefined")]
    DivisionDomain { quantity: &'static str },
    #[error("no standard available for '{}' and no fallback configured", .0.label())]
    MissingStandard(ProductionMethod),
}

/// Pure, stateless evaluator over immutable reference tables. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct VerificationEngine {
    config: EvaluationConfig,
}

impl VerificationEngine {
    pub fn new(config: EvaluationConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine over the built-in standard tables.
    pub fn standard() -> Self {
        Self {
            config: EvaluationConfig::standard(),
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.config.policy
    }

    pub fn evaluate(&self, report: &ProductionReport) -> Result<VerificationVerdict, EvaluationError> {
        report.validate()?;

        let resolved = self
            .config
            .standards
            .resolve(report.production_method)
            .ok_or(EvaluationError::MissingStandard(report.production_method))?;
        if !resolved.recognized {
            warn!(
                method = report.production_method.label(),
                fallback = self.config.standards.fallback_method.label(),
                "unrecognized production method, scoring yield against fallback standard"
            );
        }

        let seasonal_factor = self.config.seasonal.factor_for(report.production_date);
        let correlation = correlation::analyze(report, resolved.standard, seasonal_factor)?;
        let fraud = fraud::detect(report, correlation.observed_efficiency, &resolved)?;
        let method_uncertainty = self.config.standards.method_uncertainty(&resolved);
        let uncertainty = uncertainty::estimate(report, method_uncertainty);
        let confidence = confidence::aggregate(&correlation, &resolved, &uncertainty);

        let decision = self.config.policy.decide(&DecisionSignals {
            final_confidence: confidence.final_confidence,
            hydrogen_deviation: correlation.hydrogen_deviation,
            observed_efficiency: correlation.observed_efficiency,
            fraud_score: fraud.score,
        });

        debug!(
            method = report.production_method.label(),
            efficiency = correlation.observed_efficiency,
            hydrogen_deviation = correlation.hydrogen_deviation,
            fraud_score = fraud.score,
            confidence = confidence.final_confidence,
            approved = decision.approved,
            "production report evaluated"
        );

        Ok(verdict::synthesize(VerdictInputs {
            report,
            method_recognized: resolved.recognized,
            correlation,
            fraud,
            uncertainty,
            confidence,
            decision,
        }))
    }
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::standard()
    }
}
