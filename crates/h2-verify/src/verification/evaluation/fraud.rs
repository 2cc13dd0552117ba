use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::ProductionReport;
use super::correlation::relative_deviation;
use super::standards::ResolvedStandard;
use super::EvaluationError;

/// Flat reference yield used only by the coarse correlation check, independent of method.
pub const GLOBAL_REFERENCE_YIELD_KG_PER_MWH: f64 = 22.5;

const PLAUSIBLE_EFFICIENCY_MIN: f64 = 30.0;
const PLAUSIBLE_EFFICIENCY_MAX: f64 = 70.0;
const CORRELATION_MISMATCH_LIMIT: f64 = 0.25;
const ROUND_NUMBER_STEP_KG: f64 = 100.0;
const ROUND_NUMBER_FLOOR_KG: f64 = 1000.0;
const PLAUSIBLE_ENERGY_MIN_MWH: f64 = 0.1;
const PLAUSIBLE_ENERGY_MAX_MWH: f64 = 10_000.0;

/// Independent suspicion heuristics. Each one has a single fixed severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudIndicator {
    UnrealisticEfficiency,
    CorrelationMismatch,
    MethodInconsistency,
    RoundNumberSuspicion,
    EnergyInputSuspicion,
}

impl FraudIndicator {
    pub const fn severity(self) -> f64 {
        match self {
            Self::UnrealisticEfficiency => 0.8,
            Self::CorrelationMismatch => 0.7,
            Self::MethodInconsistency => 0.6,
            Self::RoundNumberSuspicion => 0.3,
            Self::EnergyInputSuspicion => 0.5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::UnrealisticEfficiency => "unrealistic_efficiency",
            Self::CorrelationMismatch => "correlation_mismatch",
            Self::MethodInconsistency => "method_inconsistency",
            Self::RoundNumberSuspicion => "round_number_suspicion",
            Self::EnergyInputSuspicion => "energy_input_suspicion",
        }
    }

    fn contribution(self, triggered: bool) -> f64 {
        if triggered {
            self.severity()
        } else {
            0.0
        }
    }
}

/// Evaluated indicators with their contributions, plus their mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAnalysis {
    pub indicators: BTreeMap<FraudIndicator, f64>,
    pub score: f64,
}

impl FraudAnalysis {
    pub fn contribution(&self, indicator: FraudIndicator) -> Option<f64> {
        self.indicators.get(&indicator).copied()
    }

    pub fn triggered(&self) -> impl Iterator<Item = FraudIndicator> + '_ {
        self.indicators
            .iter()
            .filter(|(_, contribution)| **contribution > 0.0)
            .map(|(indicator, _)| *indicator)
    }
}

pub(crate) fn detect(
    report: &ProductionReport,
    observed_efficiency: f64,
    resolved: &ResolvedStandard<'_>,
) -> Result<FraudAnalysis, EvaluationError> {
    let mut indicators = BTreeMap::new();

    let unrealistic = !(PLAUSIBLE_EFFICIENCY_MIN..=PLAUSIBLE_EFFICIENCY_MAX)
        .contains(&observed_efficiency);
    indicators.insert(
        FraudIndicator::UnrealisticEfficiency,
        FraudIndicator::UnrealisticEfficiency.contribution(unrealistic),
    );

    let reference_kg = report.energy_input_mwh * GLOBAL_REFERENCE_YIELD_KG_PER_MWH;
    let mismatch =
        relative_deviation(report.hydrogen_output_kg, reference_kg)? > CORRELATION_MISMATCH_LIMIT;
    indicators.insert(
        FraudIndicator::CorrelationMismatch,
        FraudIndicator::CorrelationMismatch.contribution(mismatch),
    );

    // Only listed methods have a documented band to be inconsistent with.
    if resolved.recognized {
        let inconsistent = !resolved
            .standard
            .acceptable_efficiency
            .contains(observed_efficiency);
        indicators.insert(
            FraudIndicator::MethodInconsistency,
            FraudIndicator::MethodInconsistency.contribution(inconsistent),
        );
    }

    let round = report.hydrogen_output_kg % ROUND_NUMBER_STEP_KG == 0.0
        && report.hydrogen_output_kg > ROUND_NUMBER_FLOOR_KG;
    indicators.insert(
        FraudIndicator::RoundNumberSuspicion,
        FraudIndicator::RoundNumberSuspicion.contribution(round),
    );

    let implausible_energy = !(PLAUSIBLE_ENERGY_MIN_MWH..=PLAUSIBLE_ENERGY_MAX_MWH)
        .contains(&report.energy_input_mwh);
    indicators.insert(
        FraudIndicator::EnergyInputSuspicion,
        FraudIndicator::EnergyInputSuspicion.contribution(implausible_energy),
    );

    let score = indicators.values().sum::<f64>() / indicators.len() as f64;

    Ok(FraudAnalysis { indicators, score })
}
