use serde::{Deserialize, Serialize};

use super::super::domain::{InvalidInput, ProductionReport};
use super::standards::MethodStandard;
use super::EvaluationError;

/// Industry-optimal electrolysis efficiency in kWh per kg.
pub const OPTIMAL_EFFICIENCY_KWH_PER_KG: f64 = 50.0;
const KWH_PER_MWH: f64 = 1000.0;

/// Observed efficiency and how far the report strays from the physical expectation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationAnalysis {
    pub observed_efficiency: f64,
    pub seasonal_factor: f64,
    pub expected_hydrogen_kg: f64,
    pub hydrogen_deviation: f64,
    pub efficiency_deviation: f64,
}

pub(crate) fn observed_efficiency(
    energy_input_mwh: f64,
    hydrogen_output_kg: f64,
) -> Result<f64, EvaluationError> {
    if hydrogen_output_kg <= 0.0 {
        return Err(EvaluationError::DivisionDomain {
            quantity: "hydrogen output",
        });
    }
    Ok(energy_input_mwh * KWH_PER_MWH / hydrogen_output_kg)
}

/// Relative gap between a reported and a reference hydrogen yield.
pub(crate) fn relative_deviation(reported_kg: f64, reference_kg: f64) -> Result<f64, EvaluationError> {
    if reference_kg == 0.0 {
        return Err(EvaluationError::DivisionDomain {
            quantity: "expected hydrogen yield",
        });
    }
    Ok((reported_kg - reference_kg).abs() / reference_kg)
}

fn finite(value: f64, quantity: &'static str) -> Result<f64, EvaluationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidInput::OutOfRange(quantity).into())
    }
}

pub(crate) fn analyze(
    report: &ProductionReport,
    standard: &MethodStandard,
    seasonal_factor: f64,
) -> Result<CorrelationAnalysis, EvaluationError> {
    let observed_efficiency = finite(
        observed_efficiency(report.energy_input_mwh, report.hydrogen_output_kg)?,
        "observed efficiency",
    )?;

    let expected_hydrogen_kg = finite(
        report.energy_input_mwh * standard.base_yield_kg_per_mwh * seasonal_factor,
        "expected hydrogen yield",
    )?;
    let hydrogen_deviation = finite(
        relative_deviation(report.hydrogen_output_kg, expected_hydrogen_kg)?,
        "hydrogen deviation",
    )?;

    let efficiency_deviation = (observed_efficiency - OPTIMAL_EFFICIENCY_KWH_PER_KG).abs()
        / OPTIMAL_EFFICIENCY_KWH_PER_KG;

    Ok(CorrelationAnalysis {
        observed_efficiency,
        seasonal_factor,
        expected_hydrogen_kg,
        hydrogen_deviation,
        efficiency_deviation,
    })
}
