use serde::{Deserialize, Serialize};

use super::super::domain::ProductionReport;

const MEASUREMENT_UNCERTAINTY_CAP: f64 = 0.05;
const TOTAL_UNCERTAINTY_CEILING: f64 = 0.15;

/// Relative measurement noise that discounts the composite confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyEstimate {
    pub energy: f64,
    pub hydrogen: f64,
    pub method: f64,
    pub total: f64,
}

/// Larger quantities carry less relative noise; the inverse is capped so tiny inputs
/// cannot dominate.
fn scale_uncertainty(quantity: f64) -> f64 {
    (1.0 / (quantity + 1.0)).min(MEASUREMENT_UNCERTAINTY_CAP)
}

pub(crate) fn estimate(report: &ProductionReport, method_uncertainty: f64) -> UncertaintyEstimate {
    let energy = scale_uncertainty(report.energy_input_mwh);
    let hydrogen = scale_uncertainty(report.hydrogen_output_kg);
    let total = ((energy + hydrogen + method_uncertainty) / 3.0).min(TOTAL_UNCERTAINTY_CEILING);

    UncertaintyEstimate {
        energy,
        hydrogen,
        method: method_uncertainty,
        total,
    }
}
