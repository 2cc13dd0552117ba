use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::ProductionMethod;
use super::config::ConfigurationError;

const UNRECOGNIZED_METHOD_UNCERTAINTY: f64 = 0.025;

/// Inclusive efficiency band in kWh per kg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyBand {
    pub min: f64,
    pub max: f64,
}

impl EfficiencyBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, efficiency: f64) -> bool {
        efficiency >= self.min && efficiency <= self.max
    }
}

/// Expected behavior of one production method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodStandard {
    /// Hydrogen yield per MWh consumed, before seasonal adjustment.
    pub base_yield_kg_per_mwh: f64,
    pub min_yield_kg_per_mwh: f64,
    pub max_yield_kg_per_mwh: f64,
    pub optimal_efficiency: f64,
    pub tolerance: f64,
    /// Efficiency band outside of which the method-inconsistency indicator fires.
    pub acceptable_efficiency: EfficiencyBand,
    pub measurement_uncertainty: f64,
}

impl MethodStandard {
    fn validate(&self, method: ProductionMethod) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidStandard {
            method,
            reason: reason.to_string(),
        };

        let values = [
            self.base_yield_kg_per_mwh,
            self.min_yield_kg_per_mwh,
            self.max_yield_kg_per_mwh,
            self.optimal_efficiency,
            self.tolerance,
            self.acceptable_efficiency.min,
            self.acceptable_efficiency.max,
            self.measurement_uncertainty,
        ];
        if values.iter().any(|value| !value.is_finite() || *value <= 0.0) {
            return Err(invalid("all values must be finite and positive"));
        }
        if !(self.min_yield_kg_per_mwh..=self.max_yield_kg_per_mwh)
            .contains(&self.base_yield_kg_per_mwh)
        {
            return Err(invalid("base yield must lie within the yield envelope"));
        }
        if self.acceptable_efficiency.min >= self.acceptable_efficiency.max {
            return Err(invalid("acceptable efficiency band is empty"));
        }
        Ok(())
    }
}

/// Result of looking a method up in the table.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedStandard<'a> {
    pub standard: &'a MethodStandard,
    /// `false` when the fallback standard stood in for an unlisted method.
    pub recognized: bool,
}

/// Method standards keyed by production method, with a designated fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodStandardsTable {
    pub standards: BTreeMap<ProductionMethod, MethodStandard>,
    pub fallback_method: ProductionMethod,
    #[serde(default = "default_unrecognized_uncertainty")]
    pub unrecognized_uncertainty: f64,
}

fn default_unrecognized_uncertainty() -> f64 {
    UNRECOGNIZED_METHOD_UNCERTAINTY
}

impl MethodStandardsTable {
    pub fn standard() -> Self {
        let mut standards = BTreeMap::new();
        standards.insert(
            ProductionMethod::Wind,
            MethodStandard {
                base_yield_kg_per_mwh: 22.5,
                min_yield_kg_per_mwh: 20.0,
                max_yield_kg_per_mwh: 25.0,
                optimal_efficiency: 50.0,
                tolerance: 8.0,
                acceptable_efficiency: EfficiencyBand::new(40.0, 58.0),
                measurement_uncertainty: 0.02,
            },
        );
        standards.insert(
            ProductionMethod::Solar,
            MethodStandard {
                base_yield_kg_per_mwh: 24.0,
                min_yield_kg_per_mwh: 22.0,
                max_yield_kg_per_mwh: 26.5,
                optimal_efficiency: 52.0,
                tolerance: 7.0,
                acceptable_efficiency: EfficiencyBand::new(42.0, 60.0),
                measurement_uncertainty: 0.03,
            },
        );
        standards.insert(
            ProductionMethod::Hydro,
            MethodStandard {
                base_yield_kg_per_mwh: 21.0,
                min_yield_kg_per_mwh: 19.5,
                max_yield_kg_per_mwh: 23.0,
                optimal_efficiency: 48.0,
                tolerance: 6.0,
                acceptable_efficiency: EfficiencyBand::new(38.0, 56.0),
                measurement_uncertainty: 0.015,
            },
        );

        Self {
            standards,
            fallback_method: ProductionMethod::Wind,
            unrecognized_uncertainty: UNRECOGNIZED_METHOD_UNCERTAINTY,
        }
    }

    /// Unlisted methods resolve to the fallback standard and are marked unrecognized.
    pub fn resolve(&self, method: ProductionMethod) -> Option<ResolvedStandard<'_>> {
        if let Some(standard) = self.standards.get(&method) {
            return Some(ResolvedStandard {
                standard,
                recognized: true,
            });
        }

        self.standards
            .get(&self.fallback_method)
            .map(|standard| ResolvedStandard {
                standard,
                recognized: false,
            })
    }

    pub fn method_uncertainty(&self, resolved: &ResolvedStandard<'_>) -> f64 {
        if resolved.recognized {
            resolved.standard.measurement_uncertainty
        } else {
            self.unrecognized_uncertainty
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.standards.contains_key(&self.fallback_method) {
            return Err(ConfigurationError::MissingFallbackStandard(
                self.fallback_method,
            ));
        }
        for (method, standard) in &self.standards {
            standard.validate(*method)?;
        }
        if !self.unrecognized_uncertainty.is_finite() || self.unrecognized_uncertainty < 0.0 {
            return Err(ConfigurationError::InvalidStandard {
                method: ProductionMethod::Other,
                reason: "unrecognized-method uncertainty must be finite and non-negative"
                    .to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MethodStandardsTable {
    fn default() -> Self {
        Self::standard()
    }
}
