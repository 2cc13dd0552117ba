use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::config::ConfigurationError;

pub const MIN_SEASONAL_FACTOR: f64 = 0.90;
pub const MAX_SEASONAL_FACTOR: f64 = 1.10;
const NEUTRAL_FACTOR: f64 = 1.0;

/// Month-indexed efficiency multipliers, January first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFactorTable {
    pub factors: [f64; 12],
}

impl SeasonalFactorTable {
    pub fn standard() -> Self {
        Self {
            factors: [
                0.95, 0.92, 0.98, 1.02, 1.05, 1.08, 1.10, 1.08, 1.03, 0.98, 0.94, 0.96,
            ],
        }
    }

    /// Factor for a 1-based month. Months outside 1..=12 get the neutral factor.
    pub fn factor(&self, month: u32) -> f64 {
        match month
            .checked_sub(1)
            .and_then(|index| self.factors.get(index as usize))
        {
            Some(factor) => *factor,
            None => {
                warn!(month, "month outside calendar range, using neutral seasonal factor");
                NEUTRAL_FACTOR
            }
        }
    }

    pub fn factor_for(&self, date: NaiveDate) -> f64 {
        self.factor(date.month())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        for (index, factor) in self.factors.iter().enumerate() {
            if !factor.is_finite() || !(MIN_SEASONAL_FACTOR..=MAX_SEASONAL_FACTOR).contains(factor)
            {
                return Err(ConfigurationError::SeasonalFactorOutOfRange {
                    month: index as u32 + 1,
                    factor: *factor,
                });
            }
        }
        Ok(())
    }
}

impl Default for SeasonalFactorTable {
    fn default() -> Self {
        Self::standard()
    }
}
