use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored verification records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerificationId(pub String);

/// Identifier of a credit minted by the ledger collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreditId(pub String);

/// Caller-supplied deduplication key. One key yields at most one record and one credit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionKey(pub String);

/// Renewable source powering the electrolyser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionMethod {
    Wind,
    Solar,
    Hydro,
    #[serde(other)]
    Other,
}

impl ProductionMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Wind => "wind",
            Self::Solar => "solar",
            Self::Hydro => "hydro",
            Self::Other => "other",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Wind => "Wind",
            Self::Solar => "Solar",
            Self::Hydro => "Hydro",
            Self::Other => "Other",
        }
    }

    /// Lenient parse used by the CLI; anything unrecognised maps to `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "wind" => Self::Wind,
            "solar" => Self::Solar,
            "hydro" => Self::Hydro,
            _ => Self::Other,
        }
    }
}

/// Self-reported production telemetry evaluated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionReport {
    pub energy_input_mwh: f64,
    pub hydrogen_output_kg: f64,
    pub production_method: ProductionMethod,
    pub production_date: NaiveDate,
}

impl ProductionReport {
    /// Both quantities must be finite and strictly positive before any ratio is taken.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if !self.energy_input_mwh.is_finite() || self.energy_input_mwh <= 0.0 {
            return Err(InvalidInput::NonPositiveEnergy(self.energy_input_mwh));
        }
        if !self.hydrogen_output_kg.is_finite() || self.hydrogen_output_kg <= 0.0 {
            return Err(InvalidInput::NonPositiveHydrogen(self.hydrogen_output_kg));
        }
        Ok(())
    }
}

/// Malformed report contents. Distinct from a rejection verdict.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("energy input must be a positive number of MWh (found {0})")]
    NonPositiveEnergy(f64),
    #[error("hydrogen output must be a positive number of kg (found {0})")]
    NonPositiveHydrogen(f64),
    #[error("production date '{0}' is not a YYYY-MM-DD calendar date")]
    MalformedDate(String),
    #[error("{0} is not representable for the reported quantities")]
    OutOfRange(&'static str),
}

/// Wire payload accepted by the service before intake validation.
///
/// Keys default to empty so a preview can carry quantities alone; `submit` rejects
/// blank keys at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSubmission {
    #[serde(default)]
    pub submission_key: String,
    #[serde(default)]
    pub producer_id: String,
    pub energy_mwh: f64,
    pub h2_kg: f64,
    pub production_method: ProductionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_date: Option<String>,
}

/// Persisted outcome of a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}
