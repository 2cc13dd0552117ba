use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    CreditId, ProductionMethod, ProductionReport, SubmissionKey, VerificationId,
    VerificationStatus,
};
use super::evaluation::VerificationVerdict;

/// Repository record pairing the report with its verdict and any minted credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub verification_id: VerificationId,
    pub submission_key: SubmissionKey,
    pub producer_id: String,
    pub report: ProductionReport,
    pub status: VerificationStatus,
    pub verdict: VerificationVerdict,
    pub credit: Option<IssuedCredit>,
    pub verified_at: DateTime<Utc>,
}

impl VerificationRecord {
    pub fn decision_rationale(&self) -> String {
        self.verdict.summary()
    }

    pub fn status_view(&self) -> VerificationStatusView {
        VerificationStatusView {
            verification_id: self.verification_id.clone(),
            producer_id: self.producer_id.clone(),
            status: self.status.label(),
            decision_rationale: self.decision_rationale(),
            confidence: self.verdict.confidence,
            hydrogen_kg: self.report.hydrogen_output_kg,
            credit_id: self.credit.as_ref().map(|credit| credit.credit_id.clone()),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `insert` must be atomic on both the verification id and the submission key: the
/// second of two racing inserts for one key fails with `Conflict`.
pub trait VerificationRepository: Send + Sync {
    fn insert(&self, record: VerificationRecord) -> Result<VerificationRecord, RepositoryError>;
    fn update(&self, record: VerificationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &VerificationId) -> Result<Option<VerificationRecord>, RepositoryError>;
    fn find_by_key(
        &self,
        key: &SubmissionKey,
    ) -> Result<Option<VerificationRecord>, RepositoryError>;
    fn for_producer(&self, producer_id: &str) -> Result<Vec<VerificationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook to whatever ledger represents credits.
///
/// Implementations must be idempotent on `submission_key`: issuing again for a key that
/// already holds a credit returns that credit as `IssueOutcome::Existing` instead of
/// minting another. Exactly one call per key may answer `Minted`.
pub trait CreditLedger: Send + Sync {
    fn issue(&self, instruction: CreditInstruction) -> Result<IssueOutcome, LedgerError>;
}

/// What the ledger did with an instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueOutcome {
    Minted(IssuedCredit),
    Existing(IssuedCredit),
}

impl IssueOutcome {
    pub fn is_minted(&self) -> bool {
        matches!(self, Self::Minted(_))
    }

    pub fn into_credit(self) -> IssuedCredit {
        match self {
            Self::Minted(credit) | Self::Existing(credit) => credit,
        }
    }
}

/// Request to mint one credit for an approved verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditInstruction {
    pub submission_key: SubmissionKey,
    pub verification_id: VerificationId,
    pub producer_id: String,
    pub name: String,
    pub production_method: ProductionMethod,
    pub amount_kg: f64,
    pub price_per_kg: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedCredit {
    pub credit_id: CreditId,
    pub submission_key: SubmissionKey,
    pub verification_id: VerificationId,
    pub name: String,
    pub amount_kg: f64,
    pub total_value: f64,
    pub issued_at: DateTime<Utc>,
}

/// Ledger dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of a verification's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationStatusView {
    pub verification_id: VerificationId,
    pub producer_id: String,
    pub status: &'static str,
    pub decision_rationale: String,
    pub confidence: f64,
    pub hydrogen_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_id: Option<CreditId>,
}
