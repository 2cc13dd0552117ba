//! Green-hydrogen production verification: intake, evaluation, and credit settlement.
//!
//! The evaluation engine is pure and synchronous. The service layer wraps it with
//! storage and credit ledger collaborators, both expressed as traits so adapters can
//! be swapped per deployment.

pub mod domain;
pub mod evaluation;
pub mod intake;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CreditId, InvalidInput, ProductionMethod, ProductionReport, ProductionSubmission,
    SubmissionKey, VerificationId, VerificationStatus,
};
pub use evaluation::{
    ConfigurationError, DecisionPolicy, EvaluationConfig, EvaluationError, FraudIndicator,
    PolicyGate, VerificationEngine, VerificationVerdict,
};
pub use intake::{AcceptedSubmission, IntakeGuard, IntakeViolation};
pub use repository::{
    CreditInstruction, CreditLedger, IssueOutcome, IssuedCredit, LedgerError, RepositoryError,
    VerificationRecord, VerificationRepository, VerificationStatusView,
};
pub use router::verification_router;
pub use service::{SubmissionOutcome, VerificationService, VerificationServiceError};
