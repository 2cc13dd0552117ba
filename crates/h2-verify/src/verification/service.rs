use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{ProductionSubmission, VerificationId, VerificationStatus};
use super::evaluation::{EvaluationError, VerificationEngine, VerificationVerdict};
use super::intake::{IntakeGuard, IntakeViolation};
use super::repository::{
    CreditInstruction, CreditLedger, LedgerError, RepositoryError, VerificationRecord,
    VerificationRepository,
};

/// Service composing intake, the evaluation engine, storage, and the credit ledger.
pub struct VerificationService<R, L> {
    guard: IntakeGuard,
    repository: Arc<R>,
    ledger: Arc<L>,
    engine: Arc<VerificationEngine>,
    credit_price_per_kg: f64,
}

static VERIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_verification_id() -> VerificationId {
    let id = VERIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    VerificationId(format!("VER-{id:06}"))
}

/// Result of `submit`. `replayed` is set when the key had already been processed.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub record: VerificationRecord,
    pub credit_created: bool,
    pub replayed: bool,
}

impl<R, L> VerificationService<R, L>
where
    R: VerificationRepository + 'static,
    L: CreditLedger + 'static,
{
    pub fn new(
        repository: Arc<R>,
        ledger: Arc<L>,
        engine: VerificationEngine,
        credit_price_per_kg: f64,
    ) -> Self {
        Self {
            guard: IntakeGuard,
            repository,
            ledger,
            engine: Arc::new(engine),
            credit_price_per_kg,
        }
    }

    pub fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    /// Verify a submission, persist the record, and mint a credit when approved.
    ///
    /// Resubmitting a known `submission_key` returns the stored record untouched.
    pub fn submit(
        &self,
        submission: ProductionSubmission,
    ) -> Result<SubmissionOutcome, VerificationServiceError> {
        let accepted = self.guard.accept(submission, Utc::now().date_naive())?;

        if let Some(existing) = self.repository.find_by_key(&accepted.submission_key)? {
            return self.replay(existing);
        }

        let verdict = self.engine.evaluate(&accepted.report)?;
        let status = if verdict.is_valid {
            VerificationStatus::Approved
        } else {
            VerificationStatus::Rejected
        };

        let record = VerificationRecord {
            verification_id: next_verification_id(),
            submission_key: accepted.submission_key.clone(),
            producer_id: accepted.producer_id,
            report: accepted.report,
            status,
            verdict,
            credit: None,
            verified_at: Utc::now(),
        };

        let stored = match self.repository.insert(record) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                // Lost a race against a concurrent submission with the same key.
                let existing = self
                    .repository
                    .find_by_key(&accepted.submission_key)?
                    .ok_or(RepositoryError::Conflict)?;
                return self.replay(existing);
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            verification_id = %stored.verification_id.0,
            producer_id = %stored.producer_id,
            status = stored.status.label(),
            confidence = stored.verdict.confidence,
            "production report verified"
        );

        let (record, credit_created) = self.settle_credit(stored)?;
        Ok(SubmissionOutcome {
            record,
            credit_created,
            replayed: false,
        })
    }

    /// Evaluate without persisting anything or touching the ledger.
    pub fn preview(
        &self,
        submission: &ProductionSubmission,
    ) -> Result<VerificationVerdict, VerificationServiceError> {
        let report = self
            .guard
            .report_from_submission(submission, Utc::now().date_naive())
            .map_err(IntakeViolation::from)?;
        Ok(self.engine.evaluate(&report)?)
    }

    pub fn get(
        &self,
        verification_id: &VerificationId,
    ) -> Result<VerificationRecord, VerificationServiceError> {
        let record = self
            .repository
            .fetch(verification_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn for_producer(
        &self,
        producer_id: &str,
    ) -> Result<Vec<VerificationRecord>, VerificationServiceError> {
        Ok(self.repository.for_producer(producer_id)?)
    }

    fn replay(
        &self,
        existing: VerificationRecord,
    ) -> Result<SubmissionOutcome, VerificationServiceError> {
        info!(
            verification_id = %existing.verification_id.0,
            submission_key = %existing.submission_key.0,
            "duplicate submission, returning stored verification"
        );
        // An approved record without a credit means a previous ledger call failed or a
        // concurrent submission is still settling. The ledger answers `Existing` for
        // the latter, so only the call that mints reports `credit_created`.
        let (record, credit_created) = self.settle_credit(existing)?;
        Ok(SubmissionOutcome {
            record,
            credit_created,
            replayed: true,
        })
    }

    fn settle_credit(
        &self,
        mut record: VerificationRecord,
    ) -> Result<(VerificationRecord, bool), VerificationServiceError> {
        if record.status != VerificationStatus::Approved || record.credit.is_some() {
            return Ok((record, false));
        }

        let instruction = self.credit_instruction(&record);
        let outcome = match self.ledger.issue(instruction) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(
                    verification_id = %record.verification_id.0,
                    error = %error,
                    "credit issuance failed; record stays approved without credit"
                );
                return Err(error.into());
            }
        };

        let minted = outcome.is_minted();
        let credit = outcome.into_credit();
        if minted {
            info!(
                verification_id = %record.verification_id.0,
                credit_id = %credit.credit_id.0,
                amount_kg = credit.amount_kg,
                "credit issued"
            );
        } else {
            info!(
                verification_id = %record.verification_id.0,
                credit_id = %credit.credit_id.0,
                "credit already issued for submission"
            );
        }
        record.credit = Some(credit);
        self.repository.update(record.clone())?;
        Ok((record, minted))
    }

    fn credit_instruction(&self, record: &VerificationRecord) -> CreditInstruction {
        let amount_kg = record.report.hydrogen_output_kg;
        let method = record.report.production_method;
        CreditInstruction {
            submission_key: record.submission_key.clone(),
            verification_id: record.verification_id.clone(),
            producer_id: record.producer_id.clone(),
            name: credit_name(method.display_name(), amount_kg),
            production_method: method,
            amount_kg,
            price_per_kg: self.credit_price_per_kg,
            total_value: amount_kg * self.credit_price_per_kg,
        }
    }
}

pub fn credit_name(method: &str, amount_kg: f64) -> String {
    format!("{method} H₂ Credit - {amount_kg}kg")
}

/// Error raised by the verification service.
#[derive(Debug, thiserror::Error)]
pub enum VerificationServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl VerificationServiceError {
    /// Caller-side problems, as opposed to storage or ledger faults.
    pub fn is_invalid_submission(&self) -> bool {
        matches!(
            self,
            Self::Intake(_) | Self::Evaluation(EvaluationError::InvalidInput(_))
        )
    }
}
