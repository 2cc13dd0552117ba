use chrono::NaiveDate;

use super::domain::{InvalidInput, ProductionReport, ProductionSubmission, SubmissionKey};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation errors raised before a submission reaches the engine.
#[derive(Debug, thiserror::Error)]
pub enum IntakeViolation {
    #[error("submission key is required so duplicate submissions cannot mint twice")]
    MissingSubmissionKey,
    #[error("producer id is required")]
    MissingProducer,
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
}

/// Submission reduced to what the engine and the ledger need.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedSubmission {
    pub submission_key: SubmissionKey,
    pub producer_id: String,
    pub report: ProductionReport,
}

pub fn parse_production_date(raw: &str) -> Result<NaiveDate, InvalidInput> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| InvalidInput::MalformedDate(raw.to_string()))
}

/// Guard responsible for producing `ProductionReport` instances from wire submissions.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// `today` stands in for a missing production date.
    pub fn accept(
        &self,
        submission: ProductionSubmission,
        today: NaiveDate,
    ) -> Result<AcceptedSubmission, IntakeViolation> {
        let submission_key = submission.submission_key.trim();
        if submission_key.is_empty() {
            return Err(IntakeViolation::MissingSubmissionKey);
        }
        let producer_id = submission.producer_id.trim();
        if producer_id.is_empty() {
            return Err(IntakeViolation::MissingProducer);
        }

        let report = self.report_from_submission(&submission, today)?;

        Ok(AcceptedSubmission {
            submission_key: SubmissionKey(submission_key.to_string()),
            producer_id: producer_id.to_string(),
            report,
        })
    }

    /// Report-only conversion; keys are not needed for a preview.
    pub fn report_from_submission(
        &self,
        submission: &ProductionSubmission,
        today: NaiveDate,
    ) -> Result<ProductionReport, InvalidInput> {
        let production_date = match submission.production_date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_production_date(raw)?,
            _ => today,
        };

        let report = ProductionReport {
            energy_input_mwh: submission.energy_mwh,
            hydrogen_output_kg: submission.h2_kg,
            production_method: submission.production_method,
            production_date,
        };
        report.validate()?;
        Ok(report)
    }
}
