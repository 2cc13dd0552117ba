use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::verification::domain::{
    CreditId, ProductionMethod, ProductionReport, ProductionSubmission, SubmissionKey,
    VerificationId,
};
use crate::verification::evaluation::VerificationEngine;
use crate::verification::repository::{
    CreditInstruction, CreditLedger, IssueOutcome, IssuedCredit, LedgerError, RepositoryError,
    VerificationRecord, VerificationRepository,
};
use crate::verification::{verification_router, VerificationService};

pub(super) const CREDIT_PRICE_PER_KG: f64 = 2.5;

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn report(
    energy_input_mwh: f64,
    hydrogen_output_kg: f64,
    production_method: ProductionMethod,
    production_date: NaiveDate,
) -> ProductionReport {
    ProductionReport {
        energy_input_mwh,
        hydrogen_output_kg,
        production_method,
        production_date,
    }
}

/// Wind, 50 MWh into 1000 kg in February. Clears every gate.
pub(super) fn approved_report() -> ProductionReport {
    report(50.0, 1000.0, ProductionMethod::Wind, date(2025, 2, 10))
}

/// Wind, 10 MWh into 50 kg. 200 kWh/kg is far outside every band.
pub(super) fn implausible_report() -> ProductionReport {
    report(10.0, 50.0, ProductionMethod::Wind, date(2025, 1, 20))
}

pub(super) fn engine() -> VerificationEngine {
    VerificationEngine::standard()
}

pub(super) fn submission(key: &str, producer_id: &str) -> ProductionSubmission {
    ProductionSubmission {
        submission_key: key.to_string(),
        producer_id: producer_id.to_string(),
        energy_mwh: 50.0,
        h2_kg: 1000.0,
        production_method: ProductionMethod::Wind,
        production_date: Some("2025-02-10".to_string()),
    }
}

pub(super) fn rejected_submission(key: &str, producer_id: &str) -> ProductionSubmission {
    ProductionSubmission {
        energy_mwh: 10.0,
        h2_kg: 50.0,
        production_date: Some("2025-01-20".to_string()),
        ..submission(key, producer_id)
    }
}

pub(super) fn build_service() -> (
    VerificationService<MemoryRepository, MemoryLedger>,
    Arc<MemoryRepository>,
    Arc<MemoryLedger>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let ledger = Arc::new(MemoryLedger::default());
    let service = VerificationService::new(
        repository.clone(),
        ledger.clone(),
        engine(),
        CREDIT_PRICE_PER_KG,
    );
    (service, repository, ledger)
}

pub(super) fn router_with_service(
    service: VerificationService<MemoryRepository, MemoryLedger>,
) -> axum::Router {
    verification_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<BTreeMap<VerificationId, VerificationRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl VerificationRepository for MemoryRepository {
    fn insert(&self, record: VerificationRecord) -> Result<VerificationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let duplicate_key = guard
            .values()
            .any(|existing| existing.submission_key == record.submission_key);
        if duplicate_key || guard.contains_key(&record.verification_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.verification_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: VerificationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.verification_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &VerificationId) -> Result<Option<VerificationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_key(
        &self,
        key: &SubmissionKey,
    ) -> Result<Option<VerificationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|record| &record.submission_key == key)
            .cloned())
    }

    fn for_producer(&self, producer_id: &str) -> Result<Vec<VerificationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.producer_id == producer_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLedger {
    issued: Arc<Mutex<HashMap<SubmissionKey, IssuedCredit>>>,
    instructions: Arc<Mutex<Vec<CreditInstruction>>>,
    sequence: Arc<AtomicU64>,
    latency: Option<Duration>,
}

impl MemoryLedger {
    /// Ledger that stalls before answering, widening the window between issue and update.
    pub(super) fn slow(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub(super) fn instructions(&self) -> Vec<CreditInstruction> {
        self.instructions
            .lock()
            .expect("ledger mutex poisoned")
            .clone()
    }

    pub(super) fn issued_count(&self) -> usize {
        self.issued.lock().expect("ledger mutex poisoned").len()
    }
}

impl CreditLedger for MemoryLedger {
    fn issue(&self, instruction: CreditInstruction) -> Result<IssueOutcome, LedgerError> {
        self.instructions
            .lock()
            .expect("ledger mutex poisoned")
            .push(instruction.clone());
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }
        let mut issued = self.issued.lock().expect("ledger mutex poisoned");
        if let Some(existing) = issued.get(&instruction.submission_key) {
            return Ok(IssueOutcome::Existing(existing.clone()));
        }
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let credit = IssuedCredit {
            credit_id: CreditId(format!("CREDIT-{id:06}")),
            submission_key: instruction.submission_key.clone(),
            verification_id: instruction.verification_id,
            name: instruction.name,
            amount_kg: instruction.amount_kg,
            total_value: instruction.total_value,
            issued_at: Utc::now(),
        };
        issued.insert(instruction.submission_key, credit.clone());
        Ok(IssueOutcome::Minted(credit))
    }
}

pub(super) struct OfflineLedger;

impl CreditLedger for OfflineLedger {
    fn issue(&self, _instruction: CreditInstruction) -> Result<IssueOutcome, LedgerError> {
        Err(LedgerError::Transport("ledger offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl VerificationRepository for UnavailableRepository {
    fn insert(&self, _record: VerificationRecord) -> Result<VerificationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: VerificationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &VerificationId) -> Result<Option<VerificationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_key(
        &self,
        _key: &SubmissionKey,
    ) -> Result<Option<VerificationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_producer(&self, _producer_id: &str) -> Result<Vec<VerificationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
