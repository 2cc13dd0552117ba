use chrono::{NaiveDate, Utc};
use h2_verify::config::VerificationSettings;
use h2_verify::error::AppError;
use h2_verify::verification::intake::parse_production_date;
use h2_verify::verification::{
    CreditId, CreditInstruction, CreditLedger, EvaluationConfig, IssueOutcome, IssuedCredit,
    LedgerError, RepositoryError, SubmissionKey, VerificationEngine, VerificationId,
    VerificationRecord, VerificationRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct RecordIndex {
    records: BTreeMap<VerificationId, VerificationRecord>,
    by_key: HashMap<SubmissionKey, VerificationId>,
}

/// Process-local store. Insert checks and claims the submission key under one lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryVerificationRepository {
    index: Arc<Mutex<RecordIndex>>,
}

impl InMemoryVerificationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, RecordIndex>, RepositoryError> {
        self.index
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl VerificationRepository for InMemoryVerificationRepository {
    fn insert(&self, record: VerificationRecord) -> Result<VerificationRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.by_key.contains_key(&record.submission_key)
            || guard.records.contains_key(&record.verification_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard
            .by_key
            .insert(record.submission_key.clone(), record.verification_id.clone());
        guard
            .records
            .insert(record.verification_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: VerificationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.records.get_mut(&record.verification_id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &VerificationId) -> Result<Option<VerificationRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.records.get(id).cloned())
    }

    fn find_by_key(
        &self,
        key: &SubmissionKey,
    ) -> Result<Option<VerificationRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .by_key
            .get(key)
            .and_then(|id| guard.records.get(id))
            .cloned())
    }

    fn for_producer(&self, producer_id: &str) -> Result<Vec<VerificationRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .records
            .values()
            .filter(|record| record.producer_id == producer_id)
            .cloned()
            .collect())
    }
}

static CREDIT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_credit_id() -> CreditId {
    let id = CREDIT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CreditId(format!("CREDIT-{id:06}"))
}

/// Ledger stand-in keyed on the submission key, so reissuing returns the first credit.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCreditLedger {
    credits: Arc<Mutex<HashMap<SubmissionKey, IssuedCredit>>>,
}

impl InMemoryCreditLedger {
    #[cfg(test)]
    pub(crate) fn issued(&self) -> Vec<IssuedCredit> {
        self.credits
            .lock()
            .map(|credits| credits.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl CreditLedger for InMemoryCreditLedger {
    fn issue(&self, instruction: CreditInstruction) -> Result<IssueOutcome, LedgerError> {
        let mut credits = self
            .credits
            .lock()
            .map_err(|_| LedgerError::Transport("ledger mutex poisoned".to_string()))?;

        if let Some(existing) = credits.get(&instruction.submission_key) {
            return Ok(IssueOutcome::Existing(existing.clone()));
        }
        let credit = IssuedCredit {
            credit_id: next_credit_id(),
            submission_key: instruction.submission_key.clone(),
            verification_id: instruction.verification_id,
            name: instruction.name,
            amount_kg: instruction.amount_kg,
            total_value: instruction.total_value,
            issued_at: Utc::now(),
        };
        credits.insert(instruction.submission_key, credit.clone());
        Ok(IssueOutcome::Minted(credit))
    }
}

/// Engine over the configured tables, or the built-in ones when no file is set.
pub(crate) fn engine_from_settings(
    settings: &VerificationSettings,
) -> Result<VerificationEngine, AppError> {
    match &settings.engine_config_path {
        Some(path) => {
            let config = EvaluationConfig::from_path(path)?;
            info!(path = %path.display(), "loaded engine configuration");
            Ok(VerificationEngine::new(config)?)
        }
        None => Ok(VerificationEngine::standard()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_production_date(raw).map_err(|err| err.to_string())
}
