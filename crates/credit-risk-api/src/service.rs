use std::path::Path;

use credit_risk_core::{assess, expected_loss, round2};
use credit_risk_storage::{BorrowerRecord, BorrowerStore, StoreSource};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::protocol::{CreditLossResponse, HealthResponse, RiskScoreResponse, CURRENCY};
use crate::validate::{validate_credit_loss, validate_lookup, validate_risk_score};

/// Transport-independent request handling. Holds the borrower table, which
/// is fully loaded before the service is constructed and never mutated.
#[derive(Debug)]
pub struct CreditRiskService {
    store: BorrowerStore,
}

impl CreditRiskService {
    pub fn new(store: BorrowerStore) -> Self {
        Self { store }
    }

    /// Loads the table at `path`, falling back to placeholder records when
    /// the file is missing or malformed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let (store, fallback) = BorrowerStore::open_or_placeholder(path);
        match (&fallback, store.source()) {
            (Some(err), _) => {
                warn!(path = %path.display(), error = %err, records = store.len(), "borrower table unavailable, using placeholder data");
            }
            (None, StoreSource::Csv(p)) => {
                info!(path = %p.display(), records = store.len(), "loaded borrower table");
            }
            (None, StoreSource::Placeholder) => {}
        }

        let stats = store.stats();
        if stats.skipped_rows > 0 {
            warn!(skipped = stats.skipped_rows, "skipped rows without a usable member_id");
        }
        if stats.duplicate_ids > 0 {
            warn!(duplicates = stats.duplicate_ids, "duplicate member_id rows ignored, first occurrence kept");
        }
        Self::new(store)
    }

    pub fn store(&self) -> &BorrowerStore {
        &self.store
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse::healthy(self.store.len())
    }

    pub fn get_data(&self, body: &[u8]) -> Result<BorrowerRecord, ApiError> {
        let input = validate_lookup(body)?;
        info!(member_id = %input.member_id, "received lookup request");
        let found = i64::try_from(input.member_id)
            .ok()
            .and_then(|id| self.store.lookup(id));
        match found {
            Some(record) => {
                info!(member_id = %input.member_id, "retrieved borrower record");
                Ok(record.clone())
            }
            None => {
                warn!(member_id = %input.member_id, "user not found");
                Err(ApiError::NotFound)
            }
        }
    }

    pub fn risk_score(&self, body: &[u8]) -> Result<RiskScoreResponse, ApiError> {
        let input = validate_risk_score(body)?;
        info!(fico = input.fico, income = input.annual_income, "calculating risk");
        let assessment = assess(input.fico, input.annual_income);
        info!(
            risk_score = round2(assessment.score),
            category = %assessment.category,
            "risk calculated"
        );
        Ok(RiskScoreResponse {
            risk_score: round2(assessment.score),
            risk_category: assessment.category.as_str().to_string(),
        })
    }

    pub fn calc_ecl(&self, body: &[u8]) -> Result<CreditLossResponse, ApiError> {
        let input = validate_credit_loss(body)?;
        info!(loan = input.loan_amount, risk_score = input.risk_score, "calculating expected credit loss");
        let loss = expected_loss(input.loan_amount, input.risk_score);
        info!(loss = round2(loss), "expected credit loss calculated");
        Ok(CreditLossResponse {
            expected_credit_loss: round2(loss),
            currency: CURRENCY.to_string(),
        })
    }
}
