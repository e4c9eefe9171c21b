use credit_risk_core::{FICO_MAX, FICO_MIN};
use credit_risk_storage::BorrowerRecord;

/// Incomes at or above this are treated as data-entry outliers.
const INCOME_OUTLIER: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub before: usize,
    pub after: usize,
}

/// Keeps rows with a FICO in 300..=850, income in (0, 10M) and a positive
/// loan amount. Rows with any of those values missing are dropped too.
pub fn clean(records: Vec<BorrowerRecord>) -> (Vec<BorrowerRecord>, CleanReport) {
    let before = records.len();
    let kept: Vec<_> = records.into_iter().filter(is_usable).collect();
    let report = CleanReport {
        before,
        after: kept.len(),
    };
    (kept, report)
}

pub fn is_usable(record: &BorrowerRecord) -> bool {
    let (Some(fico), Some(income), Some(loan)) =
        (record.fico_range_high, record.annual_inc, record.loan_amnt)
    else {
        return false;
    };
    (FICO_MIN..=FICO_MAX).contains(&fico) && income > 0.0 && income < INCOME_OUTLIER && loan > 0.0
}
