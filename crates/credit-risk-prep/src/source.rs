//! Column mapping from raw Lending Club exports to the borrower schema.

use std::io::Read;

use credit_risk_core::synthetic_fico;
use credit_risk_storage::{
    parse_id_cell, parse_numeric_cell, BorrowerRecord, ANNUAL_INC, FICO_RANGE_HIGH, LOAN_AMNT,
    LOAN_STATUS, MEMBER_ID,
};
use rand::Rng;

use crate::error::PrepError;

const ACCEPTED: &str = "accepted";
const REJECTED: &str = "rejected";

const RAW_ID: &str = "id";
const AMOUNT_REQUESTED: &str = "Amount Requested";
const BUREAU_RISK_SCORE: &str = "Risk_Score";
const DEBT_TO_INCOME: &str = "Debt-To-Income Ratio";

pub const DEFAULT_ACCEPTED_STATUS: &str = "Fully Paid";
pub const DECLINED_STATUS: &str = "Declined";

const MAX_ESTIMATED_INCOME: f64 = 500_000.0;
const INCOME_MULTIPLE_MIN: f64 = 0.8;
const INCOME_MULTIPLE_MAX: f64 = 2.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub rows_read: usize,
    pub rows_kept: usize,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn require(
    headers: &csv::StringRecord,
    table: &'static str,
    name: &'static str,
) -> Result<usize, PrepError> {
    column(headers, name).ok_or(PrepError::MissingColumn {
        table,
        column: name,
    })
}

/// Reads accepted loans. The raw `id` column becomes `member_id` unless a
/// `member_id` column already exists. Rows with any missing or non-numeric
/// value among the four numeric columns are dropped.
pub fn read_accepted<R: Read>(
    input: R,
    limit: Option<usize>,
) -> Result<(Vec<BorrowerRecord>, SourceReport), PrepError> {
    let mut rdr = reader(input);
    let headers = rdr.headers()?.clone();
    let id_col = match column(&headers, MEMBER_ID) {
        Some(i) => i,
        None => require(&headers, ACCEPTED, RAW_ID)?,
    };
    let loan_col = require(&headers, ACCEPTED, LOAN_AMNT)?;
    let income_col = require(&headers, ACCEPTED, ANNUAL_INC)?;
    let fico_col = require(&headers, ACCEPTED, FICO_RANGE_HIGH)?;
    let status_col = column(&headers, LOAN_STATUS);

    let mut report = SourceReport::default();
    let mut out = Vec::new();
    for row in rdr.records().take(limit.unwrap_or(usize::MAX)) {
        let row = row?;
        report.rows_read += 1;
        let numeric = |i: usize| row.get(i).and_then(parse_numeric_cell);
        let (Some(member_id), Some(loan), Some(income), Some(fico)) = (
            row.get(id_col).and_then(parse_id_cell),
            numeric(loan_col),
            numeric(income_col),
            numeric(fico_col),
        ) else {
            continue;
        };
        let loan_status = match status_col {
            Some(i) => row
                .get(i)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            None => Some(DEFAULT_ACCEPTED_STATUS.to_string()),
        };
        out.push(BorrowerRecord {
            member_id,
            loan_amnt: Some(loan),
            annual_inc: Some(income),
            fico_range_high: Some(fico),
            loan_status,
        });
    }
    report.rows_kept = out.len();
    Ok((out, report))
}

/// Reads declined applications and synthesizes the missing borrower fields:
/// FICO from the bureau risk score, income from the debt-to-income ratio (or
/// a random multiple of the requested amount when no ratio column exists).
/// Identifiers are assigned sequentially from `first_id`.
pub fn read_rejected<R: Read, G: Rng>(
    input: R,
    limit: Option<usize>,
    first_id: i64,
    rng: &mut G,
) -> Result<(Vec<BorrowerRecord>, SourceReport), PrepError> {
    let mut rdr = reader(input);
    let headers = rdr.headers()?.clone();
    let amount_col = require(&headers, REJECTED, AMOUNT_REQUESTED)?;
    let risk_col = column(&headers, BUREAU_RISK_SCORE);
    let dti_col = column(&headers, DEBT_TO_INCOME);

    let mut report = SourceReport::default();
    let mut out = Vec::new();
    let mut next_id = first_id;
    for row in rdr.records().take(limit.unwrap_or(usize::MAX)) {
        let row = row?;
        report.rows_read += 1;
        let member_id = next_id;
        next_id += 1;

        let Some(loan) = row.get(amount_col).and_then(parse_numeric_cell) else {
            continue;
        };
        let fico = risk_col
            .and_then(|i| row.get(i))
            .and_then(parse_numeric_cell)
            .map(synthetic_fico);
        let income = match dti_col {
            Some(i) => row
                .get(i)
                .and_then(parse_ratio)
                .map(|dti| income_from_dti(loan, dti)),
            None => Some(loan * rng.gen_range(INCOME_MULTIPLE_MIN..INCOME_MULTIPLE_MAX)),
        };
        let (Some(fico), Some(income)) = (fico, income) else {
            continue;
        };
        out.push(BorrowerRecord {
            member_id,
            loan_amnt: Some(loan),
            annual_inc: Some(income),
            fico_range_high: Some(fico),
            loan_status: Some(DECLINED_STATUS.to_string()),
        });
    }
    report.rows_kept = out.len();
    Ok((out, report))
}

/// Parses `"27.65%"` (or a bare `27.65`) into `0.2765`.
pub fn parse_ratio(raw: &str) -> Option<f64> {
    parse_numeric_cell(raw.trim().trim_end_matches('%')).map(|pct| pct / 100.0)
}

/// A zero ratio yields the cap rather than infinity.
pub fn income_from_dti(loan: f64, dti: f64) -> f64 {
    if dti == 0.0 {
        return MAX_ESTIMATED_INCOME;
    }
    (loan / dti).min(MAX_ESTIMATED_INCOME)
}
