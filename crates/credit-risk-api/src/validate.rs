//! Per-endpoint request validation.
//!
//! Each validator checks, in order and stopping at the first failure:
//! the body is a non-empty JSON object, every required field is present,
//! every field parses to the expected numeric type, and domain ranges hold.
//! FICO outside 300..=850 is only logged.

use credit_risk_core::{is_typical_fico, RISK_SCORE_MAX, RISK_SCORE_MIN};
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::error::ApiError;

pub const MEMBER_ID: &str = "member_id";
pub const FICO_RANGE_HIGH: &str = "fico_range_high";
pub const ANNUAL_INC: &str = "annual_inc";
pub const LOAN_AMNT: &str = "loan_amnt";
pub const RISK_SCORE: &str = "risk_score";

/// Whole-valued reals at or beyond this magnitude do not fit an `i128`.
const I128_LIMIT: f64 = 1.7e38;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupInput {
    /// Wider than stored ids so oversized integers still parse and simply
    /// match nothing.
    pub member_id: i128,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScoreInput {
    pub fico: f64,
    pub annual_income: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditLossInput {
    pub loan_amount: f64,
    pub risk_score: f64,
}

pub fn validate_lookup(raw: &[u8]) -> Result<LookupInput, ApiError> {
    let body = parse_body(raw)?;
    require_fields(&body, &[MEMBER_ID])?;
    let value = field(&body, MEMBER_ID)?;
    let member_id = as_integer(value).ok_or_else(|| {
        error!(member_id = %value, "invalid member_id format");
        ApiError::InvalidType {
            field: MEMBER_ID,
            message: "member_id must be a valid integer",
        }
    })?;
    Ok(LookupInput { member_id })
}

pub fn validate_risk_score(raw: &[u8]) -> Result<RiskScoreInput, ApiError> {
    let body = parse_body(raw)?;
    require_fields(&body, &[FICO_RANGE_HIGH, ANNUAL_INC])?;

    let invalid = |name: &'static str| {
        error!(field = name, "invalid numeric value");
        ApiError::InvalidType {
            field: name,
            message: "fico_range_high and annual_inc must be valid numbers",
        }
    };
    let fico = as_real(field(&body, FICO_RANGE_HIGH)?).ok_or_else(|| invalid(FICO_RANGE_HIGH))?;
    let annual_income = as_real(field(&body, ANNUAL_INC)?).ok_or_else(|| invalid(ANNUAL_INC))?;

    if !is_typical_fico(fico) {
        warn!(fico, "FICO score out of typical range");
    }
    if annual_income < 0.0 {
        error!(annual_income, "invalid negative income");
        return Err(ApiError::OutOfRange {
            field: ANNUAL_INC,
            message: "annual_inc must be positive",
        });
    }

    Ok(RiskScoreInput {
        fico,
        annual_income,
    })
}

pub fn validate_credit_loss(raw: &[u8]) -> Result<CreditLossInput, ApiError> {
    let body = parse_body(raw)?;
    require_fields(&body, &[LOAN_AMNT, RISK_SCORE])?;

    let invalid = |name: &'static str| {
        error!(field = name, "invalid numeric value");
        ApiError::InvalidType {
            field: name,
            message: "loan_amnt and risk_score must be valid numbers",
        }
    };
    let loan_amount = as_real(field(&body, LOAN_AMNT)?).ok_or_else(|| invalid(LOAN_AMNT))?;
    let risk_score = as_real(field(&body, RISK_SCORE)?).ok_or_else(|| invalid(RISK_SCORE))?;

    if loan_amount < 0.0 {
        error!(loan_amount, "invalid negative loan amount");
        return Err(ApiError::OutOfRange {
            field: LOAN_AMNT,
            message: "loan_amnt must be positive",
        });
    }
    if !(RISK_SCORE_MIN..=RISK_SCORE_MAX).contains(&risk_score) {
        error!(risk_score, "risk score out of range");
        return Err(ApiError::OutOfRange {
            field: RISK_SCORE,
            message: "risk_score must be between 0 and 100",
        });
    }

    Ok(CreditLossInput {
        loan_amount,
        risk_score,
    })
}

/// An absent, unparseable, non-object or empty-object body all count as
/// missing.
pub fn parse_body(raw: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        Ok(_) => {
            error!("no JSON body provided");
            Err(ApiError::MissingBody)
        }
        Err(err) => {
            error!(error = %err, "request body is not valid JSON");
            Err(ApiError::MissingBody)
        }
    }
}

fn require_fields(body: &Map<String, Value>, names: &[&'static str]) -> Result<(), ApiError> {
    for &name in names {
        if !body.contains_key(name) {
            error!(field = name, "missing required field");
            return Err(ApiError::MissingField(name));
        }
    }
    Ok(())
}

fn field<'a>(body: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, ApiError> {
    body.get(name).ok_or(ApiError::MissingField(name))
}

/// JSON numbers, or strings holding a finite real. Booleans, null and
/// containers never coerce.
pub fn as_real(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// JSON integers of any `i64`/`u64` size, whole-valued JSON reals, or
/// strings holding an integer.
#[allow(clippy::cast_possible_truncation)]
pub fn as_integer(value: &Value) -> Option<i128> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i128::from(i));
            }
            if let Some(u) = n.as_u64() {
                return Some(i128::from(u));
            }
            let f = n.as_f64()?;
            (f.is_finite() && f.fract() == 0.0 && f.abs() < I128_LIMIT).then(|| f as i128)
        }
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(v: Value) -> Vec<u8> {
        serde_json::to_vec(&v).expect("encode")
    }

    #[test]
    fn empty_or_non_object_body_is_missing() {
        let cases: [&[u8]; 6] = [b"", b"{}", b"null", b"[1,2]", b"42", b"{not json"];
        for raw in cases {
            assert!(matches!(parse_body(raw), Err(ApiError::MissingBody)), "{raw:?}");
        }
    }

    #[test]
    fn lookup_accepts_integer_like_values() {
        for v in [json!(101), json!(101.0), json!("101"), json!(" 101 ")] {
            let input = validate_lookup(&bytes(json!({ "member_id": v }))).expect("valid");
            assert_eq!(input.member_id, 101);
        }
    }

    #[test]
    fn lookup_rejects_non_integers() {
        for v in [json!(101.5), json!("abc"), json!(true), json!(null), json!([101])] {
            let err = validate_lookup(&bytes(json!({ "member_id": v }))).expect_err("invalid");
            assert!(matches!(err, ApiError::InvalidType { field: MEMBER_ID, .. }));
        }
    }

    #[test]
    fn lookup_accepts_integers_beyond_i64() {
        let raw = br#"{"member_id": 18446744073709551615}"#;
        let input = validate_lookup(raw).expect("u64 max parses");
        assert_eq!(input.member_id, i128::from(u64::MAX));

        let input = validate_lookup(br#"{"member_id": "-9223372036854775809"}"#).expect("string");
        assert_eq!(input.member_id, i128::from(i64::MIN) - 1);

        let input = validate_lookup(br#"{"member_id": 1e20}"#).expect("whole real");
        assert_eq!(input.member_id, 100_000_000_000_000_000_000);
    }

    #[test]
    fn lookup_requires_member_id() {
        let err = validate_lookup(&bytes(json!({"id": 1}))).expect_err("missing");
        assert!(matches!(err, ApiError::MissingField(MEMBER_ID)));
    }

    #[test]
    fn risk_checks_presence_before_types() {
        let err = validate_risk_score(&bytes(json!({"fico_range_high": "bad"}))).expect_err("missing");
        assert!(matches!(err, ApiError::MissingField(ANNUAL_INC)));

        let err = validate_risk_score(&bytes(json!({"annual_inc": 1}))).expect_err("missing");
        assert!(matches!(err, ApiError::MissingField(FICO_RANGE_HIGH)));
    }

    #[test]
    fn risk_rejects_non_numeric_and_negative_income() {
        let err = validate_risk_score(&bytes(json!({"fico_range_high": "abc", "annual_inc": 1})))
            .expect_err("invalid");
        assert_eq!(
            err.public_message(),
            "fico_range_high and annual_inc must be valid numbers"
        );

        let err = validate_risk_score(&bytes(json!({"fico_range_high": 700, "annual_inc": "NaN"})))
            .expect_err("non-finite");
        assert!(matches!(err, ApiError::InvalidType { field: ANNUAL_INC, .. }));

        let err = validate_risk_score(&bytes(json!({"fico_range_high": 700, "annual_inc": -1})))
            .expect_err("negative");
        assert!(matches!(err, ApiError::OutOfRange { field: ANNUAL_INC, .. }));
    }

    #[test]
    fn risk_tolerates_atypical_fico() {
        let input = validate_risk_score(&bytes(json!({"fico_range_high": 120, "annual_inc": "0"})))
            .expect("warn only");
        assert_eq!(input.fico, 120.0);
        assert_eq!(input.annual_income, 0.0);
    }

    #[test]
    fn credit_loss_range_checks() {
        let err = validate_credit_loss(&bytes(json!({"loan_amnt": -5, "risk_score": 10})))
            .expect_err("negative loan");
        assert_eq!(err.public_message(), "loan_amnt must be positive");

        for score in [-0.01, 100.01] {
            let err = validate_credit_loss(&bytes(json!({"loan_amnt": 5, "risk_score": score})))
                .expect_err("score range");
            assert!(matches!(err, ApiError::OutOfRange { field: RISK_SCORE, .. }));
        }

        let ok = validate_credit_loss(&bytes(json!({"loan_amnt": "0", "risk_score": 100})))
            .expect("bounds inclusive");
        assert_eq!(ok.risk_score, 100.0);
    }

    #[test]
    fn loan_sign_checked_before_score_range() {
        let err = validate_credit_loss(&bytes(json!({"loan_amnt": -1, "risk_score": 500})))
            .expect_err("both bad");
        assert!(matches!(err, ApiError::OutOfRange { field: LOAN_AMNT, .. }));
    }
}
