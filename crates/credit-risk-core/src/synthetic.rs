use crate::scoring::{FICO_MAX, FICO_MIN};

const RISK_TO_FICO_SLOPE: f64 = 6.0;

/// Maps a bureau-style 0..100 risk score (higher is riskier) onto the FICO
/// scale. Used for declined applications that carry no FICO of their own.
pub fn synthetic_fico(bureau_risk_score: f64) -> f64 {
    ((100.0 - bureau_risk_score) * RISK_TO_FICO_SLOPE + FICO_MIN).clamp(FICO_MIN, FICO_MAX)
}
