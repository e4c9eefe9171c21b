pub const RISK_SCORE_MIN: f64 = 0.0;
pub const RISK_SCORE_MAX: f64 = 100.0;

const BASE_SCORE: f64 = 100.0;
const FICO_DIVISOR: f64 = 8.5;
const HIGH_INCOME_THRESHOLD: f64 = 80_000.0;
const HIGH_INCOME_DISCOUNT: f64 = 15.0;

const MEDIUM_RISK_FLOOR: f64 = 30.0;
const HIGH_RISK_FLOOR: f64 = 60.0;

pub const FICO_MIN: f64 = 300.0;
pub const FICO_MAX: f64 = 850.0;

/// Three-tier bucket derived from a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Lower bound of each higher tier is inclusive: 30 is Medium, 60 is High.
    pub fn from_score(score: f64) -> Self {
        if score < MEDIUM_RISK_FLOOR {
            Self::Low
        } else if score < HIGH_RISK_FLOOR {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub score: f64,
    pub category: RiskCategory,
}

/// Linear heuristic: higher FICO means lower risk, with a flat discount for
/// incomes above 80k. Total over all reals; the result is clamped to [0,100].
pub fn risk_score(fico: f64, annual_income: f64) -> f64 {
    let mut base = BASE_SCORE - fico / FICO_DIVISOR;
    if annual_income > HIGH_INCOME_THRESHOLD {
        base -= HIGH_INCOME_DISCOUNT;
    }
    base.clamp(RISK_SCORE_MIN, RISK_SCORE_MAX)
}

pub fn assess(fico: f64, annual_income: f64) -> RiskAssessment {
    let score = risk_score(fico, annual_income);
    RiskAssessment {
        score,
        category: RiskCategory::from_score(score),
    }
}

/// Expected credit loss. Callers are responsible for keeping `risk_score`
/// in [0,100] and `loan_amount` non-negative; nothing is clamped here.
pub fn expected_loss(loan_amount: f64, risk_score: f64) -> f64 {
    loan_amount * (risk_score / 100.0)
}

pub fn is_typical_fico(fico: f64) -> bool {
    (FICO_MIN..=FICO_MAX).contains(&fico)
}

/// Magnitude past which an `f64` carries no fractional cents.
const ROUNDING_LIMIT: f64 = 1.0e15;

/// Rounds to two decimal places, ties to even. Values too large to hold
/// cents, and non-finite values, are returned unchanged.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= ROUNDING_LIMIT {
        return value;
    }
    (value * 100.0).round_ties_even() / 100.0
}
