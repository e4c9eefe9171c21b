use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "Credit Risk API";
pub const CURRENCY: &str = "USD";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub records_loaded: usize,
}

impl HealthResponse {
    pub fn healthy(records_loaded: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            records_loaded,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskScoreResponse {
    pub risk_score: f64,
    pub risk_category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditLossResponse {
    pub expected_credit_loss: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
