use credit_risk_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{table} input is missing column {column}")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("no rows left after cleaning")]
    Empty,
}
