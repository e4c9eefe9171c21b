//! Offline preparation of the borrower table served by `credit-riskd`.
//!
//! `prepare` maps raw accepted/declined loan exports onto the borrower
//! schema, drops unusable rows and draws a tier-balanced sample. `analyze`
//! summarizes a prepared table.

pub mod analyze;
pub mod clean;
pub mod error;
pub mod pipeline;
pub mod sample;
pub mod source;

pub use analyze::{DatasetSummary, Stats};
pub use error::PrepError;
pub use pipeline::{prepare, PrepareOptions, PrepareReport};
pub use sample::{stratified_sample, TierTargets, DEFAULT_SAMPLE_SIZE};
