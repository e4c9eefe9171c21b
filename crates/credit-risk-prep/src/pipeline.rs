use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use credit_risk_storage::{write_csv_file, BorrowerRecord};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::clean::{clean, CleanReport};
use crate::error::PrepError;
use crate::sample::{stratified_sample, TierCount, DEFAULT_SAMPLE_SIZE};
use crate::source::{read_accepted, read_rejected, SourceReport};

#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub accepted: PathBuf,
    pub rejected: Option<PathBuf>,
    pub output: PathBuf,
    /// Zero keeps every cleaned row.
    pub sample_size: usize,
    /// Caps rows read from each input.
    pub limit: Option<usize>,
    pub seed: Option<u64>,
}

impl PrepareOptions {
    pub fn new(accepted: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            accepted: accepted.into(),
            rejected: None,
            output: output.into(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            limit: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrepareReport {
    pub accepted: SourceReport,
    pub rejected: Option<SourceReport>,
    pub cleaned: CleanReport,
    pub tiers: Vec<TierCount>,
    pub written: usize,
}

/// Runs the full preparation and writes the borrower CSV to `options.output`.
pub fn prepare(options: &PrepareOptions) -> Result<PrepareReport, PrepError> {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (mut records, accepted) =
        read_accepted(BufReader::new(File::open(&options.accepted)?), options.limit)?;
    info!(
        path = %options.accepted.display(),
        read = accepted.rows_read,
        kept = accepted.rows_kept,
        "accepted loans loaded"
    );

    let rejected = match &options.rejected {
        Some(path) => {
            let first_id = next_free_id(&records);
            let (declined, report) = read_rejected(
                BufReader::new(File::open(path)?),
                options.limit,
                first_id,
                &mut rng,
            )?;
            info!(
                path = %path.display(),
                read = report.rows_read,
                kept = report.rows_kept,
                first_id,
                "declined applications loaded"
            );
            records.extend(declined);
            Some(report)
        }
        None => None,
    };

    let (records, cleaned) = clean(records);
    info!(before = cleaned.before, after = cleaned.after, "cleaned");
    if records.is_empty() {
        return Err(PrepError::Empty);
    }

    let (records, tiers) = if options.sample_size == 0 {
        (records, Vec::new())
    } else {
        let outcome = stratified_sample(&records, options.sample_size, &mut rng);
        for tier in &outcome.tiers {
            info!(
                tier = tier.category.as_str(),
                available = tier.available,
                taken = tier.taken,
                "sampled"
            );
        }
        if outcome.records.len() < options.sample_size {
            warn!(
                requested = options.sample_size,
                drawn = outcome.records.len(),
                "not enough rows in every tier to fill the sample"
            );
        }
        (outcome.records, outcome.tiers)
    };

    write_csv_file(&options.output, &records)?;
    info!(path = %options.output.display(), rows = records.len(), "borrower table written");

    Ok(PrepareReport {
        accepted,
        rejected,
        cleaned,
        tiers,
        written: records.len(),
    })
}

/// Declined rows are numbered after the largest accepted id so every id in
/// the output stays unique and non-negative.
fn next_free_id(records: &[BorrowerRecord]) -> i64 {
    records
        .iter()
        .map(|r| r.member_id)
        .max()
        .map_or(1, |max| max.saturating_add(1).max(1))
}
