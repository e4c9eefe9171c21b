//! Stratified sampling across risk tiers so demo tables carry a mix of
//! Low, Medium and High borrowers instead of whatever the raw data skews to.

use credit_risk_core::{risk_score, RiskCategory};
use credit_risk_storage::BorrowerRecord;
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_SAMPLE_SIZE: usize = 200;

/// Per-tier row targets: 70% Low, 20% Medium, the remainder High.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierTargets {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl TierTargets {
    pub fn for_sample_size(n: usize) -> Self {
        let low = (n * 7 + 5) / 10;
        let medium = ((n * 2 + 5) / 10).min(n - low);
        Self {
            low,
            medium,
            high: n - low - medium,
        }
    }

    pub fn get(&self, category: RiskCategory) -> usize {
        match category {
            RiskCategory::Low => self.low,
            RiskCategory::Medium => self.medium,
            RiskCategory::High => self.high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierCount {
    pub category: RiskCategory,
    pub available: usize,
    pub taken: usize,
}

#[derive(Debug, Clone)]
pub struct SampleOutcome {
    pub records: Vec<BorrowerRecord>,
    pub tiers: Vec<TierCount>,
}

/// Tier of a cleaned record. Rows missing FICO or income are not
/// classifiable and never sampled.
pub fn tier_of(record: &BorrowerRecord) -> Option<RiskCategory> {
    let fico = record.fico_range_high?;
    let income = record.annual_inc?;
    Some(RiskCategory::from_score(risk_score(fico, income)))
}

/// Draws up to the tier target from each tier, uniformly without
/// replacement. Output is grouped Low, Medium, High.
pub fn stratified_sample<G: Rng>(
    records: &[BorrowerRecord],
    sample_size: usize,
    rng: &mut G,
) -> SampleOutcome {
    let targets = TierTargets::for_sample_size(sample_size);
    let mut out = Vec::with_capacity(sample_size);
    let mut tiers = Vec::with_capacity(RiskCategory::ALL.len());

    for category in RiskCategory::ALL {
        let pool: Vec<&BorrowerRecord> = records
            .iter()
            .filter(|r| tier_of(r) == Some(category))
            .collect();
        let take = targets.get(category).min(pool.len());
        out.extend(pool.choose_multiple(rng, take).map(|r| (*r).clone()));
        tiers.push(TierCount {
            category,
            available: pool.len(),
            taken: take,
        });
    }

    SampleOutcome {
        records: out,
        tiers,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn rows(n: usize, start: i64, fico: f64, income: f64) -> Vec<BorrowerRecord> {
        (0..n)
            .map(|i| BorrowerRecord::new(start + i as i64, 5000.0, income, fico))
            .collect()
    }

    #[test]
    fn targets_split_seventy_twenty_ten() {
        assert_eq!(
            TierTargets::for_sample_size(200),
            TierTargets {
                low: 140,
                medium: 40,
                high: 20
            }
        );
        let t = TierTargets::for_sample_size(7);
        assert_eq!(t.low + t.medium + t.high, 7);
        assert_eq!(TierTargets::for_sample_size(0).low, 0);
        assert_eq!(TierTargets::for_sample_size(1).low, 1);
    }

    #[test]
    fn sample_respects_targets_and_tiers() {
        // fico 800 -> Low, fico 400 -> Medium (52.9), fico 310 -> High (63.5)
        let mut records = rows(300, 0, 800.0, 50_000.0);
        records.extend(rows(100, 1_000, 400.0, 50_000.0));
        records.extend(rows(5, 2_000, 310.0, 50_000.0));

        let mut rng = StdRng::seed_from_u64(42);
        let outcome = stratified_sample(&records, 200, &mut rng);

        let taken: Vec<usize> = outcome.tiers.iter().map(|t| t.taken).collect();
        assert_eq!(taken, vec![140, 40, 5]);
        assert_eq!(outcome.records.len(), 185);

        for (i, rec) in outcome.records.iter().enumerate() {
            let expected = if i < 140 {
                RiskCategory::Low
            } else if i < 180 {
                RiskCategory::Medium
            } else {
                RiskCategory::High
            };
            assert_eq!(tier_of(rec), Some(expected));
        }

        let unique: HashSet<i64> = outcome.records.iter().map(|r| r.member_id).collect();
        assert_eq!(unique.len(), outcome.records.len());
    }

    #[test]
    fn same_seed_same_sample() {
        let records = rows(500, 0, 780.0, 40_000.0);
        let a = stratified_sample(&records, 50, &mut StdRng::seed_from_u64(3));
        let b = stratified_sample(&records, 50, &mut StdRng::seed_from_u64(3));
        assert_eq!(a.records, b.records);
    }
}
