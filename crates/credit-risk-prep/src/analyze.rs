use std::io::{self, Write};

use credit_risk_core::{risk_score, RiskCategory};
use credit_risk_storage::BorrowerRecord;

const EXTREMES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    pub fn of(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return None;
        };
        let n = sorted.len();
        let mid = n / 2;
        let median = if n % 2 == 0 {
            match (sorted.get(mid - 1), sorted.get(mid)) {
                (Some(a), Some(b)) => (a + b) / 2.0,
                _ => min,
            }
        } else {
            sorted.get(mid).copied().unwrap_or(min)
        };
        #[allow(clippy::cast_precision_loss)]
        let mean = sorted.iter().sum::<f64>() / n as f64;
        Some(Self {
            min,
            max,
            mean,
            median,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBorrower {
    pub member_id: i64,
    pub fico: f64,
    pub income: f64,
    pub loan: Option<f64>,
    pub score: f64,
    pub category: RiskCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub total: usize,
    pub scored: usize,
    pub fico: Option<Stats>,
    pub income: Option<Stats>,
    pub risk: Option<Stats>,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub riskiest: Vec<ScoredBorrower>,
    pub safest: Vec<ScoredBorrower>,
}

impl DatasetSummary {
    pub fn from_records(records: &[BorrowerRecord]) -> Self {
        let fico: Vec<f64> = records.iter().filter_map(|r| r.fico_range_high).collect();
        let income: Vec<f64> = records.iter().filter_map(|r| r.annual_inc).collect();

        let mut scored: Vec<ScoredBorrower> = records
            .iter()
            .filter_map(|r| {
                let fico = r.fico_range_high?;
                let income = r.annual_inc?;
                let score = risk_score(fico, income);
                Some(ScoredBorrower {
                    member_id: r.member_id,
                    fico,
                    income,
                    loan: r.loan_amnt,
                    score,
                    category: RiskCategory::from_score(score),
                })
            })
            .collect();
        let scores: Vec<f64> = scored.iter().map(|s| s.score).collect();
        let count = |c: RiskCategory| scored.iter().filter(|s| s.category == c).count();
        let (low, medium, high) = (
            count(RiskCategory::Low),
            count(RiskCategory::Medium),
            count(RiskCategory::High),
        );

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        let riskiest: Vec<_> = scored.iter().take(EXTREMES).cloned().collect();
        let safest: Vec<_> = scored.iter().rev().take(EXTREMES).cloned().collect();

        Self {
            total: records.len(),
            scored: scored.len(),
            fico: Stats::of(&fico),
            income: Stats::of(&income),
            risk: Stats::of(&scores),
            low,
            medium,
            high,
            riskiest,
            safest,
        }
    }

    pub fn all_low_risk(&self) -> bool {
        self.scored > 0 && self.low == self.scored
    }

    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "DATASET ANALYSIS")?;
        writeln!(out, "total borrowers: {}", self.total)?;

        if let Some(s) = &self.fico {
            writeln!(out, "\nFICO")?;
            writeln!(out, "  min {:.0}  max {:.0}  mean {:.2}  median {:.2}", s.min, s.max, s.mean, s.median)?;
        }
        if let Some(s) = &self.income {
            writeln!(out, "\nIncome")?;
            writeln!(out, "  min ${:.2}  max ${:.2}  mean ${:.2}", s.min, s.max, s.mean)?;
        }
        if let Some(s) = &self.risk {
            writeln!(out, "\nRisk score")?;
            writeln!(out, "  min {:.2}  max {:.2}  mean {:.2}", s.min, s.max, s.mean)?;
        }

        writeln!(out, "\nRisk categories")?;
        for (label, n) in [
            ("Low (< 30)", self.low),
            ("Medium (30-60)", self.medium),
            ("High (>= 60)", self.high),
        ] {
            writeln!(out, "  {label}: {n} ({:.1}%)", percent(n, self.scored))?;
        }

        writeln!(out, "\nHighest risk borrowers")?;
        write_borrowers(out, &self.riskiest)?;
        writeln!(out, "\nLowest risk borrowers")?;
        write_borrowers(out, &self.safest)?;

        if self.all_low_risk() {
            writeln!(out, "\nWARNING: all borrowers are Low risk; the table has no risk diversity")?;
        }
        Ok(())
    }
}

fn write_borrowers<W: Write>(out: &mut W, rows: &[ScoredBorrower]) -> io::Result<()> {
    writeln!(out, "  {:>12} {:>6} {:>12} {:>10} {:>7} {:<6}", "member_id", "fico", "income", "loan", "risk", "tier")?;
    for b in rows {
        let loan = b.loan.map_or_else(|| "-".to_string(), |v| format!("{v:.0}"));
        writeln!(
            out,
            "  {:>12} {:>6.0} {:>12.0} {:>10} {:>7.2} {:<6}",
            b.member_id,
            b.fico,
            b.income,
            loan,
            b.score,
            b.category.as_str()
        )?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn percent(n: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        n as f64 * 100.0 / total as f64
    }
}
