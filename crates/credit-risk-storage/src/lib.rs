use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

pub const MEMBER_ID: &str = "member_id";
pub const LOAN_AMNT: &str = "loan_amnt";
pub const ANNUAL_INC: &str = "annual_inc";
pub const FICO_RANGE_HIGH: &str = "fico_range_high";
pub const LOAN_STATUS: &str = "loan_status";

/// One row of the borrower table. Numeric cells that were empty or not a
/// number in the source are `None` and serialize as `null`; whole values
/// serialize as integers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BorrowerRecord {
    pub member_id: i64,
    #[serde(serialize_with = "whole_as_integer")]
    pub loan_amnt: Option<f64>,
    #[serde(serialize_with = "whole_as_integer")]
    pub annual_inc: Option<f64>,
    #[serde(serialize_with = "whole_as_integer")]
    pub fico_range_high: Option<f64>,
    pub loan_status: Option<String>,
}

impl BorrowerRecord {
    pub fn new(member_id: i64, loan_amnt: f64, annual_inc: f64, fico_range_high: f64) -> Self {
        Self {
            member_id,
            loan_amnt: Some(loan_amnt),
            annual_inc: Some(annual_inc),
            fico_range_high: Some(fico_range_high),
            loan_status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.loan_status = Some(status.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    Csv(PathBuf),
    Placeholder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub skipped_rows: usize,
    pub duplicate_ids: usize,
}

/// Immutable borrower table keyed by `member_id`.
#[derive(Debug)]
pub struct BorrowerStore {
    source: StoreSource,
    records: Vec<BorrowerRecord>,
    index: HashMap<i64, usize>,
    stats: LoadStats,
}

impl BorrowerStore {
    /// Builds a store from records already in memory. The first record wins
    /// when an identifier repeats; later ones are counted and dropped.
    pub fn from_records(
        source: StoreSource,
        records: impl IntoIterator<Item = BorrowerRecord>,
    ) -> Self {
        let mut stats = LoadStats::default();
        let mut kept = Vec::new();
        let mut index = HashMap::new();
        for record in records {
            stats.rows_read += 1;
            if index.contains_key(&record.member_id) {
                stats.duplicate_ids += 1;
                continue;
            }
            index.insert(record.member_id, kept.len());
            kept.push(record);
        }
        Self {
            source,
            records: kept,
            index,
            stats,
        }
    }

    pub fn open_csv(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(file, StoreSource::Csv(path.to_path_buf()))
    }

    pub fn from_reader<R: Read>(reader: R, source: StoreSource) -> Result<Self, StorageError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = ColumnIndex::from_headers(rdr.headers()?)?;
        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in rdr.records() {
            let row = row?;
            match columns.parse_row(&row) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        let mut store = Self::from_records(source, records);
        store.stats.rows_read += skipped;
        store.stats.skipped_rows = skipped;
        Ok(store)
    }

    /// Fixed three-row table used when the real source cannot be loaded, so
    /// the service stays reachable for manual testing.
    pub fn placeholder() -> Self {
        Self::from_records(
            StoreSource::Placeholder,
            [
                BorrowerRecord::new(101, 10_000.0, 55_000.0, 680.0),
                BorrowerRecord::new(102, 25_000.0, 120_000.0, 790.0),
                BorrowerRecord::new(103, 5_000.0, 35_000.0, 550.0),
            ],
        )
    }

    /// Never fails: on any load error the placeholder table is returned
    /// together with the error that caused the fallback.
    pub fn open_or_placeholder(path: impl AsRef<Path>) -> (Self, Option<StorageError>) {
        match Self::open_csv(path) {
            Ok(store) => (store, None),
            Err(err) => (Self::placeholder(), Some(err)),
        }
    }

    pub fn lookup(&self, member_id: i64) -> Option<&BorrowerRecord> {
        self.index
            .get(&member_id)
            .and_then(|&pos| self.records.get(pos))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BorrowerRecord] {
        &self.records
    }

    pub fn source(&self) -> &StoreSource {
        &self.source
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }
}

/// Writes records in the table schema consumed by [`BorrowerStore`].
pub fn write_csv<W: Write>(writer: W, records: &[BorrowerRecord]) -> Result<(), StorageError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    if records.is_empty() {
        wtr.write_record([MEMBER_ID, LOAN_AMNT, ANNUAL_INC, FICO_RANGE_HIGH, LOAN_STATUS])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_file(path: impl AsRef<Path>, records: &[BorrowerRecord]) -> Result<(), StorageError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_csv(File::create(path)?, records)
}

/// Parses a numeric cell. Empty cells, `NaN` and infinities are missing.
pub fn parse_numeric_cell(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an identifier cell. Whole-valued reals such as `101.0` are
/// accepted since spreadsheet exports often widen integer columns.
#[allow(clippy::cast_possible_truncation)]
pub fn parse_id_cell(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let v = parse_numeric_cell(raw)?;
    if v.fract() == 0.0 && v.abs() < 9.007_199_254_740_992e15 {
        return Some(v as i64);
    }
    None
}

struct ColumnIndex {
    member_id: usize,
    loan_amnt: Option<usize>,
    annual_inc: Option<usize>,
    fico_range_high: Option<usize>,
    loan_status: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, StorageError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let member_id = find(MEMBER_ID).ok_or(StorageError::MissingColumn(MEMBER_ID))?;
        Ok(Self {
            member_id,
            loan_amnt: find(LOAN_AMNT),
            annual_inc: find(ANNUAL_INC),
            fico_range_high: find(FICO_RANGE_HIGH),
            loan_status: find(LOAN_STATUS),
        })
    }

    fn parse_row(&self, row: &csv::StringRecord) -> Option<BorrowerRecord> {
        let member_id = parse_id_cell(row.get(self.member_id)?)?;
        let numeric = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(parse_numeric_cell);
        let loan_status = self
            .loan_status
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Some(BorrowerRecord {
            member_id,
            loan_amnt: numeric(self.loan_amnt),
            annual_inc: numeric(self.annual_inc),
            fico_range_high: numeric(self.fico_range_high),
            loan_status,
        })
    }
}

#[allow(clippy::ref_option, clippy::cast_possible_truncation)]
fn whole_as_integer<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 9.007_199_254_740_992e15 => {
            serializer.serialize_i64(*v as i64)
        }
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}
