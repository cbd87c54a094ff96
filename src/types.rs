use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Category label used when a record has no value for a dimension.
pub const NOT_AVAILABLE: &str = "N/A";
/// Label in the first column of a pivot table's trailing summary row.
pub const TOTAL_LABEL: &str = "TOTAL";

/// One decoded cell as handed over by a file decoder.
///
/// CSV decoding only produces `Text` and `Blank`; spreadsheet decoders
/// may also hand over native numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Blank,
}

impl RawValue {
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Blank => true,
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Number(_) => false,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            RawValue::Blank => Ok(()),
            // Whole numbers print without a trailing `.0` so that a numeric
            // cell `5` and a text cell `"5"` land in the same category.
            RawValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            RawValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            RawValue::Blank
        } else {
            RawValue::Text(s.to_string())
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

/// A decoded row: column name to cell.
pub type RawRow = HashMap<String, RawValue>;

/// A normalized insurance claim.
///
/// The raw fields are kept as decoded (plus any derived categorical
/// fields), so dimensions added later need no code changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimRecord {
    pub fields: RawRow,
    pub parsed_claim_intimation_date: Option<NaiveDate>,
    pub claim_amount: f64,
    pub settled_amount: f64,
    /// `None` when the TAT cell is blank or not a number.
    pub tat: Option<f64>,
}

impl ClaimRecord {
    pub fn raw(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field)
    }

    /// The record's value for a categorical dimension, with absent or
    /// blank values resolved to `"N/A"`.
    pub fn category(&self, field: &str) -> String {
        match self.fields.get(field) {
            Some(v) if !v.is_blank() => v.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Registered,
    Unregistered,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Registered, Bucket::Unregistered];

    pub fn name(&self) -> &'static str {
        match self {
            Bucket::Registered => "registered",
            Bucket::Unregistered => "unregistered",
        }
    }
}

/// Classified records. Every bucket is present, possibly empty, and each
/// bucket keeps input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessedData {
    pub buckets: BTreeMap<Bucket, Vec<ClaimRecord>>,
}

impl ProcessedData {
    pub fn bucket(&self, bucket: Bucket) -> &[ClaimRecord] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn registered(&self) -> &[ClaimRecord] {
        self.bucket(Bucket::Registered)
    }

    pub fn total_records(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// A single pivot cell, used when a caller addresses a row by column name.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// One pivot row: the category label followed by one number per numeric
/// column of the owning table.
///
/// The summary row is flagged by `summary`, not by its label, so a
/// category that happens to be called `TOTAL` stays an ordinary row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub label: String,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub summary: bool,
}

impl PivotRow {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        PivotRow { label: label.into(), values, summary: false }
    }

    /// The trailing summary row, labelled [`TOTAL_LABEL`].
    pub fn total(values: Vec<f64>) -> Self {
        PivotRow { label: TOTAL_LABEL.to_string(), values, summary: true }
    }

    pub fn is_total(&self) -> bool {
        self.summary
    }
}

/// Summary table for one dimension. `columns[0]` is the dimension name;
/// the remaining columns are numeric and line up with `PivotRow::values`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn dimension(&self) -> &str {
        self.columns.first().map(String::as_str).unwrap_or_default()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Every column except the leading category column sorts numerically.
    pub fn is_numeric_column(&self, column: &str) -> bool {
        matches!(self.column_index(column), Some(i) if i > 0)
    }

    pub fn cell(&self, row: &PivotRow, column: &str) -> Option<CellValue> {
        match self.column_index(column)? {
            0 => Some(CellValue::Text(row.label.clone())),
            i => row.values.get(i - 1).copied().map(CellValue::Number),
        }
    }

    /// Numeric value of `column` in the group row with the given label.
    /// The summary row is never matched; use [`PivotTable::total_value`].
    pub fn value(&self, label: &str, column: &str) -> Option<f64> {
        let i = self.column_index(column)?.checked_sub(1)?;
        self.body()
            .iter()
            .find(|r| r.label == label)
            .and_then(|r| r.values.get(i).copied())
    }

    pub fn total_value(&self, column: &str) -> Option<f64> {
        let i = self.column_index(column)?.checked_sub(1)?;
        self.total_row().and_then(|r| r.values.get(i).copied())
    }

    pub fn total_row(&self) -> Option<&PivotRow> {
        self.rows.last().filter(|r| r.is_total())
    }

    /// Rows without the trailing TOTAL row.
    pub fn body(&self) -> &[PivotRow] {
        match self.total_row() {
            Some(_) => &self.rows[..self.rows.len() - 1],
            None => &self.rows,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }
}

/// Pivot tables keyed by dimension, in the configured dimension order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PivotDict {
    pub tables: Vec<PivotTable>,
}

impl PivotDict {
    pub fn get(&self, dimension: &str) -> Option<&PivotTable> {
        self.tables.iter().find(|t| t.dimension() == dimension)
    }

    pub fn dimensions(&self) -> Vec<&str> {
        self.tables.iter().map(PivotTable::dimension).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }
}

/// Headline metrics, each as a display string and the number behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiData {
    pub total_rows: String,
    pub sum_claim: String,
    pub sum_settled: String,
    pub avg_tat: String,
    pub total_rows_raw: usize,
    pub sum_claim_raw: f64,
    pub sum_settled_raw: f64,
    pub avg_tat_raw: f64,
}

/// Output of one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub pivots: PivotDict,
    pub kpis: KpiData,
}

/// A complete filter selection. Unset dates and empty value sets mean
/// "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub categorical: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSpec {
    pub fn with_date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn with_date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn with_values<I, S>(mut self, dimension: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical
            .entry(dimension.to_string())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.categorical.values().all(BTreeSet::is_empty)
    }
}
