//! Month-over-month trend series with top-N + "Other" consolidation.
//!
//! For each breakdown category, values are ranked by their total over the
//! dated records; the top `n` keep their own series and the rest are
//! merged into `"Other"`. Ties in the ranking keep the order in which each
//! value first appears in the record set, undated records included.

use crate::types::ClaimRecord;
use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Count,
    Claim,
    Settled,
}

impl Metric {
    pub fn value(&self, record: &ClaimRecord) -> f64 {
        match self {
            Metric::Count => 1.0,
            Metric::Claim => record.claim_amount,
            Metric::Settled => record.settled_amount,
        }
    }

    pub fn parse(s: &str) -> Option<Metric> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" | "claim count" => Some(Metric::Count),
            "claim" | "claim amount" => Some(Metric::Claim),
            "settled" | "settled amount" => Some(Metric::Settled),
            _ => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Count => "Claim Count",
            Metric::Claim => "Claim Amount",
            Metric::Settled => "Settled Amount",
        })
    }
}

/// One month of a trend series. `values` holds only the series with a
/// non-zero contribution that month, in ranking order with `"Other"` last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub values: Vec<(String, f64)>,
}

impl TrendPoint {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn total(&self) -> f64 {
        self.values.iter().map(|(_, v)| v).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendDataset {
    /// Chronological.
    pub points: Vec<TrendPoint>,
    /// Series names that appear in at least one point.
    pub keys: Vec<String>,
}

/// Trend series for every category, keyed by category name.
pub fn consolidate_trends(
    data: &[ClaimRecord],
    metric: Metric,
    categories: &[String],
    top_n: usize,
) -> BTreeMap<String, TrendDataset> {
    categories
        .iter()
        .map(|c| (c.clone(), consolidate_category(data, metric, c, top_n)))
        .collect()
}

pub fn consolidate_category(
    data: &[ClaimRecord],
    metric: Metric,
    category: &str,
    top_n: usize,
) -> TrendDataset {
    // (year, month) -> per-value totals, keyed by first-seen index
    let mut monthly: BTreeMap<(i32, u32), HashMap<usize, f64>> = BTreeMap::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut values: Vec<(String, f64)> = Vec::new();

    for r in data {
        // First-seen order counts every record, dated or not; only dated
        // records contribute to totals.
        let label = r.category(category);
        let i = match index.get(&label) {
            Some(i) => *i,
            None => {
                index.insert(label.clone(), values.len());
                values.push((label, 0.0));
                values.len() - 1
            }
        };
        let Some(date) = r.parsed_claim_intimation_date else {
            continue;
        };
        let v = metric.value(r);
        values[i].1 += v;
        *monthly
            .entry((date.year(), date.month()))
            .or_default()
            .entry(i)
            .or_insert(0.0) += v;
    }

    // Stable sort keeps first-seen order for equal totals.
    let mut ranked: Vec<usize> = (0..values.len()).collect();
    ranked.sort_by(|a, b| {
        values[*b]
            .1
            .partial_cmp(&values[*a].1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(top_n);
    log::debug!(
        "Trend '{}': {} values, top {:?}",
        category,
        values.len(),
        ranked.iter().map(|i| values[*i].0.as_str()).collect::<Vec<_>>()
    );

    let mut points = Vec::with_capacity(monthly.len());
    let mut seen = vec![false; values.len()];
    let mut other_seen = false;
    for ((year, month), per_value) in &monthly {
        let mut row = Vec::new();
        for &i in &ranked {
            match per_value.get(&i) {
                Some(v) if *v != 0.0 => {
                    row.push((values[i].0.clone(), *v));
                    seen[i] = true;
                }
                _ => {}
            }
        }
        // Sum the residual in first-seen order so reruns are bit-identical.
        let mut residual: Vec<(&usize, &f64)> =
            per_value.iter().filter(|(i, _)| !ranked.contains(*i)).collect();
        residual.sort_by_key(|(i, _)| **i);
        let other: f64 = residual.iter().map(|(_, v)| **v).sum();
        if other > 0.0 {
            row.push((OTHER_LABEL.to_string(), other));
            other_seen = true;
        }
        points.push(TrendPoint { month: month_label(*year, *month), values: row });
    }

    let mut keys: Vec<String> = ranked
        .iter()
        .filter(|i| seen[**i])
        .map(|i| values[*i].0.clone())
        .collect();
    if other_seen {
        keys.push(OTHER_LABEL.to_string());
    }
    TrendDataset { points, keys }
}

/// `Jan 2024` style label.
pub fn month_label(year: i32, month: u32) -> String {
    chrono::NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::normalize::normalize_row;
    use crate::types::{RawRow, RawValue};

    fn rec(state: &str, date: &str, claim: &str) -> ClaimRecord {
        let mut row = RawRow::new();
        row.insert("State".into(), RawValue::from(state));
        row.insert("Claim Intimation Date".into(), RawValue::from(date));
        row.insert("Claim Amount".into(), RawValue::from(claim));
        normalize_row(row, &ReportConfig::default())
    }

    #[test]
    fn months_are_chronological_and_labelled() {
        let data = vec![
            rec("KA", "2024-03-02", "1"),
            rec("KA", "2023-12-30", "1"),
            rec("KA", "2024-01-10", "1"),
        ];
        let t = consolidate_category(&data, Metric::Count, "State", 6);
        let months: Vec<&str> = t.points.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["Dec 2023", "Jan 2024", "Mar 2024"]);
    }

    #[test]
    fn undated_records_are_ignored() {
        let data = vec![rec("KA", "", "100"), rec("TN", "2024-01-01", "5")];
        let t = consolidate_category(&data, Metric::Claim, "State", 6);
        assert_eq!(t.points.len(), 1);
        assert_eq!(t.keys, vec!["TN"]);
        assert_eq!(t.points[0].get("TN"), Some(5.0));
    }

    #[test]
    fn tail_values_merge_into_other() {
        let mut data = Vec::new();
        // S0 has 8 records, S1 7, ... S7 1.
        for i in 0..8 {
            for _ in 0..(8 - i) {
                data.push(rec(&format!("S{}", i), "2024-05-05", "0"));
            }
        }
        let t = consolidate_category(&data, Metric::Count, "State", 6);
        assert_eq!(t.keys, vec!["S0", "S1", "S2", "S3", "S4", "S5", "Other"]);
        let p = &t.points[0];
        assert_eq!(p.get("Other"), Some(3.0));
        assert_eq!(p.total(), data.len() as f64);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let data = vec![
            rec("B", "2024-01-01", "1"),
            rec("A", "2024-01-01", "1"),
            rec("C", "2024-01-01", "1"),
        ];
        let t = consolidate_category(&data, Metric::Count, "State", 2);
        assert_eq!(t.keys, vec!["B", "A", "Other"]);
    }

    #[test]
    fn undated_records_still_set_first_seen_order() {
        let data = vec![
            rec("A", "", "1"),
            rec("B", "2024-01-01", "1"),
            rec("A", "2024-01-01", "1"),
        ];
        let t = consolidate_category(&data, Metric::Count, "State", 1);
        assert_eq!(t.keys, vec!["A", "Other"]);
        assert_eq!(t.points[0].get("A"), Some(1.0));
        assert_eq!(t.points[0].get("Other"), Some(1.0));
    }

    #[test]
    fn other_only_in_months_with_a_positive_residual() {
        let data = vec![
            rec("A", "2024-01-05", "100"),
            rec("B", "2024-01-06", "40"),
            rec("A", "2024-02-05", "90"),
            rec("B", "2024-02-06", "0"),
        ];
        let t = consolidate_category(&data, Metric::Claim, "State", 1);
        assert_eq!(t.points.len(), 2);
        assert_eq!(t.points[0].get("Other"), Some(40.0));
        assert_eq!(t.points[1].get("Other"), None);
        assert_eq!(t.points[1].values, vec![("A".to_string(), 90.0)]);
        assert_eq!(t.keys, vec!["A", "Other"]);
    }

    #[test]
    fn negative_residual_drops_other() {
        // Refund-style negative amounts can push the tail below zero.
        let data = vec![
            rec("A", "2024-01-05", "100"),
            rec("B", "2024-01-06", "30"),
            rec("C", "2024-01-07", "-50"),
            rec("A", "2024-02-05", "10"),
            rec("B", "2024-02-06", "25"),
        ];
        let t = consolidate_category(&data, Metric::Claim, "State", 1);
        assert_eq!(t.points[0].month, "Jan 2024");
        assert_eq!(t.points[0].get("Other"), None);
        assert_eq!(t.points[0].values, vec![("A".to_string(), 100.0)]);
        assert_eq!(t.points[1].get("Other"), Some(25.0));
        assert_eq!(t.keys, vec!["A", "Other"]);
    }

    #[test]
    fn zero_contributions_are_omitted() {
        let data = vec![rec("A", "2024-01-01", "10"), rec("B", "2024-01-01", "0")];
        let t = consolidate_category(&data, Metric::Claim, "State", 6);
        assert_eq!(t.points[0].values, vec![("A".to_string(), 10.0)]);
        assert_eq!(t.keys, vec!["A"]);
    }

    #[test]
    fn metric_parsing() {
        assert_eq!(Metric::parse("Count"), Some(Metric::Count));
        assert_eq!(Metric::parse("settled"), Some(Metric::Settled));
        assert_eq!(Metric::parse("claim amount"), Some(Metric::Claim));
        assert_eq!(Metric::parse(&Metric::Count.to_string()), Some(Metric::Count));
        assert_eq!(Metric::parse("median"), None);
    }
}
