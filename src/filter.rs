use crate::config::ReportConfig;
use crate::error::Result;
use crate::reports::summarize;
use crate::types::{ClaimRecord, FilterSpec, Summary};
use std::collections::{BTreeMap, BTreeSet};

/// Sorted, de-duplicated values per filter dimension, used to build the
/// option lists. `"N/A"` is listed like any other value.
pub type FilterOptions = BTreeMap<String, Vec<String>>;

pub fn filter_options(data: &[ClaimRecord], cfg: &ReportConfig) -> FilterOptions {
    cfg.filter_dimensions
        .iter()
        .map(|dim| {
            let values: BTreeSet<String> = data.iter().map(|r| r.category(dim)).collect();
            (dim.clone(), values.into_iter().collect())
        })
        .collect()
}

/// Whether a record passes every clause of the filter.
pub fn matches(record: &ClaimRecord, spec: &FilterSpec) -> bool {
    if spec.date_from.is_some() || spec.date_to.is_some() {
        let Some(date) = record.parsed_claim_intimation_date else {
            return false;
        };
        if spec.date_from.is_some_and(|from| date < from) {
            return false;
        }
        if spec.date_to.is_some_and(|to| date > to) {
            return false;
        }
    }
    spec.categorical
        .iter()
        .filter(|(_, allowed)| !allowed.is_empty())
        .all(|(dim, allowed)| allowed.contains(&record.category(dim)))
}

/// Filtered subsequence of `base`, in input order.
pub fn apply_filters(base: &[ClaimRecord], spec: &FilterSpec) -> Vec<ClaimRecord> {
    base.iter().filter(|r| matches(r, spec)).cloned().collect()
}

/// Result of re-running the pipeline for one filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Recomputation {
    pub spec: FilterSpec,
    pub filtered: Vec<ClaimRecord>,
    pub summary: Summary,
}

/// Filter `base` and aggregate the full filtered set from scratch.
pub fn recompute(base: &[ClaimRecord], spec: &FilterSpec, cfg: &ReportConfig) -> Result<Recomputation> {
    let filtered = apply_filters(base, spec);
    log::info!("Filters matched {} of {} records", filtered.len(), base.len());
    let summary = summarize(&filtered, cfg)?;
    Ok(Recomputation { spec: spec.clone(), filtered, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_row;
    use crate::types::{RawRow, RawValue};
    use chrono::NaiveDate;

    fn rec(region: &str, date: &str) -> ClaimRecord {
        let mut row = RawRow::new();
        row.insert("Region".into(), RawValue::from(region));
        row.insert("Claim Intimation Date".into(), RawValue::from(date));
        normalize_row(row, &ReportConfig::default())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unbounded_dates_keep_undated_records() {
        let data = vec![rec("North", "2024-01-01"), rec("South", "")];
        assert_eq!(apply_filters(&data, &FilterSpec::default()).len(), 2);
    }

    #[test]
    fn any_date_bound_drops_undated_records() {
        let data = vec![rec("North", "2024-01-01"), rec("South", "")];
        let spec = FilterSpec::default().with_date_to(day(2030, 1, 1));
        let out = apply_filters(&data, &spec);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category("Region"), "North");
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let data = vec![
            rec("A", "2024-01-01"),
            rec("B", "2024-01-15"),
            rec("C", "2024-01-31"),
            rec("D", "2024-02-01"),
        ];
        let spec = FilterSpec::default()
            .with_date_from(day(2024, 1, 1))
            .with_date_to(day(2024, 1, 31));
        let regions: Vec<String> = apply_filters(&data, &spec).iter().map(|r| r.category("Region")).collect();
        assert_eq!(regions, vec!["A", "B", "C"]);
    }

    #[test]
    fn categorical_sets_and_na() {
        let data = vec![rec("North", ""), rec("", ""), rec("South", "")];
        let spec = FilterSpec::default().with_values("Region", ["North", "N/A"]);
        assert_eq!(apply_filters(&data, &spec).len(), 2);

        let spec = FilterSpec::default().with_values("Region", Vec::<String>::new());
        assert_eq!(apply_filters(&data, &spec).len(), 3);
    }

    #[test]
    fn options_are_sorted_and_unique() {
        let data = vec![rec("South", ""), rec("North", ""), rec("South", ""), rec("", "")];
        let opts = filter_options(&data, &ReportConfig::default());
        assert_eq!(opts["Region"], vec!["N/A", "North", "South"]);
        assert!(opts.contains_key("Filed By"));
    }

    #[test]
    fn recompute_aggregates_filtered_set() {
        let data = vec![rec("North", "2024-01-01"), rec("South", "2024-02-01")];
        let spec = FilterSpec::default().with_values("Region", ["South"]);
        let out = recompute(&data, &spec, &ReportConfig::default()).unwrap();
        assert_eq!(out.filtered.len(), 1);
        assert_eq!(out.summary.kpis.total_rows_raw, 1);
        let region = out.summary.pivots.get("Region").unwrap();
        assert_eq!(region.labels(), vec!["South", "TOTAL"]);
    }
}
