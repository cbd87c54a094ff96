use crate::config::ReportConfig;
use crate::error::Result;
use crate::types::{ClaimRecord, KpiData, PivotDict, PivotRow, PivotTable, Summary};
use crate::util::{average, format_currency, format_int, format_number};
use num_format::Locale;
use std::collections::HashMap;

pub const ROWS_COLUMN: &str = "Rows";

/// Column header for a numeric field: spaces become underscores
/// (`Claim Amount` -> `Claim_Amount`).
pub fn column_name(field: &str) -> String {
    field.trim().replace(' ', "_")
}

/// Build one pivot table for `dimension`.
///
/// Rows follow the order in which each category value is first seen, and
/// a TOTAL row is appended. The TOTAL values are summed from the group
/// rows, in row order, so they match a re-sum of the body exactly.
pub fn generate_pivot(data: &[ClaimRecord], dimension: &str, cfg: &ReportConfig) -> PivotTable {
    struct Acc {
        label: String,
        rows: f64,
        claim: f64,
        settled: f64,
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Acc> = Vec::new();
    for r in data {
        let label = r.category(dimension);
        let i = match index.get(&label) {
            Some(i) => *i,
            None => {
                index.insert(label.clone(), groups.len());
                groups.push(Acc { label, rows: 0.0, claim: 0.0, settled: 0.0 });
                groups.len() - 1
            }
        };
        let e = &mut groups[i];
        e.rows += 1.0;
        e.claim += r.claim_amount;
        e.settled += r.settled_amount;
    }

    let columns = vec![
        dimension.to_string(),
        ROWS_COLUMN.to_string(),
        column_name(&cfg.claim_amount_field),
        column_name(&cfg.settled_amount_field),
    ];
    let mut rows: Vec<PivotRow> = groups
        .into_iter()
        .map(|g| PivotRow::new(g.label, vec![g.rows, g.claim, g.settled]))
        .collect();

    let mut totals = vec![0.0; columns.len() - 1];
    for row in &rows {
        for (t, v) in totals.iter_mut().zip(&row.values) {
            *t += *v;
        }
    }
    rows.push(PivotRow::total(totals));

    log::debug!("Pivot '{}': {} groups", dimension, rows.len() - 1);
    PivotTable { columns, rows }
}

/// One pivot table per configured dimension. An empty population yields an
/// empty dictionary.
pub fn generate_pivots(data: &[ClaimRecord], cfg: &ReportConfig) -> PivotDict {
    if data.is_empty() {
        return PivotDict::default();
    }
    PivotDict {
        tables: cfg
            .pivot_dimensions
            .iter()
            .map(|dim| generate_pivot(data, dim, cfg))
            .collect(),
    }
}

pub fn compute_kpis(data: &[ClaimRecord], cfg: &ReportConfig) -> Result<KpiData> {
    let locale = cfg.number_locale()?;
    Ok(compute_kpis_with(data, &cfg.currency_symbol, &locale))
}

/// KPI computation with an already-resolved locale.
///
/// The average TAT only counts records that carry a numeric TAT.
pub fn compute_kpis_with(data: &[ClaimRecord], currency: &str, locale: &Locale) -> KpiData {
    let total_rows = data.len();
    let sum_claim: f64 = data.iter().map(|r| r.claim_amount).sum();
    let sum_settled: f64 = data.iter().map(|r| r.settled_amount).sum();
    let tats: Vec<f64> = data.iter().filter_map(|r| r.tat).collect();
    let avg_tat = average(&tats);

    KpiData {
        total_rows: format_int(total_rows, locale),
        sum_claim: format_currency(sum_claim, currency, locale),
        sum_settled: format_currency(sum_settled, currency, locale),
        avg_tat: format_number(avg_tat, 1, locale),
        total_rows_raw: total_rows,
        sum_claim_raw: sum_claim,
        sum_settled_raw: sum_settled,
        avg_tat_raw: avg_tat,
    }
}

/// Pivots and KPIs for one population.
pub fn summarize(data: &[ClaimRecord], cfg: &ReportConfig) -> Result<Summary> {
    let kpis = compute_kpis(data, cfg)?;
    let pivots = generate_pivots(data, cfg);
    Ok(Summary { pivots, kpis })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_row;
    use crate::types::{RawRow, RawValue, NOT_AVAILABLE, TOTAL_LABEL};

    fn rec(cells: &[(&str, &str)]) -> ClaimRecord {
        let row: RawRow = cells
            .iter()
            .map(|(k, v)| (k.to_string(), RawValue::from(*v)))
            .collect();
        normalize_row(row, &ReportConfig::default())
    }

    fn en_config() -> ReportConfig {
        ReportConfig { locale: "en".into(), ..ReportConfig::default() }
    }

    #[test]
    fn rows_follow_first_seen_order() {
        let data = vec![
            rec(&[("Region", "West"), ("Claim Amount", "10")]),
            rec(&[("Region", "East"), ("Claim Amount", "20")]),
            rec(&[("Region", "West"), ("Claim Amount", "5")]),
            rec(&[("Claim Amount", "1")]),
        ];
        let t = generate_pivot(&data, "Region", &ReportConfig::default());
        assert_eq!(t.labels(), vec!["West", "East", NOT_AVAILABLE, TOTAL_LABEL]);
        assert_eq!(t.value("West", "Rows"), Some(2.0));
        assert_eq!(t.value("West", "Claim_Amount"), Some(15.0));
        assert_eq!(t.total_value("Claim_Amount"), Some(36.0));
        assert_eq!(t.total_value("Rows"), Some(4.0));
    }

    #[test]
    fn columns_are_named_from_fields() {
        let t = generate_pivot(&[rec(&[])], "Product", &ReportConfig::default());
        assert_eq!(t.columns, vec!["Product", "Rows", "Claim_Amount", "Settled_Amount"]);
    }

    #[test]
    fn avg_tat_skips_missing_values() {
        let data = vec![
            rec(&[("TAT", "10")]),
            rec(&[("TAT", "")]),
            rec(&[("TAT", "abc")]),
            rec(&[("TAT", "5")]),
        ];
        let k = compute_kpis(&data, &en_config()).unwrap();
        assert_eq!(k.avg_tat_raw, 7.5);
        assert_eq!(k.avg_tat, "7.5");
        assert_eq!(k.total_rows, "4");
    }

    #[test]
    fn empty_population_is_zero_not_error() {
        let s = summarize(&[], &ReportConfig::default()).unwrap();
        assert!(s.pivots.is_empty());
        assert_eq!(s.kpis.total_rows, "0");
        assert_eq!(s.kpis.sum_claim, "₹0");
        assert_eq!(s.kpis.sum_settled, "₹0");
        assert_eq!(s.kpis.avg_tat, "0.0");
        assert_eq!(s.kpis.sum_claim_raw, 0.0);
    }

    #[test]
    fn currency_is_rounded_and_grouped() {
        let data = vec![rec(&[("Claim Amount", "12,345.6"), ("Settled Amount", "99.4")])];
        let k = compute_kpis(&data, &en_config()).unwrap();
        assert_eq!(k.sum_claim, "₹12,346");
        assert_eq!(k.sum_settled, "₹99");
    }

    #[test]
    fn one_table_per_configured_dimension() {
        let cfg = ReportConfig::default();
        let pivots = generate_pivots(&[rec(&[("Region", "North")])], &cfg);
        assert_eq!(pivots.len(), cfg.pivot_dimensions.len());
        assert_eq!(pivots.dimensions()[0], "Region");
        assert!(pivots.get("Construct Type").is_some());
    }
}
