use crate::error::Result;
use crate::trend::TrendDataset;
use crate::types::{KpiData, PivotTable};
use crate::util::format_number;
use num_format::Locale;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

pub fn write_pivot_csv(path: &Path, table: &PivotTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.columns)?;
    for r in &table.rows {
        let mut record = Vec::with_capacity(table.columns.len());
        record.push(r.label.clone());
        record.extend(r.values.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// File-system friendly name for a dimension (`Filed By` -> `filed_by`).
pub fn file_stem(dimension: &str) -> String {
    dimension
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Markdown rendering of a pivot table, numbers grouped per `locale`.
/// Shows at most `max_rows` body rows; the TOTAL row is always shown.
pub fn render_pivot(table: &PivotTable, max_rows: usize, locale: &Locale) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.columns.iter().map(|c| c.replace('_', " ")));
    let body = table.body();
    let shown = body.iter().take(max_rows).chain(table.total_row());
    for r in shown {
        let mut cells = vec![r.label.clone()];
        cells.extend(r.values.iter().map(|v| format_number(*v, 0, locale)));
        builder.push_record(cells);
    }
    let mut out = builder.build().with(Style::markdown()).to_string();
    if body.len() > max_rows {
        out.push_str(&format!("\n... {} more rows", body.len() - max_rows));
    }
    out
}

pub fn preview_pivot(table: &PivotTable, max_rows: usize, locale: &Locale) {
    if table.rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_pivot(table, max_rows, locale));
}

pub fn preview_kpis(kpis: &KpiData) {
    let mut builder = Builder::default();
    builder.push_record(
        ["Total Claims", "Claim Amount", "Settled Amount", "Avg TAT"].map(String::from),
    );
    builder.push_record([
        kpis.total_rows.clone(),
        kpis.sum_claim.clone(),
        kpis.sum_settled.clone(),
        kpis.avg_tat.clone(),
    ]);
    println!("{}\n", builder.build().with(Style::markdown()).to_string());
}

/// Markdown rendering of a trend dataset: one row per month, one column
/// per series.
pub fn render_trend(data: &TrendDataset, locale: &Locale) -> String {
    let mut builder = Builder::default();
    let mut header = vec!["Month".to_string()];
    header.extend(data.keys.iter().cloned());
    builder.push_record(header);
    for p in &data.points {
        let mut cells = vec![p.month.clone()];
        cells.extend(data.keys.iter().map(|k| match p.get(k) {
            Some(v) => format_number(v, 0, locale),
            None => "-".to_string(),
        }));
        builder.push_record(cells);
    }
    builder.build().with(Style::markdown()).to_string()
}
