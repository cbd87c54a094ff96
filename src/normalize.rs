// Raw row -> ClaimRecord.
//
// Normalization is total: every row yields one record, and cells that do
// not parse degrade to 0 / None instead of failing the batch.
use crate::config::ReportConfig;
use crate::types::{ClaimRecord, RawRow, RawValue};
use crate::util::{coerce_number, raw_date, raw_number};

pub const AGING_BUCKET_FIELD: &str = "Aging Days Bucketing";
pub const TAT_GROUP_FIELD: &str = "TAT Group";

pub fn normalize_row(row: RawRow, cfg: &ReportConfig) -> ClaimRecord {
    let parsed_claim_intimation_date = raw_date(row.get(&cfg.date_field), &cfg.date_layouts);
    let claim_amount = coerce_number(row.get(&cfg.claim_amount_field));
    let settled_amount = coerce_number(row.get(&cfg.settled_amount_field));
    let tat = raw_number(row.get(&cfg.tat_field));

    let mut fields = row;
    if let Some(days) = raw_number(fields.get(&cfg.aging_days_field)) {
        fill_if_blank(&mut fields, AGING_BUCKET_FIELD, aging_bucket(days));
    }
    if let Some(tat) = tat {
        fill_if_blank(&mut fields, TAT_GROUP_FIELD, tat_group(tat));
    }

    ClaimRecord {
        fields,
        parsed_claim_intimation_date,
        claim_amount,
        settled_amount,
        tat,
    }
}

pub fn normalize_rows(rows: Vec<RawRow>, cfg: &ReportConfig) -> Vec<ClaimRecord> {
    rows.into_iter().map(|r| normalize_row(r, cfg)).collect()
}

fn fill_if_blank(fields: &mut RawRow, key: &str, value: &str) {
    let blank = fields.get(key).map_or(true, RawValue::is_blank);
    if blank {
        fields.insert(key.to_string(), RawValue::Text(value.to_string()));
    }
}

pub fn aging_bucket(days: f64) -> &'static str {
    match days {
        d if d <= 30.0 => "0-30",
        d if d <= 60.0 => "31-60",
        d if d <= 90.0 => "61-90",
        d if d <= 180.0 => "91-180",
        _ => ">180",
    }
}

pub fn tat_group(tat: f64) -> &'static str {
    match tat {
        t if t <= 7.0 => "0-7 Days",
        t if t <= 15.0 => "8-15 Days",
        t if t <= 30.0 => "16-30 Days",
        _ => ">30 Days",
    }
}
