use crate::config::ReportConfig;
use crate::types::{Bucket, ClaimRecord, ProcessedData};

/// Bucket a record belongs to. A record is `Registered` when its
/// registration field is non-blank; everything else falls to the default.
pub fn bucket_for(record: &ClaimRecord, cfg: &ReportConfig) -> Bucket {
    match record.raw(&cfg.registration_field) {
        Some(v) if !v.is_blank() => Bucket::Registered,
        _ => Bucket::Unregistered,
    }
}

/// Partition records into buckets in one ordered pass.
pub fn classify(records: Vec<ClaimRecord>, cfg: &ReportConfig) -> ProcessedData {
    let mut data = ProcessedData::default();
    for b in Bucket::ALL {
        data.buckets.insert(b, Vec::new());
    }
    for r in records {
        let b = bucket_for(&r, cfg);
        data.buckets.entry(b).or_default().push(r);
    }
    log::info!(
        "Classified {} records ({} registered, {} unregistered)",
        data.total_records(),
        data.bucket(Bucket::Registered).len(),
        data.bucket(Bucket::Unregistered).len()
    );
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_row;
    use crate::types::{RawRow, RawValue};

    fn rec(id: &str, registered: &str) -> ClaimRecord {
        let mut row = RawRow::new();
        row.insert("Claim No".into(), RawValue::from(id));
        row.insert("Registered to Insurer".into(), RawValue::from(registered));
        normalize_row(row, &ReportConfig::default())
    }

    #[test]
    fn partition_keeps_order() {
        let cfg = ReportConfig::default();
        let input = vec![rec("1", "Yes"), rec("2", ""), rec("3", "No"), rec("4", " ")];
        let data = classify(input, &cfg);

        let reg: Vec<String> = data.registered().iter().map(|r| r.category("Claim No")).collect();
        let unreg: Vec<String> = data
            .bucket(Bucket::Unregistered)
            .iter()
            .map(|r| r.category("Claim No"))
            .collect();
        assert_eq!(reg, vec!["1", "3"]);
        assert_eq!(unreg, vec!["2", "4"]);
        assert_eq!(data.total_records(), 4);
    }

    #[test]
    fn empty_input_still_has_every_bucket() {
        let data = classify(Vec::new(), &ReportConfig::default());
        assert_eq!(data.buckets.len(), Bucket::ALL.len());
        assert!(data.registered().is_empty());
    }
}
