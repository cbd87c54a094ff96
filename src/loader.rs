use crate::error::Result;
use crate::types::{RawRow, RawValue};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
}

/// Decode a CSV file into raw rows. Every cell is kept as text; empty
/// cells become `RawValue::Blank`.
pub fn read_rows(path: &Path) -> Result<(Vec<RawRow>, LoadReport)> {
    let file = std::fs::File::open(path)?;
    read_rows_from(file)
}

pub fn read_rows_from<R: Read>(reader: R) -> Result<(Vec<RawRow>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut report = LoadReport::default();
    let mut rows = Vec::new();
    for result in rdr.records() {
        report.total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("Skipping unreadable CSV record: {}", e);
                report.parse_errors += 1;
                continue;
            }
        };
        // Short records leave trailing columns blank; extra cells are dropped.
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), RawValue::from(record.get(i).unwrap_or(""))))
            .collect();
        rows.push(row);
    }
    log::info!(
        "Read {} CSV rows ({} unreadable)",
        report.total_rows,
        report.parse_errors
    );
    Ok((rows, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_blank_and_short_rows() {
        let csv = "Region,Claim Amount,State\nNorth,\"1,000\",KA\nSouth,\n";
        let (rows, report) = read_rows_from(csv.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Claim Amount"], RawValue::Text("1,000".into()));
        assert_eq!(rows[1]["Claim Amount"], RawValue::Blank);
        assert_eq!(rows[1]["State"], RawValue::Blank);
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let (rows, _) = read_rows_from("Region,State\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }
}
