//! CSV loader for alert reports
//!
//! Columns: location, description, severity. A header row is optional.

use mbg_types::{AlertRecord, Severity};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct AlertRow {
    location: String,
    description: String,
    severity: String,
}

impl AlertRow {
    fn into_alert(self) -> Option<AlertRecord> {
        if self.location.is_empty() {
            return None;
        }
        let severity = Severity::parse(&self.severity)?;
        Some(AlertRecord::new(self.location, self.description, severity))
    }
}

/// Load alerts from a CSV file
///
/// Rows with too few columns or an unknown severity are skipped with a
/// warning.
pub fn load_alerts_from_csv(path: &std::path::Path) -> Result<Vec<AlertRecord>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read CSV file: {}", e))?;
    parse_alerts(&content)
}

fn is_header(record: &csv::StringRecord) -> bool {
    record.iter().any(|h| {
        let h = h.to_lowercase();
        h.contains("location") || h.contains("severity") || h.contains("lokasi")
    })
}

fn parse_alerts(content: &str) -> Result<Vec<AlertRecord>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut alerts = Vec::new();
    let mut seen_any = false;

    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("Failed to parse CSV: {}", e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(index as u64 + 1);
        if !seen_any {
            seen_any = true;
            if is_header(&record) {
                continue;
            }
        }

        let alert = record
            .deserialize::<AlertRow>(None)
            .ok()
            .and_then(AlertRow::into_alert);
        match alert {
            Some(alert) => alerts.push(alert),
            None => warn!(line, "skipping malformed alert row"),
        }
    }

    if !seen_any {
        return Err("CSV file is empty".to_string());
    }
    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row() {
        let csv = "SPPG Kediri #11, Suhu pendingin di atas 10°C., danger\n";
        let alerts = parse_alerts(csv).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].location, "SPPG Kediri #11");
        assert_eq!(alerts[0].description, "Suhu pendingin di atas 10°C.");
        assert_eq!(alerts[0].severity, Severity::Danger);
    }

    #[test]
    fn test_header_is_skipped() {
        let csv = "location,description,severity\nSPPG Surabaya #04,Sayur terlambat,warning\n\n";
        let alerts = parse_alerts(csv).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_quoted_description_with_comma() {
        let csv = "location,description,severity\n\
                   \"SPPG Kediri #11\",\"Genset mati, stok es habis\",danger\n";
        let alerts = parse_alerts(csv).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].location, "SPPG Kediri #11");
        assert_eq!(alerts[0].description, "Genset mati, stok es habis");
        assert_eq!(alerts[0].severity, Severity::Danger);
    }

    #[test]
    fn test_headerless_and_bad_rows() {
        let csv = "A,desc,danger\nB,desc,unknown\nC,desc\nD,desc,warn";
        let alerts = parse_alerts(csv).unwrap();
        let locations: Vec<_> = alerts.iter().map(|a| a.location.as_str()).collect();
        assert_eq!(locations, ["A", "D"]);
    }

    #[test]
    fn test_empty_file_is_error() {
        assert!(parse_alerts("").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.csv");
        let csv = "lokasi,deskripsi,tingkat\nSPPG Malang #02,Nasi basi,critical\n";
        std::fs::write(&path, csv).unwrap();

        let alerts = load_alerts_from_csv(&path).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Danger);
    }
}
