//! Import/export of the full report collection
//!
//! The export document carries every report plus an export timestamp and a
//! format version. Importing merges by ID: reports whose ID already exists
//! are skipped, never overwritten, so importing the same document twice
//! changes nothing the second time.

use crate::report::Report;
use crate::store::ReportStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version tag written into export documents
pub const FORMAT_VERSION: &str = "2.0";

/// Portable snapshot of the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub reports: Vec<Report>,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

impl ExportDocument {
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Suggested file name, e.g. netcrowd-data-2026-10-17.json
    pub fn file_name(&self) -> String {
        format!("netcrowd-data-{}.json", self.exported_at.format("%Y-%m-%d"))
    }
}

/// Result of an import attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
    pub imported_count: usize,
}

impl ImportOutcome {
    fn imported(count: usize) -> Self {
        Self {
            success: true,
            message: format!("Successfully imported {} new reports", count),
            imported_count: count,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            imported_count: 0,
        }
    }
}

/// Snapshot the whole store, regardless of any filter
pub fn export(store: &ReportStore) -> ExportDocument {
    ExportDocument {
        reports: store.snapshot().to_vec(),
        exported_at: Utc::now(),
        version: FORMAT_VERSION.to_string(),
    }
}

/// Import from JSON text
pub fn import_str(store: &mut ReportStore, json: &str) -> ImportOutcome {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => import(store, value),
        Err(e) => {
            tracing::warn!(error = %e, "Import rejected: not JSON");
            ImportOutcome::failed(format!("Failed to parse data: {}", e))
        }
    }
}

/// Merge an export document into the store
///
/// Fails without touching the store unless `reports` is an array whose
/// every entry is a report.
pub fn import(store: &mut ReportStore, document: Value) -> ImportOutcome {
    let reports = match parse_reports(document) {
        Ok(reports) => reports,
        Err(e) => {
            tracing::warn!(error = %e, "Import rejected");
            return ImportOutcome::failed(e.to_string());
        }
    };

    let offered = reports.len();
    let added = store.merge(reports);
    tracing::info!(offered, added, skipped = offered - added, "Imported reports");
    ImportOutcome::imported(added)
}

fn parse_reports(document: Value) -> crate::Result<Vec<Report>> {
    let Value::Object(mut fields) = document else {
        return Err(crate::Error::MalformedImport("expected a JSON object".into()));
    };
    let Some(Value::Array(entries)) = fields.remove("reports") else {
        return Err(crate::Error::MalformedImport(
            "`reports` must be an array".into(),
        ));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).map_err(|e| {
                crate::Error::MalformedImport(format!("report #{}: {}", index + 1, e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{NewReport, Severity, Status};
    use crate::store::StoreOptions;
    use crate::notify::Change;
    use std::sync::{Arc, Mutex};

    fn filled_store() -> ReportStore {
        let mut store = ReportStore::in_memory(StoreOptions::unseeded());
        for (name, building) in [("A", "D4"), ("B", "TC"), ("C", "SAW")] {
            store.create(NewReport {
                name: name.into(),
                email: Some(format!("{}@campus.ac.id", name.to_lowercase())),
                building: building.into(),
                room: "Library".into(),
                issue_type: "Slow Internet Speed".into(),
                device: "Laptop".into(),
                description: "slow".into(),
                severity: Severity::Medium,
            });
        }
        store
    }

    #[test]
    fn test_export_shape() {
        let store = filled_store();
        let doc = export(&store);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["version"], "2.0");
        assert!(value["exportedAt"].is_string());
        assert_eq!(value["reports"].as_array().unwrap().len(), 3);
        assert_eq!(value["reports"][0]["id"], "RPT-001");
        assert!(doc.file_name().starts_with("netcrowd-data-"));
    }

    #[test]
    fn test_export_keeps_missing_email() {
        let store = filled_store();
        let mut anonymous = ReportStore::in_memory(StoreOptions::unseeded());
        anonymous.create(NewReport {
            name: "Anon".into(),
            email: None,
            building: "D3".into(),
            room: "HI-101".into(),
            issue_type: "Wi-Fi Keeps Disconnecting".into(),
            device: "Tablet".into(),
            description: "drops".into(),
            severity: Severity::Low,
        });

        let value = serde_json::to_value(export(&anonymous)).unwrap();
        let record = value["reports"][0].as_object().unwrap();
        assert!(record.contains_key("email"));
        assert!(record["email"].is_null());

        let value = serde_json::to_value(export(&store)).unwrap();
        assert_eq!(value["reports"][1]["email"], "b@campus.ac.id");
    }

    #[test]
    fn test_round_trip_into_empty_store() {
        let mut source = filled_store();
        source
            .update("RPT-002", crate::ReportPatch::status(Status::Resolved))
            .unwrap();
        let json = export(&source).to_json_pretty().unwrap();

        let mut target = ReportStore::in_memory(StoreOptions::unseeded());
        let outcome = import_str(&mut target, &json);

        assert!(outcome.success);
        assert_eq!(outcome.imported_count, 3);
        assert_eq!(target.snapshot(), source.snapshot());
    }

    #[test]
    fn test_second_import_changes_nothing() {
        let json = export(&filled_store()).to_json_pretty().unwrap();
        let mut target = ReportStore::in_memory(StoreOptions::unseeded());

        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        let _sub = target.subscribe(move |c| {
            sink.lock().unwrap().push(c.clone());
            Ok(())
        });

        assert_eq!(import_str(&mut target, &json).imported_count, 3);
        let before = target.snapshot().to_vec();

        let again = import_str(&mut target, &json);
        assert!(again.success);
        assert_eq!(again.imported_count, 0);
        assert_eq!(target.snapshot(), before.as_slice());
        assert_eq!(*changes.lock().unwrap(), vec![Change::Imported { count: 3 }]);
    }

    #[test]
    fn test_partial_overlap() {
        let source = filled_store();
        let mut target = ReportStore::in_memory(StoreOptions::unseeded());
        let mut existing = source.snapshot()[0].clone();
        existing.description = "keep me".into();
        target.merge(vec![existing]);

        let outcome = import(&mut target, serde_json::to_value(export(&source)).unwrap());

        assert_eq!(outcome.imported_count, 2);
        assert_eq!(target.len(), 3);
        assert_eq!(target.get("RPT-001").unwrap().description, "keep me");
    }

    #[test]
    fn test_malformed_documents() {
        let mut store = filled_store();
        let cases = [
            "not json",
            "[1, 2, 3]",
            r#"{"version": "2.0"}"#,
            r#"{"reports": {"id": "RPT-001"}}"#,
            r#"{"reports": [{"id": "RPT-100"}]}"#,
        ];

        for case in cases {
            let outcome = import_str(&mut store, case);
            assert!(!outcome.success, "accepted {}", case);
            assert_eq!(outcome.imported_count, 0);
        }
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_timestamps_are_parsed() {
        let json = r#"{
            "reports": [{
                "id": "RPT-050",
                "name": "Dewi",
                "building": "TC",
                "room": "TC-101",
                "issueType": "WiFi Not Working",
                "device": "Tablet",
                "description": "no signal",
                "severity": "critical",
                "status": "verified",
                "timestamp": "01/10/2026, 08.00",
                "createdAt": "2026-10-01T01:00:00.000Z",
                "updatedAt": "2026-10-02T01:00:00+07:00"
            }],
            "exportedAt": "2026-10-03T00:00:00.000Z",
            "version": "2.0"
        }"#;

        let mut store = ReportStore::in_memory(StoreOptions::unseeded());
        assert!(import_str(&mut store, json).success);

        let report = store.get("RPT-050").unwrap();
        assert_eq!(report.created_at.to_rfc3339(), "2026-10-01T01:00:00+00:00");
        assert_eq!(report.updated_at.to_rfc3339(), "2026-10-01T18:00:00+00:00");
        assert_eq!(report.email, None);
    }
}
