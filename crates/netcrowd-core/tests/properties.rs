//! Property tests for the store, statistics and import/export laws

use netcrowd_core::id::parse_id;
use netcrowd_core::stats::{self, resolution_rate};
use netcrowd_core::transfer::{self, ExportDocument};
use netcrowd_core::{NewReport, ReportPatch, ReportStore, Severity, Status, StoreOptions};
use proptest::prelude::*;
use std::collections::HashSet;

const BUILDINGS: [&str; 4] = ["D4", "D3", "TC", "SAW"];

#[derive(Debug, Clone)]
enum Op {
    Create { building: usize, severity: usize },
    SetStatus { pick: usize, status: usize },
    Delete { pick: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..BUILDINGS.len(), 0..Severity::ALL.len())
            .prop_map(|(building, severity)| Op::Create { building, severity }),
        1 => (any::<usize>(), 0..Status::ALL.len())
            .prop_map(|(pick, status)| Op::SetStatus { pick, status }),
        1 => any::<usize>().prop_map(|pick| Op::Delete { pick }),
    ]
}

fn new_report(building: usize, severity: usize) -> NewReport {
    NewReport {
        name: "Prop".into(),
        email: None,
        building: BUILDINGS[building].into(),
        room: format!("{}-101", BUILDINGS[building]),
        issue_type: "WiFi Not Working".into(),
        device: "Laptop".into(),
        description: "generated".into(),
        severity: Severity::ALL[severity],
    }
}

fn pick_id(store: &ReportStore, pick: usize) -> Option<String> {
    let reports = store.snapshot();
    (!reports.is_empty()).then(|| reports[pick % reports.len()].id.clone())
}

fn apply(store: &mut ReportStore, op: &Op) {
    match *op {
        Op::Create { building, severity } => {
            store.create(new_report(building, severity));
        }
        Op::SetStatus { pick, status } => {
            if let Some(id) = pick_id(store, pick) {
                store
                    .update(&id, ReportPatch::status(Status::ALL[status]))
                    .expect("picked id exists");
            }
        }
        Op::Delete { pick } => {
            if let Some(id) = pick_id(store, pick) {
                store.delete(&id).expect("picked id exists");
            }
        }
    }
}

/// Store holding one report per entry of `statuses`
fn store_with_statuses(statuses: &[usize]) -> ReportStore {
    let mut store = ReportStore::in_memory(StoreOptions::unseeded());
    for (i, status) in statuses.iter().enumerate() {
        let report = store.create(new_report(i % BUILDINGS.len(), i % Severity::ALL.len()));
        store
            .update(&report.id, ReportPatch::status(Status::ALL[*status]))
            .expect("just created");
    }
    store
}

proptest! {
    #[test]
    fn ids_stay_unique_and_well_formed(ops in prop::collection::vec(op(), 1..60)) {
        let mut store = ReportStore::in_memory(StoreOptions::unseeded());

        for op in &ops {
            apply(&mut store, op);

            let mut seen = HashSet::new();
            for report in store.snapshot() {
                let (prefix, _) = parse_id(&report.id).expect("RPT-NNN id");
                prop_assert_eq!(prefix, "RPT");
                prop_assert!(seen.insert(report.id.clone()), "duplicate id {}", report.id);
            }
        }
    }

    #[test]
    fn summary_buckets_partition_total(statuses in prop::collection::vec(0..Status::ALL.len(), 0..40)) {
        let store = store_with_statuses(&statuses);
        let summary = stats::summary(store.snapshot());
        let false_reports = store
            .snapshot()
            .iter()
            .filter(|r| r.status == Status::FalseReport)
            .count();

        prop_assert_eq!(summary.active + summary.resolved + false_reports, summary.total);
    }

    #[test]
    fn resolution_rate_matches_rounded_ratio(statuses in prop::collection::vec(0..Status::ALL.len(), 0..120)) {
        let store = store_with_statuses(&statuses);
        let summary = stats::summary(store.snapshot());

        let expected = if summary.total == 0 {
            0
        } else {
            (summary.resolved as f64 / summary.total as f64 * 100.0).round() as u32
        };
        prop_assert_eq!(summary.resolution_rate, expected);
        prop_assert_eq!(resolution_rate(summary.resolved, summary.total), expected);
    }

    #[test]
    fn resolution_rate_is_a_rounded_percentage(total in 1usize..2000, resolved in any::<prop::sample::Index>()) {
        let resolved = resolved.index(total + 1);
        let rate = resolution_rate(resolved, total);

        prop_assert!(rate <= 100);
        prop_assert_eq!(rate, (resolved as f64 / total as f64 * 100.0).round() as u32);
        if resolved == total {
            prop_assert_eq!(rate, 100);
        }
    }

    #[test]
    fn export_then_import_reproduces_snapshot(statuses in prop::collection::vec(0..Status::ALL.len(), 1..25)) {
        let source = store_with_statuses(&statuses);
        let json = transfer::export(&source).to_json_pretty().unwrap();

        let mut target = ReportStore::in_memory(StoreOptions::unseeded());
        let outcome = transfer::import_str(&mut target, &json);

        prop_assert!(outcome.success);
        prop_assert_eq!(outcome.imported_count, statuses.len());
        prop_assert_eq!(target.snapshot(), source.snapshot());
    }

    #[test]
    fn import_adds_only_unknown_ids(
        statuses in prop::collection::vec(0..Status::ALL.len(), 1..25),
        keep in any::<prop::sample::Index>(),
    ) {
        let source = store_with_statuses(&statuses);
        let document: ExportDocument = transfer::export(&source);
        let n = document.reports.len();
        let k = keep.index(n + 1);

        // Target already holds the first k reports, with local edits
        let mut target = ReportStore::in_memory(StoreOptions::unseeded());
        let existing: Vec<_> = document.reports[..k]
            .iter()
            .cloned()
            .map(|mut r| {
                r.description = "local".into();
                r
            })
            .collect();
        target.merge(existing);

        let value = serde_json::to_value(&document).unwrap();
        let first = transfer::import(&mut target, value.clone());
        prop_assert_eq!(first.imported_count, n - k);
        prop_assert_eq!(target.len(), n);
        for report in &target.snapshot()[..k] {
            prop_assert_eq!(report.description.as_str(), "local");
        }

        let before = target.snapshot().to_vec();
        let second = transfer::import(&mut target, value);
        prop_assert!(second.success);
        prop_assert_eq!(second.imported_count, 0);
        prop_assert_eq!(target.snapshot(), before.as_slice());
    }
}
