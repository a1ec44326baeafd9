//! Built-in sample reports
//!
//! Written on first run and by `reset_to_default`. Timestamps are relative
//! to the moment of seeding so the dashboards always have recent data.

use crate::report::{Report, Severity, Status, format_timestamp};
use chrono::{DateTime, Duration, Utc};

struct SeedReport {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    building: &'static str,
    room: &'static str,
    issue_type: &'static str,
    device: &'static str,
    description: &'static str,
    severity: Severity,
    status: Status,
    created_ago: Duration,
    updated_ago: Duration,
}

fn seed_set() -> [SeedReport; 4] {
    [
        SeedReport {
            id: "RPT-001",
            name: "Ahmad Rizki",
            email: "ahmad.rizki@student.ac.id",
            building: "SAW",
            room: "Cafeteria",
            issue_type: "Slow Internet Speed",
            device: "Laptop",
            description: "Internet speed is very slow, cannot load YouTube videos or download files. Speed test shows only 1 Mbps.",
            severity: Severity::Medium,
            status: Status::Investigating,
            created_ago: Duration::hours(4),
            updated_ago: Duration::hours(3),
        },
        SeedReport {
            id: "RPT-002",
            name: "Sarah Putri",
            email: "sarah.putri@student.ac.id",
            building: "SAW",
            room: "Library",
            issue_type: "No Internet Connection",
            device: "Smartphone",
            description: "Cannot connect to campus WiFi. Shows connected but no internet access.",
            severity: Severity::High,
            status: Status::New,
            created_ago: Duration::hours(5),
            updated_ago: Duration::hours(5),
        },
        SeedReport {
            id: "RPT-003",
            name: "Budi Santoso",
            email: "budi.santoso@student.ac.id",
            building: "D3",
            room: "HI-101",
            issue_type: "Intermittent Connection",
            device: "Laptop",
            description: "Connection keeps dropping every few minutes. Very disruptive during online classes.",
            severity: Severity::High,
            status: Status::Resolved,
            created_ago: Duration::hours(30),
            updated_ago: Duration::hours(24),
        },
        SeedReport {
            id: "RPT-004",
            name: "Maya Sari",
            email: "maya.sari@student.ac.id",
            building: "D4",
            room: "Lab D4-A",
            issue_type: "High Latency/Ping",
            device: "Desktop Computer",
            description: "High ping when accessing online resources. Gaming and video calls are affected.",
            severity: Severity::Medium,
            status: Status::Resolved,
            created_ago: Duration::hours(7),
            updated_ago: Duration::zero(),
        },
    ]
}

/// The default report set as of `now`
pub fn default_reports(now: DateTime<Utc>, timestamp_format: &str) -> Vec<Report> {
    seed_set()
        .into_iter()
        .map(|seed| {
            let created_at = now - seed.created_ago;
            Report {
                id: seed.id.to_string(),
                name: seed.name.to_string(),
                email: Some(seed.email.to_string()),
                building: seed.building.to_string(),
                room: seed.room.to_string(),
                issue_type: seed.issue_type.to_string(),
                device: seed.device.to_string(),
                description: seed.description.to_string(),
                severity: seed.severity,
                status: seed.status,
                timestamp: format_timestamp(created_at, timestamp_format),
                created_at,
                updated_at: now - seed.updated_ago,
            }
        })
        .collect()
}
