//! Statistics derived from a report snapshot
//!
//! Everything here is a pure function of the reports passed in and is
//! recomputed on every call. Calendar-day comparisons use local time; the
//! `*_at` variants take the reference instant explicitly.

use crate::config::Locale;
use crate::report::Report;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Palette cycled through for issue-type slices, in first-seen order
pub const ISSUE_TYPE_PALETTE: [&str; 6] = [
    "#3b82f6", "#ef4444", "#f59e0b", "#10b981", "#8b5cf6", "#f97316",
];

/// Per-room aggregate inside a building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    pub room: String,
    pub reports: usize,
    pub resolved: usize,
}

/// Aggregate over all reports sharing a building
///
/// `total_reports` can exceed `active_reports + resolved_reports`: false
/// reports count toward the total only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStats {
    pub building: String,
    pub total_reports: usize,
    pub active_reports: usize,
    pub resolved_reports: usize,
    pub rooms: Vec<RoomStats>,
}

/// Headline counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub active: usize,
    pub resolved: usize,
    pub resolved_today: usize,
    /// Percentage of reports resolved, rounded
    pub resolution_rate: u32,
}

/// One day of the weekly trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Abbreviated weekday name
    pub day: String,
    /// Reports created that day
    pub reports: usize,
    /// Reports resolved that day
    pub resolved: usize,
}

/// Share of one issue type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTypeSlice {
    pub label: String,
    pub count: usize,
    pub color: String,
}

fn local_date(at: &DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Group reports by building, busiest (most active issues) first
///
/// Buildings with equal active counts keep first-seen order; rooms are
/// listed in the order they first appear.
pub fn location_stats(reports: &[Report]) -> Vec<LocationStats> {
    let mut stats: Vec<LocationStats> = Vec::new();

    for report in reports {
        let index = match stats.iter().position(|s| s.building == report.building) {
            Some(index) => index,
            None => {
                stats.push(LocationStats {
                    building: report.building.clone(),
                    total_reports: 0,
                    active_reports: 0,
                    resolved_reports: 0,
                    rooms: Vec::new(),
                });
                stats.len() - 1
            }
        };
        let building = &mut stats[index];
        let resolved = report.status.is_resolved();

        building.total_reports += 1;
        if resolved {
            building.resolved_reports += 1;
        } else if report.status.is_active() {
            building.active_reports += 1;
        }

        match building.rooms.iter_mut().find(|r| r.room == report.room) {
            Some(room) => {
                room.reports += 1;
                room.resolved += usize::from(resolved);
            }
            None => building.rooms.push(RoomStats {
                room: report.room.clone(),
                reports: 1,
                resolved: usize::from(resolved),
            }),
        }
    }

    stats.sort_by(|a, b| b.active_reports.cmp(&a.active_reports));
    stats
}

/// Headline counters as of now
pub fn summary(reports: &[Report]) -> Summary {
    summary_at(reports, Local::now())
}

/// Headline counters relative to `now`'s local calendar day
pub fn summary_at(reports: &[Report], now: DateTime<Local>) -> Summary {
    let today = now.date_naive();
    let total = reports.len();
    let resolved = reports.iter().filter(|r| r.status.is_resolved()).count();
    let active = reports.iter().filter(|r| r.status.is_active()).count();
    let resolved_today = reports
        .iter()
        .filter(|r| r.status.is_resolved() && local_date(&r.updated_at) == today)
        .count();

    Summary {
        total,
        active,
        resolved,
        resolved_today,
        resolution_rate: resolution_rate(resolved, total),
    }
}

/// round(resolved / total * 100), 0 for an empty snapshot
///
/// Computed in floating point, so a ratio such as 23/40 lands just below
/// the half and rounds down to 57, the same figure dashboards show.
pub fn resolution_rate(resolved: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (resolved as f64 / total as f64 * 100.0).round() as u32
}

/// Reports created and resolved per day over the last week
pub fn weekly_trend(reports: &[Report], locale: Locale) -> Vec<TrendPoint> {
    weekly_trend_at(reports, Local::now(), locale)
}

/// Seven entries, oldest first, ending with `now`'s local day
pub fn weekly_trend_at(reports: &[Report], now: DateTime<Local>, locale: Locale) -> Vec<TrendPoint> {
    let today = now.date_naive();
    (0..7i64)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let created = reports
                .iter()
                .filter(|r| local_date(&r.created_at) == date)
                .count();
            let resolved = reports
                .iter()
                .filter(|r| r.status.is_resolved() && local_date(&r.updated_at) == date)
                .count();

            TrendPoint {
                day: locale.weekday_abbrev(date.weekday()).to_string(),
                reports: created,
                resolved,
            }
        })
        .collect()
}

/// Count reports per issue type, in first-seen order
pub fn issue_type_distribution(reports: &[Report]) -> Vec<IssueTypeSlice> {
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for report in reports {
        match counts.iter_mut().find(|(t, _)| *t == report.issue_type) {
            Some((_, count)) => *count += 1,
            None => counts.push((report.issue_type.as_str(), 1)),
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, (issue_type, count))| IssueTypeSlice {
            label: short_issue_label(issue_type),
            count,
            color: ISSUE_TYPE_PALETTE[index % ISSUE_TYPE_PALETTE.len()].to_string(),
        })
        .collect()
}

/// "No Internet Connection" -> "No"; "Slow Internet Speed" -> "Slow Speed"
pub fn short_issue_label(issue_type: &str) -> String {
    issue_type
        .replacen(" Internet", "", 1)
        .replacen(" Connection", "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Severity, Status};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn report(id: &str, building: &str, room: &str, status: Status) -> Report {
        let created = at(2026, 10, 16, 12).to_utc();
        Report {
            id: id.into(),
            name: "A".into(),
            email: None,
            building: building.into(),
            room: room.into(),
            issue_type: "WiFi Not Working".into(),
            device: "Laptop".into(),
            description: "x".into(),
            severity: Severity::Medium,
            status,
            timestamp: String::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_location_stats_buckets() {
        let reports = vec![
            report("RPT-001", "D4", "D4-101", Status::Resolved),
            report("RPT-002", "D4", "D4-102", Status::New),
            report("RPT-003", "TC", "TC-101", Status::FalseReport),
        ];

        let stats = location_stats(&reports);
        assert_eq!(stats.len(), 2);

        let d4 = &stats[0];
        assert_eq!(d4.building, "D4");
        assert_eq!((d4.total_reports, d4.active_reports, d4.resolved_reports), (2, 1, 1));

        let tc = &stats[1];
        assert_eq!(tc.building, "TC");
        assert_eq!((tc.total_reports, tc.active_reports, tc.resolved_reports), (1, 0, 0));
    }

    #[test]
    fn test_location_stats_orders_buildings_and_rooms() {
        let reports = vec![
            report("RPT-001", "SAW", "Library", Status::Resolved),
            report("RPT-002", "D3", "HI-101", Status::New),
            report("RPT-003", "D3", "HI-102", Status::Verified),
            report("RPT-004", "D3", "HI-101", Status::Resolved),
            report("RPT-005", "TC", "TC-101", Status::Investigating),
        ];

        let stats = location_stats(&reports);
        let order: Vec<_> = stats.iter().map(|s| s.building.as_str()).collect();
        // D3 has 2 active; TC 1; SAW 0
        assert_eq!(order, vec!["D3", "TC", "SAW"]);

        let rooms = &stats[0].rooms;
        assert_eq!(
            rooms,
            &vec![
                RoomStats { room: "HI-101".into(), reports: 2, resolved: 1 },
                RoomStats { room: "HI-102".into(), reports: 1, resolved: 0 },
            ]
        );
    }

    #[test]
    fn test_summary_counts() {
        let now = at(2026, 10, 17, 15);
        let mut resolved_today = report("RPT-001", "D4", "D4-101", Status::Resolved);
        resolved_today.updated_at = at(2026, 10, 17, 9).to_utc();
        let resolved_earlier = report("RPT-002", "D4", "D4-101", Status::Resolved);
        let reports = vec![
            resolved_today,
            resolved_earlier,
            report("RPT-003", "TC", "TC-101", Status::FalseReport),
            report("RPT-004", "TC", "TC-101", Status::New),
        ];

        let summary = summary_at(&reports, now);
        assert_eq!(
            summary,
            Summary {
                total: 4,
                active: 1,
                resolved: 2,
                resolved_today: 1,
                resolution_rate: 50,
            }
        );
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(summary(&[]), Summary::default());
    }

    #[test]
    fn test_resolution_rate_rounding() {
        assert_eq!(resolution_rate(1, 3), 33);
        assert_eq!(resolution_rate(2, 3), 67);
        assert_eq!(resolution_rate(1, 8), 13); // 12.5 rounds up
        assert_eq!(resolution_rate(3, 3), 100);
        assert_eq!(resolution_rate(23, 40), 57);
        assert_eq!(resolution_rate(0, 0), 0);
    }

    #[test]
    fn test_weekly_trend_window() {
        let now = at(2026, 10, 17, 15); // a Saturday
        let mut created_today = report("RPT-001", "D4", "D4-101", Status::New);
        created_today.created_at = at(2026, 10, 17, 8).to_utc();
        let mut resolved_today = report("RPT-002", "D4", "D4-101", Status::Resolved);
        resolved_today.created_at = at(2026, 10, 11, 8).to_utc();
        resolved_today.updated_at = at(2026, 10, 17, 10).to_utc();
        let mut too_old = report("RPT-003", "D4", "D4-101", Status::New);
        too_old.created_at = at(2026, 10, 10, 8).to_utc();

        let trend = weekly_trend_at(&[created_today, resolved_today, too_old], now, Locale::En);

        assert_eq!(trend.len(), 7);
        let days: Vec<_> = trend.iter().map(|p| p.day.as_str()).collect();
        assert_eq!(days, vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);

        assert_eq!(trend[0], TrendPoint { day: "Sun".into(), reports: 1, resolved: 0 });
        assert_eq!(trend[6], TrendPoint { day: "Sat".into(), reports: 1, resolved: 1 });
        let total: usize = trend.iter().map(|p| p.reports).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_weekly_trend_locale() {
        let trend = weekly_trend_at(&[], at(2026, 10, 17, 15), Locale::Id);
        assert_eq!(trend[6].day, "Sab");
    }

    #[test]
    fn test_issue_type_distribution() {
        let kinds = [
            "Slow Internet Speed",
            "No Internet Connection",
            "Slow Internet Speed",
            "Intermittent Connection",
            "WiFi Not Working",
            "High Latency/Ping",
            "Other",
        ];
        let reports: Vec<Report> = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let mut r = report(&format!("RPT-{:03}", i + 1), "D4", "D4-101", Status::New);
                r.issue_type = kind.to_string();
                r
            })
            .collect();

        let slices = issue_type_distribution(&reports);
        let labels: Vec<_> = slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Slow Speed", "No", "Intermittent", "WiFi Not Working", "High Latency/Ping", "Other"]
        );
        assert_eq!(slices[0].count, 2);
        assert_eq!(slices[0].color, "#3b82f6");
        assert_eq!(slices[5].color, "#f97316");
    }

    #[test]
    fn test_palette_cycles() {
        let reports: Vec<Report> = (0..7)
            .map(|i| {
                let mut r = report(&format!("RPT-{:03}", i + 1), "D4", "D4-101", Status::New);
                r.issue_type = format!("Type {}", i);
                r
            })
            .collect();

        let slices = issue_type_distribution(&reports);
        assert_eq!(slices[6].color, ISSUE_TYPE_PALETTE[0]);
    }
}
