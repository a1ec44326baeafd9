//! Report data model for netcrowd
//!
//! A report is one network issue submitted from somewhere on campus.
//! JSON field names are camelCase to stay compatible with exported data.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Render an instant as the display timestamp, in local time
///
/// Falls back to RFC 3339 when `format` is not a valid strftime string.
pub fn format_timestamp(at: DateTime<Utc>, format: &str) -> String {
    let local = at.with_timezone(&Local);
    let mut out = String::new();
    if write!(out, "{}", local.format(format)).is_err() {
        return local.to_rfc3339();
    }
    out
}

/// Reporter-assessed impact level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Minor inconvenience
    Low,
    /// Affects productivity
    Medium,
    /// Cannot work or study
    High,
    /// Complete outage
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];
}

impl std::str::FromStr for Severity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(crate::Error::InvalidSeverity(s.to_string())),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Administrative triage state
///
/// Any status may follow any other; no transitions are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    New,
    Verified,
    Investigating,
    Resolved,
    FalseReport,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::New,
        Status::Verified,
        Status::Investigating,
        Status::Resolved,
        Status::FalseReport,
    ];

    /// Still needs attention (neither resolved nor dismissed)
    pub fn is_active(&self) -> bool {
        !matches!(self, Status::Resolved | Status::FalseReport)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Status::Resolved)
    }
}

impl std::str::FromStr for Status {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Status::New),
            "verified" => Ok(Status::Verified),
            "investigating" => Ok(Status::Investigating),
            "resolved" => Ok(Status::Resolved),
            "false_report" | "false-report" | "falsereport" => Ok(Status::FalseReport),
            _ => Err(crate::Error::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::New => write!(f, "new"),
            Status::Verified => write!(f, "verified"),
            Status::Investigating => write!(f, "investigating"),
            Status::Resolved => write!(f, "resolved"),
            Status::FalseReport => write!(f, "false_report"),
        }
    }
}

/// A submitted network-issue report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Unique identifier (RPT-NNN), never changes after creation
    pub id: String,

    /// Reporter name
    pub name: String,

    /// Reporter email, written as null when absent
    #[serde(default)]
    pub email: Option<String>,

    pub building: String,

    pub room: String,

    /// Free-form issue category, e.g. "Slow Internet Speed"
    pub issue_type: String,

    /// Device the problem was seen on
    pub device: String,

    pub description: String,

    pub severity: Severity,

    pub status: Status,

    /// Creation time formatted for display in local time
    pub timestamp: String,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Build a fresh report from caller-supplied fields
    pub fn new(id: String, fields: NewReport, now: DateTime<Utc>, timestamp: String) -> Self {
        Self {
            id,
            name: fields.name,
            email: fields.email,
            building: fields.building,
            room: fields.room,
            issue_type: fields.issue_type,
            device: fields.device,
            description: fields.description,
            severity: fields.severity,
            status: Status::New,
            timestamp,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow-merge a patch over this report and stamp `updated_at`
    pub fn apply(&mut self, patch: ReportPatch, now: DateTime<Utc>) {
        let ReportPatch {
            name,
            email,
            building,
            room,
            issue_type,
            device,
            description,
            severity,
            status,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = Some(email);
        }
        if let Some(building) = building {
            self.building = building;
        }
        if let Some(room) = room {
            self.room = room;
        }
        if let Some(issue_type) = issue_type {
            self.issue_type = issue_type;
        }
        if let Some(device) = device {
            self.device = device;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(severity) = severity {
            self.severity = severity;
        }
        if let Some(status) = status {
            self.status = status;
        }

        self.updated_at = now;
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] [{}] {} / {} - {}",
            self.id, self.severity, self.status, self.building, self.room, self.issue_type
        )
    }
}

/// Fields a reporter supplies when filing a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub building: String,
    pub room: String,
    pub issue_type: String,
    pub device: String,
    pub description: String,
    pub severity: Severity,
}

/// Partial update; absent fields are left untouched
///
/// Identity and timestamps are not part of a patch. Unknown JSON keys are
/// ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ReportPatch {
    /// Patch that only changes the status
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Restrictions for listing reports; `None` means no restriction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub building: Option<String>,
    pub status: Option<Status>,
    pub severity: Option<Severity>,
    /// Lowercased text looked for in name, building, room and description
    pub search: Option<String>,
}

impl ReportFilter {
    /// Build a filter from loosely-typed query values
    ///
    /// Empty values and the literal "all" mean no restriction. `search` is
    /// free text; only an empty value leaves it unrestricted.
    pub fn from_query(
        building: Option<&str>,
        status: Option<&str>,
        severity: Option<&str>,
        search: Option<&str>,
    ) -> crate::Result<Self> {
        fn restricted(value: Option<&str>) -> Option<&str> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        }

        Ok(Self {
            building: restricted(building).map(str::to_string),
            status: restricted(status).map(str::parse).transpose()?,
            severity: restricted(severity).map(str::parse).transpose()?,
            search: search
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase),
        })
    }

    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Case-insensitive substring search
    pub fn with_search(mut self, text: &str) -> Self {
        self.search = Some(text.to_lowercase());
        self
    }

    pub fn matches(&self, report: &Report) -> bool {
        self.building.as_ref().is_none_or(|b| *b == report.building)
            && self.status.is_none_or(|s| s == report.status)
            && self.severity.is_none_or(|s| s == report.severity)
            && self.search.as_deref().is_none_or(|text| mentions(report, text))
    }
}

fn mentions(report: &Report, text: &str) -> bool {
    [
        &report.name,
        &report.building,
        &report.room,
        &report.description,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(text))
}
