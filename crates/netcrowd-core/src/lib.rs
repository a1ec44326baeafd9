//! netcrowd-core: Core library for the netcrowd campus network-issue tracker
//!
//! Holds the canonical list of reports, derives statistics from it, keeps
//! observers in sync when it changes, and moves data between machines via
//! a portable export document. Persistence is a single JSONL file.

pub mod campus;
pub mod config;
pub mod error;
pub mod id;
pub mod notify;
pub mod report;
pub mod seed;
pub mod stats;
pub mod store;
pub mod transfer;

pub use config::Config;
pub use error::Error;
pub use id::next_report_id;
pub use notify::{Change, ChangeBus, Subscription};
pub use report::{NewReport, Report, ReportFilter, ReportPatch, Severity, Status};
pub use stats::{IssueTypeSlice, LocationStats, RoomStats, Summary, TrendPoint};
pub use store::{ReportStore, StoreOptions};
pub use transfer::{ExportDocument, ImportOutcome};

/// Result type for netcrowd operations
pub type Result<T> = std::result::Result<T, Error>;
