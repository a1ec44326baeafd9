//! Report store for netcrowd
//!
//! Owns the authoritative report collection. Every mutation is written
//! through to `reports.jsonl` (one report per line, insertion order) and
//! then announced on the change bus.

use crate::notify::{Change, ChangeBus, Subscription};
use crate::report::{NewReport, Report, ReportFilter, ReportPatch, format_timestamp};
use crate::{Config, Error, Result, id, seed};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const DATA_FILE: &str = "reports.jsonl";
const TMP_SUFFIX: &str = "tmp";

type Fingerprint = [u8; 32];

/// Store behaviour settings, usually derived from [`Config`]
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub prefix: String,
    pub timestamp_format: String,
    pub seed_on_first_run: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            prefix: config.prefix.clone(),
            timestamp_format: config.display.timestamp_format.clone(),
            seed_on_first_run: config.seed_on_first_run,
        }
    }
}

impl StoreOptions {
    /// Defaults, but start from an empty collection
    pub fn unseeded() -> Self {
        Self {
            seed_on_first_run: false,
            ..Self::default()
        }
    }
}

enum Backend {
    File { path: PathBuf },
    Memory,
}

/// The canonical report collection
pub struct ReportStore {
    backend: Backend,
    options: StoreOptions,
    reports: Vec<Report>,
    bus: ChangeBus,
    /// Seed data has been written or a snapshot was loaded
    initialized: bool,
    /// Last write to the backend failed
    degraded: bool,
    /// Data file could not be read; never written over until it can be
    quarantined: bool,
    /// Hash of the file content this store last wrote or read
    fingerprint: Option<Fingerprint>,
}

impl ReportStore {
    /// Open the store kept in `dir`, creating the directory if needed
    ///
    /// Loads `reports.jsonl` when present. Otherwise, if seeding is enabled,
    /// writes the built-in sample reports once.
    ///
    /// A data file that cannot be read or parsed is left untouched: the
    /// store starts empty in memory-only mode and `is_durable()` is false.
    pub fn open(dir: &Path, options: StoreOptions) -> Result<Self> {
        if let Err(e) = fs::create_dir_all(dir) {
            tracing::error!(dir = %dir.display(), error = %e, "Failed to create data directory");
        }
        let path = dir.join(DATA_FILE);

        let mut store = Self {
            backend: Backend::File { path },
            options,
            reports: Vec::new(),
            bus: ChangeBus::new(),
            initialized: false,
            degraded: false,
            quarantined: false,
            fingerprint: None,
        };
        if let Err(e) = store.load() {
            tracing::error!(
                path = %dir.join(DATA_FILE).display(),
                error = %e,
                "Failed to load reports, continuing in memory only"
            );
            store.reports.clear();
            store.initialized = true;
            store.degraded = true;
            store.quarantined = true;
        }
        store.seed_if_uninitialized();
        Ok(store)
    }

    /// Open the store at the configured data directory
    pub fn open_with_config(config: &Config) -> Result<Self> {
        let dir = config.resolve_data_dir()?;
        Self::open(&dir, StoreOptions::from(config))
    }

    /// A store that never touches the disk
    pub fn in_memory(options: StoreOptions) -> Self {
        let mut store = Self {
            backend: Backend::Memory,
            options,
            reports: Vec::new(),
            bus: ChangeBus::new(),
            initialized: false,
            degraded: false,
            quarantined: false,
            fingerprint: None,
        };
        store.seed_if_uninitialized();
        store
    }

    /// Path to reports.jsonl, if file-backed
    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File { path } => Some(path),
            Backend::Memory => None,
        }
    }

    /// Whether the last write reached the disk
    pub fn is_durable(&self) -> bool {
        matches!(self.backend, Backend::File { .. }) && !self.degraded
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The change bus observers register on
    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// Register an observer for changes to this store
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Change) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.bus.subscribe(callback)
    }

    /// All reports in insertion order
    pub fn snapshot(&self) -> &[Report] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports matching `filter`, newest first
    pub fn list(&self, filter: &ReportFilter) -> Vec<Report> {
        let mut reports: Vec<Report> = self
            .reports
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports
    }

    /// Get a report by ID
    pub fn get(&self, id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// File a new report
    pub fn create(&mut self, fields: NewReport) -> Report {
        let now = Utc::now();
        let id = id::next_report_id(
            &self.options.prefix,
            self.reports.iter().map(|r| r.id.as_str()),
        );
        let timestamp = format_timestamp(now, &self.options.timestamp_format);
        let report = Report::new(id, fields, now, timestamp);

        self.reports.push(report.clone());
        tracing::debug!(id = %report.id, total = self.reports.len(), "Created report");
        self.commit(Change::Created {
            id: report.id.clone(),
        });

        report
    }

    /// Merge `patch` into an existing report
    pub fn update(&mut self, id: &str, patch: ReportPatch) -> Result<Report> {
        let report = self
            .reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        report.apply(patch, Utc::now());
        let updated = report.clone();

        tracing::debug!(id = %updated.id, status = %updated.status, "Updated report");
        self.commit(Change::Updated {
            id: updated.id.clone(),
        });

        Ok(updated)
    }

    /// Remove a report, returning it
    pub fn delete(&mut self, id: &str) -> Result<Report> {
        let index = self
            .reports
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let removed = self.reports.remove(index);
        tracing::debug!(id = %removed.id, remaining = self.reports.len(), "Deleted report");
        self.commit(Change::Deleted {
            id: removed.id.clone(),
        });

        Ok(removed)
    }

    /// Discard everything and reload the built-in sample reports
    pub fn reset_to_default(&mut self) {
        self.reports = seed::default_reports(Utc::now(), &self.options.timestamp_format);
        self.initialized = true;
        tracing::info!(total = self.reports.len(), "Reset reports to defaults");
        self.commit(Change::Reset);
    }

    /// Remove every report
    pub fn clear_all(&mut self) {
        self.reports.clear();
        tracing::info!("Cleared all reports");
        self.commit(Change::Cleared);
    }

    /// Append reports whose IDs are not already present
    ///
    /// Duplicates (against the store or earlier in `incoming`) are skipped,
    /// never overwritten. Returns how many reports were added; nothing is
    /// written or announced when that is zero.
    pub fn merge(&mut self, incoming: Vec<Report>) -> usize {
        let mut known: HashSet<String> = self.reports.iter().map(|r| r.id.clone()).collect();
        let before = self.reports.len();

        for report in incoming {
            if known.insert(report.id.clone()) {
                self.reports.push(report);
            }
        }

        let added = self.reports.len() - before;
        if added > 0 {
            tracing::info!(added, total = self.reports.len(), "Merged imported reports");
            self.commit(Change::Imported { count: added });
        }
        added
    }

    /// Pick up writes made to the data file by another process
    ///
    /// Replaces the in-memory snapshot wholesale when the file content
    /// differs from what this store last wrote or read. Returns whether the
    /// snapshot changed. Last writer wins; nothing is merged.
    pub fn sync_external(&mut self) -> Result<bool> {
        let Backend::File { path } = &self.backend else {
            return Ok(false);
        };

        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let fingerprint = fingerprint(&content);
        if self.fingerprint == Some(fingerprint) {
            return Ok(false);
        }
        self.fingerprint = Some(fingerprint);

        match parse_jsonl(&content) {
            Ok(reports) => {
                self.reports = reports;
                self.initialized = true;
                if self.quarantined {
                    tracing::info!(path = %path.display(), "Data file readable again");
                    self.quarantined = false;
                    self.degraded = false;
                }
                tracing::info!(total = self.reports.len(), "Synced reports from data file");
                self.bus.publish(&Change::Synced);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable data file");
                Ok(false)
            }
        }
    }

    fn seed_if_uninitialized(&mut self) {
        if self.initialized || !self.reports.is_empty() {
            return;
        }
        self.initialized = true;

        if self.options.seed_on_first_run {
            self.reports = seed::default_reports(Utc::now(), &self.options.timestamp_format);
            tracing::info!(total = self.reports.len(), "Initialized with default reports");
            self.persist();
        }
    }

    /// Load reports.jsonl if it exists
    fn load(&mut self) -> Result<()> {
        let Backend::File { path } = &self.backend else {
            return Ok(());
        };

        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        self.reports = parse_jsonl(&content)?;
        self.fingerprint = Some(fingerprint(&content));
        self.initialized = true;
        tracing::debug!(path = %path.display(), total = self.reports.len(), "Loaded reports");
        Ok(())
    }

    /// Persist, then notify observers
    fn commit(&mut self, change: Change) {
        self.persist();
        self.bus.publish(&change);
    }

    /// Write the whole collection; failures degrade to memory-only
    fn persist(&mut self) {
        let Backend::File { path } = &self.backend else {
            return;
        };
        if self.quarantined {
            tracing::debug!(path = %path.display(), "Data file unreadable, change kept in memory");
            return;
        }

        match write_jsonl(path, &self.reports) {
            Ok(fingerprint) => {
                self.fingerprint = Some(fingerprint);
                if self.degraded {
                    tracing::info!(path = %path.display(), "Data file writable again");
                }
                self.degraded = false;
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to save reports, keeping changes in memory only"
                );
                self.degraded = true;
            }
        }
    }
}

impl std::fmt::Debug for ReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportStore")
            .field("path", &self.path())
            .field("reports", &self.reports.len())
            .field("durable", &self.is_durable())
            .finish()
    }
}

fn fingerprint(content: &[u8]) -> Fingerprint {
    Sha256::digest(content).into()
}

fn parse_jsonl(content: &[u8]) -> Result<Vec<Report>> {
    let text = std::str::from_utf8(content)
        .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(Error::from))
        .collect()
}

/// Write via a temporary sibling and rename, returning the content hash
fn write_jsonl(path: &Path, reports: &[Report]) -> Result<Fingerprint> {
    let mut buf = Vec::new();
    for report in reports {
        serde_json::to_writer(&mut buf, report)?;
        buf.write_all(b"\n")?;
    }

    let tmp = path.with_extension(format!("jsonl.{}", TMP_SUFFIX));
    fs::write(&tmp, &buf)?;
    fs::rename(&tmp, path)?;

    Ok(fingerprint(&buf))
}
