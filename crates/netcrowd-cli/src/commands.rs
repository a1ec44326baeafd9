//! CLI command implementations

use anyhow::{Result, bail};
use colored::{ColoredString, Colorize};
use netcrowd_core::{
    Config, NewReport, Report, ReportFilter, ReportPatch, ReportStore, Severity, Status, campus,
    stats, transfer,
};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled, settings::Style};

/// Settings shared by every command
pub struct Context {
    config: Config,
    json: bool,
}

impl Context {
    pub fn load(data_dir: Option<PathBuf>, json: bool) -> Result<Self> {
        let mut config = Config::load_default()?;
        if data_dir.is_some() {
            config.data_dir = data_dir;
        }
        if !config.display.colors {
            colored::control::set_override(false);
        }
        Ok(Self { config, json })
    }

    fn open_store(&self) -> Result<ReportStore> {
        Ok(ReportStore::open_with_config(&self.config)?)
    }
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Issue")]
    issue: String,
    #[tabled(rename = "Reported")]
    timestamp: String,
}

impl From<&Report> for ReportRow {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id.clone(),
            severity: severity_label(report.severity).to_string(),
            status: status_label(report.status).to_string(),
            location: format!("{} / {}", report.building, report.room),
            issue: report.issue_type.clone(),
            timestamp: report.timestamp.clone(),
        }
    }
}

/// Coloured cells are measured by visible width, not escape bytes
fn report_table(reports: &[Report]) -> String {
    let rows: Vec<ReportRow> = reports.iter().map(ReportRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Low => label.green(),
        Severity::Medium => label.yellow(),
        Severity::High => label.red(),
        Severity::Critical => label.red().bold(),
    }
}

fn status_label(status: Status) -> ColoredString {
    let label = status.to_string();
    match status {
        Status::New => label.white(),
        Status::Verified => label.blue(),
        Status::Investigating => label.yellow(),
        Status::Resolved => label.green(),
        Status::FalseReport => label.dimmed(),
    }
}

fn confirm(warning: &str) -> Result<bool> {
    println!("{}", warning.red());
    print!("Continue? [y/N] ");
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn warn_if_not_durable(store: &ReportStore) {
    if !store.is_durable() {
        eprintln!(
            "{} Changes could not be written to disk and will be lost on exit",
            "!".yellow()
        );
    }
}

pub fn create(ctx: &Context, fields: NewReport) -> Result<()> {
    let mut store = ctx.open_store()?;
    let report = store.create(fields);
    warn_if_not_durable(&store);

    if ctx.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{} Created report: {}", "✓".green(), report.id);
        println!("  Location: {} / {}", report.building, report.room);
        println!("  Severity: {}", severity_label(report.severity));
    }

    Ok(())
}

pub fn list(
    ctx: &Context,
    building: Option<String>,
    status: Option<String>,
    severity: Option<String>,
    search: Option<String>,
) -> Result<()> {
    let store = ctx.open_store()?;
    let filter = ReportFilter::from_query(
        building.as_deref(),
        status.as_deref(),
        severity.as_deref(),
        search.as_deref(),
    )?;
    let reports = store.list(&filter);

    if ctx.json {
        println!("{}", serde_json::to_string(&reports)?);
    } else if reports.is_empty() {
        println!("No reports found");
    } else {
        println!("{}", report_table(&reports));
        println!("{} report(s)", reports.len());
    }

    Ok(())
}

pub fn show(ctx: &Context, id: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let report = store
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Report not found: {}", id))?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{} {}", report.id.cyan().bold(), report.issue_type.bold());
        println!();
        println!("Status:    {}", status_label(report.status));
        println!("Severity:  {}", severity_label(report.severity));
        println!("Location:  {} / {}", report.building, report.room);
        println!("Device:    {}", report.device);
        match &report.email {
            Some(email) => println!("Reporter:  {} <{}>", report.name, email),
            None => println!("Reporter:  {}", report.name),
        }
        println!("Reported:  {}", report.timestamp);
        println!(
            "Updated:   {}",
            report.updated_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        );
        println!();
        println!("{}", "Description:".bold());
        println!("{}", report.description);
    }

    Ok(())
}

pub fn update(
    ctx: &Context,
    id: &str,
    status: Option<String>,
    severity: Option<String>,
    building: Option<String>,
    room: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let patch = ReportPatch {
        status: status.as_deref().map(str::parse).transpose()?,
        severity: severity.as_deref().map(str::parse).transpose()?,
        building,
        room,
        description,
        ..ReportPatch::default()
    };
    if patch.is_empty() {
        bail!("Nothing to update; pass at least one field");
    }

    let mut store = ctx.open_store()?;
    let report = store.update(id, patch)?;
    warn_if_not_durable(&store);

    if ctx.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{} Updated {} ({})", "✓".green(), id, status_label(report.status));
    }

    Ok(())
}

pub fn delete(ctx: &Context, id: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let removed = store.delete(id)?;
    warn_if_not_durable(&store);

    if ctx.json {
        println!("{}", serde_json::to_string(&removed)?);
    } else {
        println!("{} Deleted {}", "✓".green(), removed.id);
    }

    Ok(())
}

#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "Building")]
    building: String,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "Active")]
    active: usize,
    #[tabled(rename = "Resolved")]
    resolved: usize,
    #[tabled(rename = "Rooms")]
    rooms: usize,
}

pub fn stats_locations(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let locations = stats::location_stats(store.snapshot());

    if ctx.json {
        println!("{}", serde_json::to_string(&locations)?);
    } else if locations.is_empty() {
        println!("No reports yet");
    } else {
        let rows: Vec<LocationRow> = locations
            .iter()
            .map(|l| LocationRow {
                building: l.building.clone(),
                total: l.total_reports,
                active: l.active_reports,
                resolved: l.resolved_reports,
                rooms: l.rooms.len(),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    Ok(())
}

pub fn stats_summary(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let summary = stats::summary(store.snapshot());

    if ctx.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!("{}", "Summary".bold());
        println!("  Total:          {}", summary.total);
        println!("  Active:         {}", summary.active.to_string().yellow());
        println!("  Resolved:       {}", summary.resolved.to_string().green());
        println!("  Resolved today: {}", summary.resolved_today);
        println!("  Resolution:     {}%", summary.resolution_rate);
    }

    Ok(())
}

pub fn stats_weekly(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let trend = stats::weekly_trend(store.snapshot(), ctx.config.display.locale);

    if ctx.json {
        println!("{}", serde_json::to_string(&trend)?);
    } else {
        println!("{}", "Last 7 days (reported / resolved)".bold());
        for point in &trend {
            println!(
                "  {:<4} {:>3} {}  {:>3} {}",
                point.day,
                point.reports,
                "#".repeat(point.reports).cyan(),
                point.resolved,
                "#".repeat(point.resolved).green()
            );
        }
    }

    Ok(())
}

pub fn stats_types(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let slices = stats::issue_type_distribution(store.snapshot());

    if ctx.json {
        println!("{}", serde_json::to_string(&slices)?);
    } else if slices.is_empty() {
        println!("No reports yet");
    } else {
        for slice in &slices {
            println!("  {:<16} {}", slice.label, slice.count);
        }
    }

    Ok(())
}

pub fn export(ctx: &Context, output: Option<PathBuf>) -> Result<()> {
    let store = ctx.open_store()?;
    let document = transfer::export(&store);
    let path = output.unwrap_or_else(|| PathBuf::from(document.file_name()));

    std::fs::write(&path, document.to_json_pretty()?)?;

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({ "path": path, "count": document.reports.len() })
        );
    } else {
        println!(
            "{} Exported {} reports to {}",
            "✓".green(),
            document.reports.len(),
            path.display()
        );
    }

    Ok(())
}

pub fn import(ctx: &Context, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let mut store = ctx.open_store()?;
    let outcome = transfer::import_str(&mut store, &content);
    warn_if_not_durable(&store);

    if ctx.json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else if outcome.success {
        println!("{} {}", "✓".green(), outcome.message);
    }

    if !outcome.success {
        bail!("{}", outcome.message);
    }
    Ok(())
}

pub fn reset(ctx: &Context, yes: bool) -> Result<()> {
    if !yes && !confirm("This replaces every report with the built-in samples.")? {
        println!("Aborted");
        return Ok(());
    }

    let mut store = ctx.open_store()?;
    store.reset_to_default();
    warn_if_not_durable(&store);

    if ctx.json {
        println!("{}", serde_json::json!({ "total": store.len() }));
    } else {
        println!("{} Reset to {} sample reports", "✓".green(), store.len());
    }

    Ok(())
}

pub fn clear(ctx: &Context, yes: bool) -> Result<()> {
    if !yes && !confirm("This removes every report.")? {
        println!("Aborted");
        return Ok(());
    }

    let mut store = ctx.open_store()?;
    store.clear_all();
    warn_if_not_durable(&store);

    if !ctx.json {
        println!("{} All reports cleared", "✓".green());
    }

    Ok(())
}

pub fn campus(ctx: &Context) -> Result<()> {
    if ctx.json {
        let catalog = serde_json::json!({
            "buildings": campus::buildings(),
            "issueTypes": campus::ISSUE_TYPES,
            "devices": campus::DEVICES,
        });
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    for building in campus::buildings() {
        println!("{}", building.name.bold());
        println!("  {}", building.rooms.join(", "));
    }
    println!();
    println!("{} {}", "Issue types:".bold(), campus::ISSUE_TYPES.join(", "));
    println!("{} {}", "Devices:".bold(), campus::DEVICES.join(", "));

    Ok(())
}

pub fn config_show(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("{}", "Current configuration:".bold());
        println!();
        println!("prefix = \"{}\"", config.prefix);
        println!("data_dir = \"{}\"", config.resolve_data_dir()?.display());
        println!("seed_on_first_run = {}", config.seed_on_first_run);
        println!();
        println!("[display]");
        println!("timestamp_format = \"{}\"", config.display.timestamp_format);
        println!("locale = {}", serde_json::to_string(&config.display.locale)?);
        println!("colors = {}", config.display.colors);
        println!();
        println!("[api]");
        println!("host = \"{}\"", config.api.host);
        println!("port = {}", config.api.port);
        println!("sync_interval_ms = {}", config.api.sync_interval_ms);
    }

    Ok(())
}

pub fn config_path(ctx: &Context) -> Result<()> {
    let path = Config::default_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if ctx.json {
        println!("{}", serde_json::json!({ "path": path }));
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

pub fn config_init(force: bool) -> Result<()> {
    let path = Config::default_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::default_with_comments())?;

    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}
