//! netcrowd - campus network issue reports from the terminal
//!
//! Works directly on the same data file the API server uses.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "netcrowd")]
#[command(about = "Campus network issue reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding reports.jsonl
    #[arg(long, global = true, env = "NETCROWD_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// File a new report
    Create {
        /// Reporter name
        #[arg(short, long)]
        name: String,

        /// Reporter email
        #[arg(short, long)]
        email: Option<String>,

        /// Building (see `netcrowd campus`)
        #[arg(short, long)]
        building: String,

        /// Room within the building
        #[arg(short, long)]
        room: String,

        /// Issue type, e.g. "Slow Internet Speed"
        #[arg(short = 't', long)]
        issue_type: String,

        /// Device the problem was seen on
        #[arg(long, default_value = "Laptop")]
        device: String,

        /// What is going wrong
        #[arg(short, long)]
        description: String,

        /// Severity (low, medium, high, critical)
        #[arg(short, long, default_value = "medium")]
        severity: String,
    },

    /// List reports, newest first
    List {
        /// Only this building
        #[arg(short, long)]
        building: Option<String>,

        /// Only this status
        #[arg(short, long)]
        status: Option<String>,

        /// Only this severity
        #[arg(long)]
        severity: Option<String>,

        /// Text to look for in name, building, room or description
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Show report details
    Show {
        /// Report ID
        id: String,
    },

    /// Update a report
    Update {
        /// Report ID
        id: String,

        /// New status (new, verified, investigating, resolved, false_report)
        #[arg(long)]
        status: Option<String>,

        /// New severity
        #[arg(long)]
        severity: Option<String>,

        /// New building
        #[arg(long)]
        building: Option<String>,

        /// New room
        #[arg(long)]
        room: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a report
    Delete {
        /// Report ID
        id: String,
    },

    /// Show statistics
    Stats {
        #[command(subcommand)]
        command: Option<StatsCommands>,
    },

    /// Write all reports to an export document
    Export {
        /// Output file (defaults to netcrowd-data-<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge reports from an export document
    Import {
        /// Path to the export document
        path: PathBuf,
    },

    /// Replace all reports with the built-in samples
    Reset {
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Remove every report
    Clear {
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// List known buildings, rooms and form options
    Campus,

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum StatsCommands {
    /// Per-building counts
    Locations,
    /// Headline counters
    Summary,
    /// Reports and resolutions over the last seven days
    Weekly,
    /// Reports per issue type
    Types,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let ctx = Context::load(cli.data_dir, cli.json)?;

    match cli.command {
        Commands::Create {
            name,
            email,
            building,
            room,
            issue_type,
            device,
            description,
            severity,
        } => commands::create(
            &ctx,
            netcrowd_core::NewReport {
                name,
                email,
                building,
                room,
                issue_type,
                device,
                description,
                severity: severity.parse()?,
            },
        ),
        Commands::List {
            building,
            status,
            severity,
            search,
        } => commands::list(&ctx, building, status, severity, search),
        Commands::Show { id } => commands::show(&ctx, &id),
        Commands::Update {
            id,
            status,
            severity,
            building,
            room,
            description,
        } => commands::update(&ctx, &id, status, severity, building, room, description),
        Commands::Delete { id } => commands::delete(&ctx, &id),
        Commands::Stats { command } => match command {
            Some(StatsCommands::Locations) | None => commands::stats_locations(&ctx),
            Some(StatsCommands::Summary) => commands::stats_summary(&ctx),
            Some(StatsCommands::Weekly) => commands::stats_weekly(&ctx),
            Some(StatsCommands::Types) => commands::stats_types(&ctx),
        },
        Commands::Export { output } => commands::export(&ctx, output),
        Commands::Import { path } => commands::import(&ctx, &path),
        Commands::Reset { yes } => commands::reset(&ctx, yes),
        Commands::Clear { yes } => commands::clear(&ctx, yes),
        Commands::Campus => commands::campus(&ctx),
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => commands::config_show(&ctx),
            Some(ConfigCommands::Path) => commands::config_path(&ctx),
            Some(ConfigCommands::Init { force }) => commands::config_init(force),
        },
    }
}
