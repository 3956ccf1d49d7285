//! `mdisync` command line.
//!
//! Each command prints its result as JSON on stdout; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use mdisync::config::load_class_map;
use mdisync::db::{default_database_path, document_repo, stats_repo};
use mdisync::{Database, LogFormat, ProjectConfig};

/// Reconciles deliverable folders and MDI status reports into one
/// document register.
#[derive(Parser)]
#[command(name = "mdisync", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project configuration (JSON). Built-in conventions when omitted.
    #[arg(short, long, global = true, env = "MDISYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Standalone prefix -> class mapping file, replacing the configured one.
    #[arg(long, global = true, env = "MDISYNC_CLASS_MAP")]
    class_map: Option<PathBuf>,

    /// Document store. Defaults to `~/.mdisync/data/mdisync.db`.
    #[arg(long, global = true, env = "MDISYNC_DB")]
    db: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project folder into the document register.
    Scan { root: PathBuf },
    /// Scan a folder into the generic file list.
    ScanGeneric { root: PathBuf },
    /// Merge an MDI status workbook.
    Import { workbook: PathBuf },
    /// Publish the register as the viewer's JSON document.
    Export { output: PathBuf },
    /// Write the register, or the generic file list, as a workbook.
    ExportXlsx {
        output: PathBuf,
        /// Export the generic file list instead of the document register.
        #[arg(long)]
        generic: bool,
    },
    /// Print dashboard statistics.
    Stats,
    /// Merge importer placeholders into scanned rows.
    Reconcile,
    /// Copy documents into the SharePoint sync folder by discipline.
    Publish { sp_root: PathBuf },
    /// File feedback documents and mark them as received.
    Feedback {
        feedback_dir: PathBuf,
        subcon_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    mdisync::init_logging(cli.log_format);

    let config = load_project_config(&cli)?;
    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => default_database_path().context("Could not determine home directory")?,
    };

    match &cli.command {
        Commands::Scan { root } => {
            let db = Database::open(&db_path)?;
            print_json(&mdisync::scan_documents(&db, &config, root)?)
        }
        Commands::ScanGeneric { root } => {
            let db = Database::open(&db_path)?;
            print_json(&mdisync::scan_generic_files(&db, &config, root)?)
        }
        Commands::Import { workbook } => {
            let db = Database::open(&db_path)?;
            print_json(&mdisync::import_workbook(&db, &config, workbook)?)
        }
        Commands::Export { output } => {
            let db = open_for_export(&db_path)?;
            let set = mdisync::export(&db)?;
            mdisync::write_json(&set, output)?;
            print_json(&set.metadata)
        }
        Commands::ExportXlsx { output, generic } => {
            let db = Database::open(&db_path)?;
            let report = if *generic {
                mdisync::export_generic_xlsx(&db, output)?
            } else {
                mdisync::export_documents_xlsx(&db, output)?
            };
            print_json(&report)
        }
        Commands::Stats => {
            let db = Database::open(&db_path)?;
            print_json(&stats_repo::document_stats(&db)?)
        }
        Commands::Reconcile => {
            let db = Database::open(&db_path)?;
            let report =
                document_repo::reconcile_placeholders(&db, &config.import.placeholder_prefix)?;
            document_repo::resequence(&db)?;
            print_json(&report)
        }
        Commands::Publish { sp_root } => {
            let db = Database::open(&db_path)?;
            print_json(&mdisync::publish_to_sharepoint(&db, sp_root)?)
        }
        Commands::Feedback {
            feedback_dir,
            subcon_dir,
        } => {
            let db = Database::open(&db_path)?;
            print_json(&mdisync::collect_feedback(&db, feedback_dir, subcon_dir)?)
        }
    }
}

fn load_project_config(cli: &Cli) -> anyhow::Result<ProjectConfig> {
    let mut config = match &cli.config {
        Some(path) => mdisync::load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            log::info!("No config given, using built-in conventions");
            ProjectConfig::default()
        }
    };
    if let Some(path) = &cli.class_map {
        config.class_map = load_class_map(path)
            .with_context(|| format!("Failed to load class map {}", path.display()))?;
    }
    Ok(config)
}

/// Stores written by older tools are exported as they are; a missing store
/// is created so the export is simply empty.
fn open_for_export(path: &Path) -> anyhow::Result<Database> {
    if path.is_file() {
        Ok(Database::open_unmigrated(path)?)
    } else if path.exists() {
        bail!("{} is not a file", path.display())
    } else {
        Ok(Database::open(path)?)
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
