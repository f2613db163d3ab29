//! docbatch - Bulk move, archive and delete for remote document stores.
//!
//! Usage:
//!   docbatch --deal D move -d docs.json -t FOLDER   Move documents into a folder
//!   docbatch --deal D archive -d docs.json [--undo] Archive documents
//!   docbatch --deal D delete -d docs.json           Delete documents
//!   docbatch --deal D restore -d docs.json          Restore archived documents
//!   docbatch --help                                 Show help

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail, eyre};
use serde::{Deserialize, Serialize};

use docbatch_client::{ClientConfig, HttpClient};
use docbatch_core::{
    BulkOperationRequest, CoordinatorConfig, DocumentFailure, DocumentId, DocumentRef, load_toml,
};
use docbatch_ops::{
    BulkOperationCoordinator, BulkOutcome, Notifier, ProgressState, ToastMessage, UndoOutcome,
};

#[derive(Parser)]
#[command(
    name = "docbatch",
    version,
    about = "Bulk move, archive and delete for remote document stores",
    long_about = "docbatch runs one bulk operation against the document API, \
                  reporting per-document failures and offering undo for archives.\n\n\
                  Documents are read from a JSON file holding an array of \
                  {\"id\", \"name\", \"folder_id\"} objects."
)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root URL of the document API (overrides the config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token for the document API
    #[arg(long)]
    token: Option<String>,

    /// Deal that owns the documents
    #[arg(long)]
    deal: String,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Move documents into a folder
    Move {
        /// JSON file with the selected documents
        #[arg(short, long)]
        documents: PathBuf,

        /// Destination folder id
        #[arg(short, long)]
        target: String,
    },

    /// Archive documents
    Archive {
        /// JSON file with the selected documents
        #[arg(short, long)]
        documents: PathBuf,

        /// Undo the archive right after it succeeds
        #[arg(long)]
        undo: bool,
    },

    /// Delete documents
    Delete {
        /// JSON file with the selected documents
        #[arg(short, long)]
        documents: PathBuf,
    },

    /// Restore archived documents
    Restore {
        /// JSON file with the selected documents
        #[arg(short, long)]
        documents: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Contents of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    coordinator: CoordinatorConfig,
    client: Option<ClientConfig>,
}

/// Prints toasts and progress to stderr.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show_toast(&self, toast: &ToastMessage) {
        eprintln!("{}", toast_line(toast));
    }

    fn show_progress(&self, progress: Option<ProgressState>) {
        if let Some(progress) = progress {
            eprintln!("[progress] {} ({:.0}%)", progress, progress.percentage());
        }
    }
}

/// One stderr line for a toast, tagged by severity.
fn toast_line(toast: &ToastMessage) -> String {
    let tag = if toast.is_alert() { "alert" } else { "status" };
    format!("[{tag}] {}", toast.text)
}

/// Final report written to stdout.
#[derive(Debug, Serialize)]
struct Report {
    outcome: &'static str,
    message: Option<String>,
    succeeded_ids: Vec<DocumentId>,
    failures: Vec<DocumentFailure>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    settings
        .coordinator
        .validate()
        .context("Invalid coordinator configuration")?;

    let client_config = resolve_client_config(&cli, settings.client)?;
    let client = HttpClient::new(&client_config).context("Failed to create HTTP client")?;

    let coordinator = BulkOperationCoordinator::new(cli.deal.as_str(), client)
        .with_config(settings.coordinator)
        .with_notifier(Arc::new(ConsoleNotifier));

    let (request, undo) = match cli.command {
        Command::Move { documents, target } => (
            BulkOperationRequest::move_to(read_documents(&documents)?, target),
            false,
        ),
        Command::Archive { documents, undo } => (
            BulkOperationRequest::archive(read_documents(&documents)?),
            undo,
        ),
        Command::Delete { documents } => (
            BulkOperationRequest::delete(read_documents(&documents)?),
            false,
        ),
        Command::Restore { documents } => (
            BulkOperationRequest::restore(read_documents(&documents)?),
            false,
        ),
    };

    let outcome = coordinator.execute(request).await;

    if undo {
        let token = coordinator
            .toast()
            .and_then(|t| t.undo)
            .ok_or_else(|| eyre!("Archive did not fully succeed; nothing to undo"))?;
        if let UndoOutcome::Failed(err) = coordinator.undo(token).await {
            bail!("Failed to undo archive: {err}");
        }
    }

    let report = build_report(&outcome, coordinator.toast());
    match cli.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    match outcome {
        BulkOutcome::Rejected(err) => bail!("{err}"),
        BulkOutcome::RolledBack(err) => bail!("{err}"),
        BulkOutcome::Ignored => bail!("No documents to process"),
        BulkOutcome::Settled(_) => Ok(()),
    }
}

/// Load the explicit config file, or the default one if it exists.
fn load_settings(path: Option<&Path>) -> Result<Settings> {
    if let Some(path) = path {
        return load_toml(path).context("Failed to load configuration");
    }

    let default_path = dirs::config_dir().map(|d| d.join("docbatch").join("config.toml"));
    match default_path {
        Some(path) if path.exists() => load_toml(&path).context("Failed to load configuration"),
        _ => Ok(Settings::default()),
    }
}

/// Merge command-line overrides into the configured client settings.
fn resolve_client_config(cli: &Cli, configured: Option<ClientConfig>) -> Result<ClientConfig> {
    let mut config = match (&cli.base_url, configured) {
        (Some(url), Some(mut config)) => {
            config.base_url = url.clone();
            config
        }
        (Some(url), None) => ClientConfig::new(url.clone()),
        (None, Some(config)) => config,
        (None, None) => bail!("No API base URL; pass --base-url or set [client] base_url"),
    };

    if cli.token.is_some() {
        config.bearer_token = cli.token.clone();
    }
    Ok(config)
}

/// Read the selected documents from a JSON file.
fn read_documents(path: &Path) -> Result<Vec<DocumentRef>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid document list in {}", path.display()))
}

fn build_report(outcome: &BulkOutcome, toast: Option<ToastMessage>) -> Report {
    let (name, succeeded_ids, failures) = match outcome {
        BulkOutcome::Ignored => ("ignored", Vec::new(), Vec::new()),
        BulkOutcome::Rejected(_) => ("rejected", Vec::new(), Vec::new()),
        BulkOutcome::Settled(result) => (
            "settled",
            result.succeeded_ids.clone(),
            result.failures.clone(),
        ),
        BulkOutcome::RolledBack(_) => ("rolled_back", Vec::new(), Vec::new()),
    };

    let message = match outcome {
        BulkOutcome::Rejected(err) => Some(err.to_string()),
        _ => toast.map(|t| t.text),
    };

    Report {
        outcome: name,
        message,
        succeeded_ids,
        failures,
    }
}

fn print_report(report: &Report) {
    println!();
    println!("{}", "─".repeat(60));
    println!(" Outcome: {}", report.outcome);
    if let Some(message) = &report.message {
        println!(" {message}");
    }
    println!("{}", "─".repeat(60));

    if !report.succeeded_ids.is_empty() {
        println!(" {} succeeded", report.succeeded_ids.len());
    }
    for failure in &report.failures {
        println!("   {failure}");
    }
}
