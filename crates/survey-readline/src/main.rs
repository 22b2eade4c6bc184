use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use tracing_subscriber::util::SubscriberInitExt;

use survey_core::config::SurveyRegistry;
use survey_core::flow::{SurveyController, SystemClock};
use survey_core::snapshot::SnapshotRepository;
use survey_infrastructure::{
    LogBuffer, PocketBaseBackend, SettingsService, TomlSnapshotRepository,
};

mod fault;
mod helper;
mod input;
mod logging;
mod screens;

use helper::CliHelper;
use screens::{SurveyApp, Turn};

#[derive(Parser)]
#[command(name = "survey")]
#[command(about = "Artifact Survey - tell us how you would describe the app you wish existed", long_about = None)]
struct Cli {
    /// Settings file (defaults to ~/.config/artifact-survey/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Record store URL, overriding settings and environment
    #[arg(long)]
    backend_url: Option<String>,

    /// Survey to run
    #[arg(long)]
    survey: Option<String>,

    /// Discard any saved progress and start over
    #[arg(long)]
    fresh: bool,

    /// Write the captured telemetry as JSON on exit
    #[arg(long, value_name = "PATH")]
    export_logs: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let buffer = LogBuffer::new();
    logging::subscriber(buffer.clone(), logging::open_log_file())
        .try_init()
        .context("Failed to install tracing subscriber")?;

    // ===== Settings =====
    let settings_service = match &cli.config {
        Some(path) => SettingsService::with_path(path.clone()),
        None => SettingsService::new()?,
    };
    let mut settings = settings_service.load()?;
    if let Some(url) = cli.backend_url {
        settings.backend_url = url;
    }
    if let Some(id) = cli.survey {
        settings.survey_id = id;
    }

    let registry = SurveyRegistry::builtin();
    let survey = registry.get(&settings.survey_id).cloned().ok_or_else(|| {
        anyhow!(
            "Unknown survey '{}'. Available: {}",
            settings.survey_id,
            registry.ids().join(", ")
        )
    })?;

    // ===== Collaborators =====
    let snapshots: Arc<dyn SnapshotRepository> = Arc::new(match &settings.snapshot_path {
        Some(path) => TomlSnapshotRepository::with_path(path.clone()),
        None => TomlSnapshotRepository::new()?,
    });
    let backend = Arc::new(PocketBaseBackend::new(
        settings.backend_url.clone(),
        settings.request_timeout(),
    )?);
    let clock = Arc::new(SystemClock);

    let controller = if cli.fresh {
        if let Err(e) = snapshots.clear() {
            tracing::warn!(target: "survey", error = %e, "Failed to clear saved state");
        }
        SurveyController::new(survey.features, snapshots, clock)
    } else {
        SurveyController::resume(survey.features, snapshots, clock)
    };

    // ===== REPL =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", format!("=== {} ===", survey.name).bright_magenta().bold());
    println!(
        "{}",
        "Type /back to go back, or /quit to leave (your progress is saved).".bright_black()
    );

    let mut app = SurveyApp::new(controller, survey, backend, rl);
    let finished = app.run().await?;
    if finished == Turn::Finished {
        tracing::info!(target: "survey", "Survey finished");
    }

    if let Some(path) = cli.export_logs {
        fs::write(&path, buffer.export_json()?)
            .with_context(|| format!("Failed to write logs to {}", path.display()))?;
        println!("{}", format!("Logs written to {}", path.display()).bright_black());
    }

    Ok(())
}
