//! jsstyle - run the JavaScript Standard Style language server from a
//! terminal.
//!
//! Drives a [`jsstyle_engine::LinterSession`] through a headless editor
//! host: `check` opens each file and prints what the server publishes,
//! `fix` runs the autofix command on each file and writes the result back.

mod host;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use jsstyle_config::{FileMemento, JsstyleConfig, MemoryMemento};
use jsstyle_engine::{
    ApplyOutcome, Command, LinterProfile, LinterSession, Memento, ProcessLauncher, SEMISTANDARD,
    STANDARD,
};
use jsstyle_lsp::LintDiagnostic;

use crate::host::HeadlessHost;

/// How long to wait for the server to publish diagnostics for one file.
const DIAGNOSTICS_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Parser)]
#[command(name = "jsstyle")]
#[command(version, about = "Check and fix JavaScript with the Standard Style language server", long_about = None)]
struct Cli {
    /// Linter variant
    #[arg(long, value_enum, default_value = "standard", global = true)]
    variant: Variant,

    /// Config file (default: ~/.jsstyle/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Print diagnostics for each file
    Check {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Apply every available fix and write the files back
    Fix {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Variant {
    Standard,
    Semistandard,
}

impl From<Variant> for LinterProfile {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Standard => STANDARD,
            Variant::Semistandard => SEMISTANDARD,
        }
    }
}

type Session = LinterSession<HeadlessHost, ProcessLauncher>;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    // ~/.jsstyle/logs/jsstyle.log
    jsstyle_config::config_dir()
        .map(|dir| dir.join("logs").join("jsstyle.log"))
        .into_iter()
        .collect()
}

fn load_config(path: Option<&Path>) -> Result<JsstyleConfig> {
    match path {
        Some(path) => JsstyleConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(JsstyleConfig::load()
            .context("loading config")?
            .unwrap_or_default()),
    }
}

fn open_state() -> Box<dyn Memento> {
    match FileMemento::default_path() {
        Some(path) => Box::new(FileMemento::open(path)),
        None => Box::new(MemoryMemento::new()),
    }
}

async fn check(session: &mut Session, files: &[PathBuf]) -> Result<ExitCode> {
    let mut errors = 0;
    let mut warnings = 0;

    for path in files {
        let document = session.host_mut().open(path)?;
        if !session.profile().handles_language(&document.language_id) {
            eprintln!("{}: not a JavaScript file, skipped", path.display());
            session.host_mut().close(&document.uri);
            continue;
        }

        session.on_document_opened(&document).await;
        match wait_for_diagnostics(session, &document.uri).await {
            Some(diagnostics) => {
                for diagnostic in &diagnostics {
                    println!("{}", diagnostic.display_with_path(path));
                    if diagnostic.severity().is_error() {
                        errors += 1;
                    } else {
                        warnings += 1;
                    }
                }
            }
            None => eprintln!("{}: no diagnostics received", path.display()),
        }

        session.on_document_closed(&document.uri).await;
        session.host_mut().close(&document.uri);
    }

    tracing::info!(errors, warnings, files = files.len(), "Check finished");
    if errors > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

async fn wait_for_diagnostics(session: &mut Session, uri: &str) -> Option<Vec<LintDiagnostic>> {
    let wait = async {
        loop {
            if let Some(diagnostics) = session.host().diagnostics_for(uri) {
                return Some(diagnostics.to_vec());
            }
            if !session.process_next_event().await {
                return None;
            }
        }
    };
    tokio::time::timeout(DIAGNOSTICS_TIMEOUT, wait)
        .await
        .ok()
        .flatten()
}

async fn fix(session: &mut Session, files: &[PathBuf]) -> Result<ExitCode> {
    let command = session.profile().command_id(Command::ExecuteAutofix.name());
    let mut failed = false;

    for path in files {
        let document = session.host_mut().open(path)?;
        session.host_mut().set_active(&document.uri);
        session.on_document_opened(&document).await;
        session.poll_events().await;

        match session.execute_command(&command, &[]).await? {
            Some(ApplyOutcome::Applied) => {
                if session.host_mut().save(&document.uri)? {
                    println!("{}: fixed", path.display());
                } else {
                    println!("{}: nothing to fix", path.display());
                }
            }
            Some(outcome) => {
                eprintln!("{}: fixes not applied ({outcome:?})", path.display());
                failed = true;
            }
            None => println!("{}: nothing to fix", path.display()),
        }

        session.on_document_closed(&document.uri).await;
        session.host_mut().close(&document.uri);
    }

    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let profile = LinterProfile::from(cli.variant);
    let root = std::env::current_dir().ok();

    let host = HeadlessHost::new(config, root);
    let mut session = LinterSession::new(profile, host, open_state(), ProcessLauncher);
    session.activate().await;
    if !session.is_running() {
        session.host().flush_output();
        bail!(
            "{} server is not running (is it enabled and installed?)",
            profile.display_name
        );
    }

    let result = match &cli.mode {
        Mode::Check { files } => check(&mut session, files).await,
        Mode::Fix { files } => fix(&mut session, files).await,
    };

    session.deactivate().await;
    session.host().flush_output();
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(2)
        }
    }
}
