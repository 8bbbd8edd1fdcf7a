//! voxcalc CLI - line-oriented front end for [`voxcalc_engine`].
//!
//! # Input
//!
//! Every line read from stdin is one event:
//!
//! - `/cmd args` drives the keypad (see [`voxcalc_engine::command_help_summary`])
//! - anything else is a speech transcript and goes through the router
//!
//! # Event Loop
//!
//! ```text
//! select! {
//!     stdin line        -> process_command | handle_utterance
//!     remote solve done -> applied to the display
//!     ctrl-c            -> quit
//! }
//! ```
//!
//! After each event the current view and display are printed.

use std::fs::{self, OpenOptions};
use std::io::{Write, stdout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use voxcalc_config::{ResolvedConfig, config_path};
use voxcalc_engine::{App, ConsoleSpeaker, command_help_summary};
use voxcalc_providers::gemini::GeminiSolver;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

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

    // No log file: drop logs rather than interleave them with REPL output.
    tracing_subscriber::registry().with(env_filter).init();
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

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
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
    let mut candidates = Vec::new();

    // Primary: ~/.voxcalc/logs/voxcalc.log
    if let Some(config_path) = config_path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("voxcalc.log"));
    }

    // Fallback: ./.voxcalc/logs/voxcalc.log
    candidates.push(PathBuf::from(".voxcalc").join("logs").join("voxcalc.log"));

    candidates
}

fn render(app: &App) -> Result<()> {
    let display = match app.display() {
        "" => "0",
        text => text,
    };
    let listening = if app.is_listening() { " (listening)" } else { "" };
    let mut out = stdout().lock();
    writeln!(
        out,
        "[{}]{listening} {display}",
        app.shell().view.display_name()
    )?;
    out.flush()?;
    Ok(())
}

fn handle_line(app: &mut App, line: &str) {
    let trimmed = line.trim();
    let notice = match trimmed.strip_prefix('/') {
        Some(command) => app.process_command(command),
        None => app.handle_utterance(trimmed),
    };
    if let Some(notice) = notice {
        println!("{notice}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ResolvedConfig::load();
    let solver = GeminiSolver::new(
        config.solver.api_key.clone(),
        config.solver.model.clone(),
        config.solver.base_url.clone(),
        config.solver.timeout,
    )
    .context("failed to build solver client")?;
    let mut app = App::from_config(&config, Arc::new(solver), Box::new(ConsoleSpeaker));

    println!("voxcalc: type a question, or a keypad command.");
    println!("{}", command_help_summary());
    render(&app)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    // Input closed: let an outstanding solve land before exiting.
                    if let Some(outcome) = app.next_remote_outcome().await {
                        tracing::debug!(?outcome, "remote solve finished after end of input");
                        render(&app)?;
                    }
                    break;
                };
                handle_line(&mut app, &line);
                if app.should_quit() {
                    break;
                }
            }
            Some(outcome) = app.next_remote_outcome(), if app.has_pending_solve() => {
                tracing::debug!(?outcome, "remote solve finished");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
        render(&app)?;
    }

    Ok(())
}
