//! # CLI Layer
//!
//! One possible UI client for postviz. This module is the only place that
//! knows about terminal output, exit codes, files on disk and argument
//! parsing.
//!
//! ## Run sequence
//!
//! 1. Parse arguments, install the tracing subscriber (`-v` or `RUST_LOG`).
//! 2. Load `postviz.toml` from the working directory, then from the OS
//!    config directory.
//! 3. Load the session snapshot and, when it exists, the state file.
//! 4. Dispatch to a handler.
//! 5. If the command changed the state and `--state` was given, write the
//!    state back.
//!
//! ## Module Structure
//!
//! - `setup`: argument parsing via clap
//! - `handlers`: per-command handlers that call the API and print results
//! - `print`: colored output

mod handlers;
mod print;
pub mod setup;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use postvizapp::api::PostvizApi;
use postvizapp::config::{PostvizConfig, CONFIG_FILE_NAME};
use postvizapp::session::SnapshotSession;
use setup::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Schema { set } = &cli.command {
        return handlers::schema(set);
    }

    let config = PostvizConfig::load(&config_files())?;
    let session_path = cli
        .session
        .as_deref()
        .ok_or_else(|| anyhow!("No session snapshot given (use --session or POSTVIZ_SESSION)"))?;
    let session = SnapshotSession::load(session_path)
        .with_context(|| format!("Could not load session {}", session_path.display()))?;
    let api = PostvizApi::new(Rc::new(session), config);

    if let Some(state_path) = cli.state.as_deref() {
        load_state(&api, state_path)?;
    }

    let modified = handlers::dispatch(&api, cli.command)?;

    if let (true, Some(state_path)) = (modified, cli.state.as_deref()) {
        save_state(&api, state_path)?;
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config files in priority order: working directory, then OS config dir.
fn config_files() -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        files.push(cwd.join(CONFIG_FILE_NAME));
    }
    if let Some(dirs) = ProjectDirs::from("com", "postviz", "postviz") {
        files.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }
    files
}

fn load_state(api: &PostvizApi, path: &Path) -> Result<()> {
    if !path.exists() {
        debug!(path = %path.display(), "no state file yet");
        return Ok(());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read state {}", path.display()))?;
    let state: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid state file {}", path.display()))?;
    api.load_state(&state)?;
    Ok(())
}

fn save_state(api: &PostvizApi, path: &Path) -> Result<()> {
    let state = api.state()?;
    let mut content = serde_json::to_string_pretty(&state)?;
    content.push('\n');
    std::fs::write(path, content)
        .with_context(|| format!("Could not write state {}", path.display()))?;
    debug!(path = %path.display(), "saved state");
    Ok(())
}
