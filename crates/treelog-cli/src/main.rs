//! Treelog CLI
//!
//! Replays recordings saved as JSON onto a configured log backend.
//!
//! ## Usage
//!
//! ```bash
//! # Replay onto the backend from ~/.config/treelog/config.yaml (console by default)
//! treelog replay run.json
//!
//! # Replay only warnings and errors
//! treelog replay run.json --min-level warning
//!
//! # Extract the recorded files into a directory
//! treelog replay run.json --backend data --dir ./out
//!
//! # Print the recorded command tree
//! treelog show run.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use treelog_core::{Command, Level, LogError, LogResult, Recording, TreelogConfig};

/// Treelog - replay recorded logging sessions
#[derive(Parser)]
#[command(name = "treelog")]
#[command(version)]
#[command(about = "Replay recorded treelog sessions")]
struct Cli {
    /// Write internal diagnostics (same as TREELOG_DEBUG=1)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recording onto a log backend
    Replay {
        /// Recording saved as JSON
        recording: PathBuf,

        /// Config file (default: ~/.config/treelog/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Backend name, overrides the config
        #[arg(short, long)]
        backend: Option<String>,

        /// Minimum level to replay (debug, info, user, warning, error)
        #[arg(long)]
        min_level: Option<Level>,

        /// Output directory for the data backend
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Print the commands of a recording as a tree
    Show {
        /// Recording saved as JSON
        recording: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.debug {
        treelog_core::diagnostics::set_enabled(true);
    }

    let result = match cli.command {
        Commands::Replay {
            recording,
            config,
            backend,
            min_level,
            dir,
        } => replay(&recording, config.as_deref(), backend, min_level, dir),
        Commands::Show { recording } => show(&recording),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn replay(
    path: &Path,
    config: Option<&Path>,
    backend: Option<String>,
    min_level: Option<Level>,
    dir: Option<PathBuf>,
) -> LogResult<()> {
    let recording = Recording::load(path)?;

    let mut settings = match config {
        Some(config) => TreelogConfig::load(config)?.with_overrides(|key| std::env::var(key).ok())?,
        None => TreelogConfig::discover()?,
    };
    if let Some(backend) = backend {
        settings.backend = backend;
    }
    if min_level.is_some() {
        settings.min_level = min_level;
    }
    if dir.is_some() {
        settings.directory = dir;
    }

    let log = settings.build_log()?;
    recording.replay(log.as_ref())
}

fn show(path: &Path) -> LogResult<()> {
    let recording = Recording::load(path)?;
    for line in render(&recording)? {
        println!("{}", line);
    }
    Ok(())
}

/// One line per command, indented by context depth
fn render(recording: &Recording) -> LogResult<Vec<String>> {
    let mut lines = Vec::with_capacity(recording.commands.len() + 1);
    let mut depth = 0usize;

    for (index, command) in recording.commands.iter().enumerate() {
        let indent = "  ".repeat(depth);
        match command {
            Command::ContextEnter { title } => {
                lines.push(format!("{}{}", indent, title));
                depth += 1;
            }
            Command::ContextExit => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| LogError::malformed(index, "context exit without enter"))?;
            }
            Command::Write { text, level } => {
                lines.push(format!("{}[{}] {}", indent, level, text));
            }
            Command::OpenEnter {
                filename,
                mode,
                level,
                id,
            } => {
                let cached = match id {
                    Some(id) => format!(" id={}", id.as_str()),
                    None => String::new(),
                };
                lines.push(format!(
                    "{}[{}] file {} ({}){}",
                    indent,
                    level,
                    filename,
                    mode.as_str(),
                    cached
                ));
                depth += 1;
            }
            Command::OpenExit { data } => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| LogError::malformed(index, "file exit without open"))?;
                let summary = match data {
                    Some(data) => format!("{} bytes", data.len()),
                    None => "no data".to_string(),
                };
                lines.push(format!("{}  {}", "  ".repeat(depth), summary));
            }
        }
    }

    lines.push(format!(
        "{} commands, {} cached files",
        recording.commands.len(),
        recording.seen.len()
    ));
    Ok(lines)
}
