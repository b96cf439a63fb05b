//! tidefm: command-line front end for the TideFM core.
//!
//! Usage:
//!   tidefm watch <DIR>                  Print change events until Ctrl-C
//!   tidefm status <DIR>                 Print version-control status
//!   tidefm flatten <DIR>                Move a folder's contents up one level
//!   tidefm duplicate <PATH>...          Copy entries next to themselves
//!   tidefm rename <PATTERN> <PATH>...   Rename entries to "<PATTERN> (n)"

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use tidefm_core::{
    Config, DirectoryWatcher, DuplicateFiles, FileEntry, FileSystem, FlattenFolder, LocalFs,
    Outcome, RenameMultiple, UndoHistory, VcsTracker,
};

#[derive(Parser)]
#[command(name = "tidefm", version, about = "Reversible file operations and change tracking")]
struct Cli {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch a directory tree and print every change
    Watch {
        dir: PathBuf,

        /// Delay between samples in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Report renames as moves
        #[arg(long)]
        detect_moves: bool,
    },

    /// Show the repository root and every changed path
    Status { dir: PathBuf },

    /// Move a folder's contents into its parent and remove the folder
    Flatten { dir: PathBuf },

    /// Duplicate entries as "<name> - Copy"
    Duplicate {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Rename entries of one folder to "<PATTERN> (n)", keeping extensions
    Rename {
        pattern: String,

        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Turns an error outcome into a process error carrying every message.
fn finish<T>(outcome: Outcome<T>) -> anyhow::Result<()> {
    if outcome.is_ok() {
        return Ok(());
    }
    anyhow::bail!("{}", outcome.messages().join("\n"))
}

fn entries_for(paths: &[PathBuf]) -> anyhow::Result<Vec<FileEntry>> {
    paths
        .iter()
        .map(|p| FileEntry::from_path(p).with_context(|| format!("cannot read {}", p.display())))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref())?;
    let fs: Arc<dyn FileSystem> = Arc::new(LocalFs::new());
    let mut history = UndoHistory::from_config(&config.history);

    match cli.command {
        Command::Watch {
            dir,
            interval_ms,
            detect_moves,
        } => {
            let mut watcher_config = config.watcher.clone();
            if let Some(ms) = interval_ms {
                watcher_config.interval_ms = ms;
            }
            watcher_config.detect_moves |= detect_moves;
            watch(dir, fs, &watcher_config).await
        }
        Command::Status { dir } => status(&dir, &config),
        Command::Flatten { dir } => {
            let outcome = history.execute(Box::new(FlattenFolder::new(fs, &dir)));
            if outcome.is_ok() {
                println!("flattened {}", dir.display());
            }
            finish(outcome)
        }
        Command::Duplicate { paths } => {
            let op = DuplicateFiles::with_generated_names(fs, entries_for(&paths)?);
            for (path, name) in paths.iter().zip(op.copy_names()) {
                println!("{} -> {name}", path.display());
            }
            finish(history.execute(Box::new(op)))
        }
        Command::Rename { pattern, paths } => {
            let op = RenameMultiple::with_pattern(fs, entries_for(&paths)?, &pattern)?;
            for (path, name) in paths.iter().zip(op.new_names()) {
                println!("{} -> {name}", path.display());
            }
            finish(history.execute(Box::new(op)))
        }
    }
}

async fn watch(
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
    config: &tidefm_core::config::WatcherConfig,
) -> anyhow::Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let cancel = CancellationToken::new();
    tracing::info!("watching {} every {}ms", dir.display(), config.interval().as_millis());
    let mut handle = DirectoryWatcher::new(dir, fs, config).spawn(tx, cancel.clone());

    // The channel is synchronous, so drain it off the runtime threads.
    let printer = tokio::task::spawn_blocking(move || {
        for event in rx {
            println!("{event}");
        }
    });

    let outcome = tokio::select! {
        outcome = &mut handle => outcome?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            cancel.cancel();
            handle.await?
        }
    };
    printer.await?;
    finish(outcome)
}

fn status(dir: &Path, config: &Config) -> anyhow::Result<()> {
    if !config.vcs.enabled {
        println!("version control integration is disabled");
        return Ok(());
    }
    let mut tracker = VcsTracker::with_git(&config.vcs);
    finish(tracker.set_root(dir))?;

    let Some(root) = tracker.repository_root() else {
        println!("{} is not inside a repository", dir.display());
        return Ok(());
    };
    println!("repository: {}", root.display());
    if let Some(Some(branch)) = tracker.current_branch().into_value() {
        println!("branch: {branch}");
    }
    for (path, status) in tracker.statuses().changed() {
        println!("{status:<9} {}", path.display());
    }
    Ok(())
}
