//! twinpane - a dual-pane file manager for the terminal.
//!
//! Usage:
//!   twinpane [PATH]          Launch the TUI with the left pane at PATH
//!   twinpane ls [PATH]       Print a directory listing
//!   twinpane config          Show the settings file and effective values
//!   twinpane config --init   Write the effective values to the settings file
//!   twinpane --help          Show help
//!
//! Paths are logical: `/` is the configured root directory.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use twinpane_core::{ItemKind, SortKey, SortOrder};
use twinpane_ops::{HostRoot, ListRequest, ListResponse, LocalDirectoryService};
use twinpane_tui::Settings;

#[derive(Parser)]
#[command(
    name = "twinpane",
    version,
    about = "A dual-pane file manager for the terminal",
    long_about = "twinpane shows two directory panes side by side.\n\n\
                  Launch the interactive TUI by running `twinpane [PATH]`, or use \
                  subcommands for quick operations."
)]
struct Cli {
    /// Logical path for the left pane (defaults to where it was left)
    path: Option<String>,

    /// Host directory served as `/` (overrides settings.toml)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List a directory the way a pane would
    Ls {
        /// Logical path to list
        #[arg(default_value = "/")]
        path: String,

        /// Include dotfiles
        #[arg(short, long)]
        all: bool,

        /// Sort column: name, extension, size, modified or created
        #[arg(short, long, default_value = "name")]
        sort: SortKey,

        /// Sort descending
        #[arg(short, long)]
        desc: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the settings file path and effective settings
    Config {
        /// Write the effective settings to the settings file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let mut settings = Settings::load();
    if let Some(root) = cli.root {
        settings.root = root.canonicalize().context("Invalid root")?;
    }

    match cli.command {
        Some(Command::Ls {
            path,
            all,
            sort,
            desc,
            format,
        }) => {
            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
            run_ls(&settings, path, all, sort, order, format)?;
        }
        Some(Command::Config { init }) => run_config(&settings, init)?,
        None => {
            init_logging();
            tracing::info!(root = %settings.root.display(), "starting twinpane");
            twinpane_tui::run(settings, cli.path)?;
        }
    }

    Ok(())
}

/// Log to a file under the data directory; the terminal belongs to the TUI.
///
/// The filter comes from `TWINPANE_LOG` and defaults to `info`.
fn init_logging() {
    let Some(dir) = dirs::data_local_dir().map(|d| d.join("twinpane")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("twinpane.log")) else {
        return;
    };

    let filter = EnvFilter::try_from_env("TWINPANE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();
}

/// Print a listing.
fn run_ls(
    settings: &Settings,
    path: String,
    show_dotfiles: bool,
    sort_by: SortKey,
    order: SortOrder,
    format: OutputFormat,
) -> Result<()> {
    let service = LocalDirectoryService::new(HostRoot::new(settings.root.clone()));
    let request = ListRequest {
        path,
        show_dotfiles,
        sort_by,
        order,
    };

    match service.list_blocking(&request) {
        ListResponse::Directory {
            current_path,
            items,
        } => match format {
            OutputFormat::Text => {
                println!("{current_path}");
                println!("{}", "─".repeat(70));
                for item in &items {
                    let name = match item.kind {
                        ItemKind::Directory => format!("{}/", item.name),
                        _ => item.name.to_string(),
                    };
                    println!(
                        " {:<40} {:>10}  {}",
                        truncate(&name, 40),
                        item.size,
                        item.modified
                    );
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
        },
        ListResponse::IsFile { current_path } => {
            bail!("{current_path} is a file");
        }
        ListResponse::Error(message) => bail!(message),
    }

    Ok(())
}

/// Print where settings live and what is in effect, optionally saving them.
fn run_config(settings: &Settings, init: bool) -> Result<()> {
    if init {
        settings.save().context("Failed to write settings")?;
    }
    match Settings::config_path() {
        Some(path) => {
            let state = if path.exists() { "" } else { " (not created)" };
            println!("# {}{state}", path.display());
        }
        None => println!("# no config directory"),
    }
    print!(
        "{}",
        toml::to_string_pretty(settings).context("Failed to serialize settings")?
    );
    Ok(())
}

/// Truncate a string to fit within a given width.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}
