use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use taskboard::celebration::Celebration;
use taskboard::clock::SystemClock;
use taskboard::config::Config;
use taskboard::i18n::{Language, Localizer};
use taskboard::storage::JsonFileStore;
use taskboard::terminal::TerminalSession;
use taskboard::ui::{run_app, App};
use taskboard::KanbanBoard;

/// Kanban board for the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON config file; missing keys use defaults.
    #[arg(long, default_value = "taskboard.json")]
    config: PathBuf,

    /// Board data file.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Display language (ja, en, zh).
    #[arg(long)]
    language: Option<Language>,

    /// How long the completion message stays up.
    #[arg(long)]
    celebration_secs: Option<u64>,

    /// Where diagnostics go; the terminal itself is taken by the board.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = Config::load_or_default(&self.config)?;
        if let Some(data) = self.data {
            config.data_file = data;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(secs) = self.celebration_secs {
            config.celebration_secs = secs;
        }
        if let Some(log_file) = self.log_file {
            config.log_file = log_file;
        }
        Ok(config)
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;
    init_logging(&config.log_file)?;
    info!("taskboard starting with {:?}", config);

    let store = JsonFileStore::open(&config.data_file)
        .with_context(|| format!("failed to open board {}", config.data_file.display()))?;
    let celebration = Celebration::from_secs(config.celebration_secs);
    let board = KanbanBoard::load(store, SystemClock, celebration)?;
    let mut app = App::new(board, Localizer::new(config.language), config.dark_mode);

    let result = {
        // Dropping the session restores the terminal, including when setup fails.
        let _session = TerminalSession::enter(io::stdout())?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        run_app(&mut terminal, &mut app)
    };

    info!("taskboard exiting");
    result.context("board event loop failed")
}
