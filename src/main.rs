use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use clap::Parser;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod company;
mod controller;
mod debounce;
mod domain;
mod inputter;
mod model;
mod pagination;
mod pipeline;
mod source;
mod table;
mod ui;

use controller::Controller;
use domain::{DEFAULT_SOURCE, DirConfig, DirError};
use model::{Model, Status};
use source::{Loader, source_for};
use ui::TableUI;

/// Browse a directory of companies in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file or http(s) url with the company list
    #[arg(default_value = DEFAULT_SOURCE)]
    source: String,

    /// Write logs to this file, filtered by RUST_LOG
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Milliseconds to wait for terminal events per loop
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(args.log_file.as_ref()) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let cfg = DirConfig::default()
        .with_source(args.source)
        .with_event_poll_time(args.poll_ms);

    let result = run(&cfg);
    let _ = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<(), DirError> {
    // The terminal belongs to the ui, so only log when a file was given
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(cfg: &DirConfig) -> Result<(), DirError> {
    info!("Starting with {cfg:?}");
    let loader = Loader::spawn(source_for(&cfg.source));
    let mut model = Model::init(cfg, loader);
    let mut ui = TableUI::new();
    let controller = Controller::new(cfg);

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;

    while model.status != Status::Quitting {
        terminal.draw(|f| ui.draw(&model, f))?;

        // Also called without a message so the loader and the debounced search advance
        let message = controller.handle_event(&model, ui.hits())?;
        model.update(message, Instant::now())?;
    }

    info!("Bye");
    Ok(())
}
