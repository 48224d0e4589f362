mod app;
mod cli;
mod config;
mod constants;
mod infra;
mod logging;
mod state;
mod ui;

use std::io;
use std::process::ExitCode;
use std::sync::mpsc;

use clap::Parser;
use crossterm::{
    ExecutableCommand,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::{error, info};

use app::controller::StreamController;
use app::headless::{HeadlessError, run_once};
use app::{App, ChatShell};
use cli::Cli;
use constants::BASE_URL_ENV;
use infra::client::{HttpTransport, StreamMessage};
use state::StreamStatus;

fn main() -> io::Result<ExitCode> {
    let cli = Cli::parse();

    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let config = match cli.resolve_config(std::env::var(BASE_URL_ENV).ok()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("askstream: {err}");
            return Ok(ExitCode::from(2));
        }
    };

    let _log_guard = logging::init(&config)?;
    info!(base_url = %config.base_url, "starting");

    let transport = HttpTransport::new(&config).map_err(io::Error::other)?;
    let (tx, rx) = mpsc::channel::<StreamMessage>();
    let mut shell = ChatShell::new(StreamController::new(Box::new(transport), tx));

    if let Some(query) = cli.query.as_deref() {
        return run_headless(&mut shell, &rx, query);
    }

    // Panic hook: restore the terminal before the default hook prints,
    // otherwise raw mode and the alternate screen swallow the message.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(DisableBracketedPaste);
        let _ = io::stdout().execute(LeaveAlternateScreen);
        error!(%info, "panic");
        default_hook(info);
    }));

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    io::stdout().execute(EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut app = App::new(shell, config.title.clone());
    let result = app.run(&mut terminal, rx);

    // Cleanup
    disable_raw_mode()?;
    io::stdout().execute(DisableBracketedPaste)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|()| ExitCode::SUCCESS)
}

fn run_headless(shell: &mut ChatShell, rx: &mpsc::Receiver<StreamMessage>, query: &str) -> io::Result<ExitCode> {
    let mut stdout = io::stdout().lock();
    match run_once(shell, rx, query, &mut stdout) {
        Ok(StreamStatus::Done) => Ok(ExitCode::SUCCESS),
        Ok(StreamStatus::Failed(message)) => {
            eprintln!("askstream: {message}");
            Ok(ExitCode::FAILURE)
        }
        Ok(status) => {
            eprintln!("askstream: stream ended as {status:?}");
            Ok(ExitCode::FAILURE)
        }
        Err(HeadlessError::Query(err)) => {
            eprintln!("askstream: {err}");
            Ok(ExitCode::from(2))
        }
        Err(HeadlessError::Io(err)) => Err(err),
    }
}
