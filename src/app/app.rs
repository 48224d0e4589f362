use std::io;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event;
use ratatui::prelude::*;
use tracing::{debug, info};

use super::actions::{Action, ActionResult, apply_action};
use super::events::handle_event;
use super::shell::ChatShell;
use crate::constants::{EVENT_POLL_MS, RENDER_THROTTLE_MS, SPINNER_INTERVAL_MS};
use crate::infra::client::StreamMessage;
use crate::state::State;
use crate::ui;

pub struct App {
    pub state: State,
    shell: ChatShell,
    title: String,
    /// Last render time for throttling
    last_render: Instant,
    /// Last spinner animation update time
    last_spinner: Instant,
}

impl App {
    pub fn new(shell: ChatShell, title: String) -> Self {
        let now = Instant::now();
        Self { state: State::default(), shell, title, last_render: now, last_spinner: now }
    }

    pub fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        rx: Receiver<StreamMessage>,
    ) -> io::Result<()> {
        self.draw(terminal)?;

        loop {
            // Input first for minimal latency
            if event::poll(Duration::ZERO)? {
                let evt = event::read()?;
                let Some(action) = handle_event(&evt) else {
                    info!("quit requested");
                    break;
                };
                self.handle_action(action);
                if self.state.dirty {
                    self.draw(terminal)?;
                }
            }

            while let Ok(msg) = rx.try_recv() {
                if self.shell.handle_message(msg) {
                    self.state.dirty = true;
                }
            }

            self.update_spinner();

            if self.state.dirty && self.last_render.elapsed() >= Duration::from_millis(RENDER_THROTTLE_MS) {
                self.draw(terminal)?;
            }

            // Sleep longer when idle
            let poll_ms = if self.shell.stream().in_progress() || self.state.dirty { EVENT_POLL_MS } else { 50 };
            let _ = event::poll(Duration::from_millis(poll_ms))?;
        }

        self.shell.shutdown();
        Ok(())
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        let (state, shell, title) = (&mut self.state, &self.shell, self.title.as_str());
        terminal.draw(|frame| ui::render(frame, state, shell, title))?;
        self.state.dirty = false;
        self.last_render = Instant::now();
        Ok(())
    }

    fn handle_action(&mut self, action: Action) {
        match apply_action(&mut self.state, action) {
            ActionResult::Nothing => {}
            ActionResult::Submit(query) => {
                if let Err(err) = self.shell.submit(&query) {
                    debug!(%err, "query rejected");
                }
            }
            ActionResult::NewSession => self.shell.new_session(),
            ActionResult::Stop => {
                self.shell.stop();
            }
        }
        self.state.dirty = true;
    }

    fn update_spinner(&mut self) {
        if !self.shell.stream().in_progress() {
            return;
        }
        if self.last_spinner.elapsed() >= Duration::from_millis(SPINNER_INTERVAL_MS) {
            self.state.spinner_frame = self.state.spinner_frame.wrapping_add(1);
            self.last_spinner = Instant::now();
            self.state.dirty = true;
        }
    }
}
