use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::{
    core::{
        event::{event_channel, EventReceiver},
        session::ConnectionSession,
    },
    domain::{
        config::ConnectionConfig,
        error::{MonitorError, MonitorResult},
    },
    infrastructure::{config::MonitorConfig, serial::PortRegistry, serial::SystemPortFactory},
};

use super::{state::AppState, ui::draw_ui};

/// The terminal frontend. Owns the session and drains its event channel on
/// the tick cadence, decoupling render pacing from reader pacing.
pub struct App {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    state: AppState,
    session: ConnectionSession,
    events: EventReceiver,
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(prefs: &MonitorConfig) -> MonitorResult<Self> {
        enable_raw_mode().map_err(|e| MonitorError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| MonitorError::Terminal(e.to_string()))?;
        let backend = CrosstermBackend::new(stdout);
        let terminal =
            Terminal::new(backend).map_err(|e| MonitorError::Terminal(e.to_string()))?;

        let (tx, rx) = event_channel();
        let session = ConnectionSession::new(Box::new(SystemPortFactory), tx);
        let state = AppState::new(prefs.default_port.clone(), prefs.default_baud);

        Ok(Self {
            terminal,
            state,
            session,
            events: rx,
            should_quit: false,
            tick_rate: Duration::from_millis(100),
        })
    }

    pub async fn run(&mut self) -> MonitorResult<()> {
        loop {
            if let Ok(true) = event::poll(self.tick_rate) {
                if let Ok(event) = event::read() {
                    match event {
                        Event::Key(key) => self.handle_key_event(key).await?,
                        Event::Resize(width, height) => {
                            self.state.terminal_size = (width, height);
                        }
                        _ => {}
                    }
                }
            }

            // Drain session events into the scrollback
            while let Ok(event) = self.events.try_recv() {
                self.state.push_event(&event);
            }
            self.state.connection = self.session.state().await;

            self.terminal
                .draw(|f| draw_ui(f, &mut self.state))
                .map_err(|e| MonitorError::Terminal(e.to_string()))?;

            if self.should_quit {
                self.session.close().await?;
                // Flush the teardown events so Close >< makes the log once
                // more before the screen is restored (cosmetic, but keeps the
                // final frame honest if the draw below is the last one).
                while let Ok(event) = self.events.try_recv() {
                    self.state.push_event(&event);
                }
                break;
            }
        }

        Ok(())
    }

    async fn handle_key_event(&mut self, key: KeyEvent) -> MonitorResult<()> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Enter => {
                let line = self.state.input.take();
                if line.starts_with(':') {
                    self.handle_command(&line[1..]).await?;
                } else if !line.trim().is_empty() {
                    self.send_line(line).await;
                }
            }
            KeyCode::Up => {
                if let Some(entry) = self.state.history.navigate_up() {
                    let entry = entry.to_string();
                    self.state.input.set_content(entry);
                }
            }
            KeyCode::Down => {
                if let Some(entry) = self.state.history.navigate_down() {
                    let entry = entry.to_string();
                    self.state.input.set_content(entry);
                }
            }
            KeyCode::Esc => {
                self.state.input.clear();
            }
            _ => {
                self.state.input.handle_key(key);
            }
        }
        Ok(())
    }

    async fn send_line(&mut self, line: String) {
        match self.session.send(&line).await {
            Ok(()) => {
                self.state.status_message = None;
            }
            Err(e) => {
                self.state.set_status_message(e.to_string());
            }
        }
        // Recorded regardless of the write outcome, like the entry box it
        // replaces: a failed send is still worth recalling.
        self.state.history.append(line);
    }

    async fn handle_command(&mut self, command: &str) -> MonitorResult<()> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        match parts.first() {
            Some(&"open") => {
                let port = match parts.get(1) {
                    Some(port) => port.to_string(),
                    None => match &self.state.port {
                        Some(port) => port.clone(),
                        None => {
                            self.state
                                .set_status_message("Usage: :open <port> [baud]");
                            return Ok(());
                        }
                    },
                };
                let baud = match parts.get(2) {
                    Some(raw) => match raw.parse::<u32>() {
                        Ok(baud) => baud,
                        Err(_) => {
                            self.state.set_status_message("Invalid baud rate");
                            return Ok(());
                        }
                    },
                    None => self.state.baud,
                };
                match self
                    .session
                    .open(ConnectionConfig::new(port.clone(), baud))
                    .await
                {
                    Ok(()) => {
                        self.state.port = Some(port);
                        self.state.baud = baud;
                        self.state.status_message = None;
                    }
                    Err(e) => self.state.set_status_message(e.to_string()),
                }
            }
            Some(&"close") => {
                self.session.close().await?;
                self.state.status_message = None;
            }
            Some(&"clear") => {
                self.state.clear_log();
            }
            Some(&"ports") => {
                let ports = PortRegistry::list();
                if ports.is_empty() {
                    self.state.push_notice("No serial ports found");
                } else {
                    for port in ports {
                        self.state.push_notice(port);
                    }
                }
            }
            Some(&"help") => {
                self.state.set_status_message(
                    ":open <port> [baud] | :close | :clear | :ports | :quit",
                );
            }
            Some(&"quit") | Some(&"q") => {
                self.should_quit = true;
            }
            Some(cmd) => {
                self.state
                    .set_status_message(format!("Unknown command: {}", cmd));
            }
            None => {}
        }
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
