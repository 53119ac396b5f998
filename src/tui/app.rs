//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Synchronous screening via the service

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::application::{ScreeningError, ScreeningService};
use crate::domain::Screening;
use crate::ports::Classifier;

use super::ui::{
    form::{render_form, ScreeningForm},
    render_disclaimer,
    result::render_result,
};

/// Current screen/view in the application
#[derive(Debug, Clone)]
pub enum Screen {
    Form,
    Result(Screening),
}

/// Main application state
pub struct App<C>
where
    C: Classifier,
{
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Screening service, shared with any other front-end
    service: Arc<ScreeningService<C>>,

    /// Patient form state
    form: ScreeningForm,
}

impl<C> App<C>
where
    C: Classifier,
{
    /// Create the application over a ready screening service.
    ///
    /// Artifact loading happens in `main` (Composition Root pattern); by the
    /// time an `App` exists the schema and model are valid and immutable.
    #[must_use]
    pub fn new(service: Arc<ScreeningService<C>>) -> Self {
        let form = ScreeningForm::from_schema(service.schema());
        Self {
            screen: Screen::Form,
            should_quit: false,
            service,
            form,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            // Draw current screen, keeping the disclaimer bar visible on all of them.
            terminal.draw(|f| {
                let area = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(area);

                match &self.screen {
                    Screen::Form => render_form(f, chunks[0], &self.form),
                    Screen::Result(screening) => render_result(f, chunks[0], screening),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match &self.screen {
            Screen::Form => self.handle_form_key(key, modifiers),
            Screen::Result(_) => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('l') && modifiers.contains(KeyModifiers::CONTROL) {
            self.form.clear_sensitive();
            return;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Up => {
                self.form.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form.next_field();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.form.input_char(c);
            }
            KeyCode::Backspace => {
                self.form.delete_char();
            }
            KeyCode::Delete => {
                self.form.clear_field();
            }
            KeyCode::Enter => {
                self.submit();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {
                // Any other key starts a fresh screening.
                self.form = ScreeningForm::from_schema(self.service.schema());
                self.screen = Screen::Form;
            }
        }
    }

    fn submit(&mut self) {
        let raw = self.form.to_raw_input();

        // Human-paced and sub-millisecond, so inference runs inline.
        match self.service.screen(&raw) {
            Ok(screening) => {
                // Clear plaintext buffers from the UI immediately.
                self.form.clear_sensitive();
                self.screen = Screen::Result(screening);
            }
            Err(ScreeningError::Input(input)) => {
                self.form.focus_feature(input.feature());
                self.form.error_message = Some(input.to_string());
            }
            Err(err @ ScreeningError::Inference(_)) => {
                self.form.error_message = Some(err.to_string());
            }
        }
    }
}
