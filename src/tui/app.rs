//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::artifacts::{ArtifactResolver, RemoteFetcher};
use crate::adapters::forest::RandomForestClassifier;
use crate::application::{ModelContext, PredictionService};
use crate::config::AppConfig;
use crate::ports::Classifier;

use super::ui::{
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    PatientForm,
    Result,
}

/// Main application state
pub struct App<C: Classifier = RandomForestClassifier> {
    screen: Screen,
    should_quit: bool,
    service: PredictionService<C>,
    patient_form_state: PatientFormState,
    result_state: ResultState,
}

impl App<RandomForestClassifier> {
    /// Resolve the model artifacts and build the application.
    ///
    /// # Errors
    /// Refuses to start if either artifact cannot be fetched or loaded.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let fetcher = RemoteFetcher::new(config.download_timeout)
            .map_err(|e| anyhow!("Failed to build download client: {}", e))?;
        let resolver = ArtifactResolver::new(fetcher);

        let context = ModelContext::load(config, &resolver)
            .map_err(|e| anyhow!("Failed to load model: {}", e))?;

        Ok(Self::with_service(PredictionService::new(Arc::new(context))))
    }
}

impl<C: Classifier> App<C> {
    /// Create application with an injected prediction service.
    #[must_use]
    pub fn with_service(service: PredictionService<C>) -> Self {
        Self {
            screen: Screen::PatientForm,
            should_quit: false,
            service,
            patient_form_state: PatientFormState::default(),
            result_state: ResultState::default(),
        }
    }

    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        self.patient_form_state.clear_sensitive();
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::PatientForm => {
                        render_patient_form(f, chunks[0], &self.patient_form_state)
                    }
                    Screen::Result => render_result(f, chunks[0], &self.result_state),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Dispatch one key press.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::PatientForm => self.handle_patient_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.patient_form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.patient_form_state.next_field();
            }
            KeyCode::Left => {
                self.patient_form_state.cycle_choice(false);
            }
            KeyCode::Right => {
                self.patient_form_state.cycle_choice(true);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.patient_form_state.load_defaults();
            }
            KeyCode::Char(c) => {
                self.patient_form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.patient_form_state.delete_char();
            }
            KeyCode::Delete => {
                self.patient_form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_patient_form();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.patient_form_state.load_defaults();
                self.result_state = ResultState::Idle;
                self.screen = Screen::PatientForm;
            }
            KeyCode::Esc | KeyCode::Enter => {
                self.screen = Screen::PatientForm;
            }
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        let input = match self.patient_form_state.to_patient_input() {
            Ok(input) => input,
            Err(e) => {
                self.patient_form_state.error_message = Some(e);
                return;
            }
        };

        if let Err(errors) = input.validate() {
            self.patient_form_state.error_message = Some(errors.join(", "));
            return;
        }

        self.result_state = match self.service.predict(&input) {
            Ok(prediction) => ResultState::Complete { prediction },
            Err(e) => {
                tracing::error!("Prediction failed: {}", e);
                ResultState::Error {
                    message: e.to_string(),
                }
            }
        };
        self.screen = Screen::Result;
    }
}
