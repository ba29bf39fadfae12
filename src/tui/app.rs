//! Main TUI application.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - The prediction cycle state machine
//! - Background assessments via the worker

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::application::{
    AssessmentService, Cycle, CycleEvent, DefaultAssessmentService, ExportOutcome,
};
use crate::config::AppConfig;
use crate::domain::normalize;

use super::ui::{
    form::{render_vitals_form, wipe_input, VitalsFormState},
    processing::{render_processing, ProcessingState},
    render_disclaimer,
    result::{render_result, Notice, ResultState},
};
use super::worker::{AssessmentProgress, AssessmentWorker, AssessmentWorkerHandle};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Processing,
    Result,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,

    /// Runtime driving background assessments
    runtime: tokio::runtime::Runtime,
    service: Arc<DefaultAssessmentService>,

    cycle: Cycle,

    form_state: VitalsFormState,
    processing_state: ProcessingState,
    result_state: ResultState,

    /// Worker for the live submission, if any. Dropping it aborts the task.
    pending_worker: Option<AssessmentWorkerHandle>,
}

impl App {
    /// Create a new application from configuration.
    ///
    /// # Errors
    /// Returns error if the runtime or the HTTP client cannot be created.
    pub fn new(config: AppConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        let service = AssessmentService::from_config(&config)?;

        Ok(Self::with_dependencies(runtime, Arc::new(service)))
    }

    /// Create application with injected dependencies.
    #[must_use]
    pub fn with_dependencies(
        runtime: tokio::runtime::Runtime,
        service: Arc<DefaultAssessmentService>,
    ) -> Self {
        let expected = service.min_latency();
        Self {
            screen: Screen::Form,
            should_quit: false,
            runtime,
            service,
            cycle: Cycle::new(),
            form_state: VitalsFormState::default(),
            processing_state: ProcessingState::start(expected),
            result_state: ResultState::default(),
            pending_worker: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

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
            self.poll_worker();

            if self.screen == Screen::Processing {
                self.processing_state.tick();
            }

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::Form => render_vitals_form(f, chunks[0], &self.form_state),
                    Screen::Processing => {
                        render_processing(f, chunks[0], &self.processing_state)
                    }
                    Screen::Result => {
                        if let Some(report) = self.cycle.state().report() {
                            render_result(f, chunks[0], &report.view(), &self.result_state);
                        }
                    }
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(50))? {
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

    fn transition(&mut self, event: CycleEvent) {
        let cycle = std::mem::take(&mut self.cycle);
        self.cycle = cycle.apply(event);
    }

    /// Drain worker messages; results for stale submissions are dropped.
    fn poll_worker(&mut self) {
        let Some(worker) = self.pending_worker.as_ref() else {
            return;
        };
        // Checked before draining so a result sent right before exit is not missed.
        let finished = worker.is_finished();

        while let Some(progress) = self.pending_worker.as_ref().and_then(|w| w.try_recv()) {
            if let AssessmentProgress::Complete { submission, report } = progress {
                self.pending_worker = None;
                self.transition(CycleEvent::Resolved { submission, report });
                if self.cycle.state().report().is_some() {
                    self.result_state = ResultState::default();
                    self.screen = Screen::Result;
                }
                return;
            }
        }

        if finished {
            tracing::error!("Assessment task ended without a result");
            self.pending_worker = None;
            self.transition(CycleEvent::Reset);
            self.form_state.notice = Some("Assessment did not complete, please retry".to_string());
            self.screen = Screen::Form;
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Processing => self.handle_processing_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.form_state.clear_sensitive();
                self.transition(CycleEvent::Reset);
            }
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left => self.form_state.cycle(false),
            KeyCode::Right => self.form_state.cycle(true),
            KeyCode::Char('s') | KeyCode::Char('S') => self.form_state.load_sample_data(),
            KeyCode::Char(c) => self.form_state.input_char(c),
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Delete => self.form_state.clear_field(),
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn handle_processing_key(&mut self, key: KeyCode) {
        if key == KeyCode::Esc {
            tracing::info!("Assessment cancelled by user");
            self.pending_worker = None;
            self.transition(CycleEvent::Reset);
            self.screen = Screen::Form;
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('e') | KeyCode::Char('E') => self.export_report(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.new_assessment(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        self.transition(CycleEvent::Validate);

        let mut input = self.form_state.to_input();
        let normalized = normalize(&input);
        wipe_input(&mut input);

        match normalized {
            Err(errors) => {
                tracing::info!("Form rejected: {} field(s) invalid", errors.len());
                self.form_state.set_errors(&errors);
                self.transition(CycleEvent::Rejected(errors));
            }
            Ok(request) => {
                self.transition(CycleEvent::Submitted);
                let submission = self.cycle.generation();

                // Replacing an outstanding worker aborts it.
                self.pending_worker = Some(AssessmentWorker::spawn(
                    self.runtime.handle(),
                    Arc::clone(&self.service),
                    submission,
                    request,
                ));

                self.form_state.clear_sensitive();
                self.processing_state = ProcessingState::start(self.service.min_latency());
                self.screen = Screen::Processing;
            }
        }
    }

    fn export_report(&mut self) {
        let Some(report) = self.cycle.state().report() else {
            return;
        };

        let outcome = self.service.export(report);
        self.result_state.notice = Some(Notice {
            text: outcome.notice(),
            is_error: !matches!(outcome, ExportOutcome::Exported(_)),
        });
    }

    fn new_assessment(&mut self) {
        self.pending_worker = None;
        self.transition(CycleEvent::Reset);
        self.form_state = VitalsFormState::default();
        self.result_state = ResultState::default();
        self.screen = Screen::Form;
    }

    #[cfg(test)]
    fn state(&self) -> &crate::application::CycleState {
        self.cycle.state()
    }
}
