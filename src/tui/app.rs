//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Background predictions and health polling on a tokio runtime

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
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
use tokio::runtime::Runtime;

use crate::adapters::batch_file::load_batch_file;
use crate::adapters::ReqwestTransport;
use crate::application::{ApiClient, HealthMonitor, HealthMonitorHandle, PredictionService};
use crate::config::AppConfig;
use crate::domain::PLATFORM_STATS;

use super::ui::{
    batch::{render_batch, BatchPhase, BatchState, LoadedFile},
    dashboard::{render_dashboard, DashboardState},
    metrics::render_metrics,
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    result::{render_result, ResultState},
};
use super::worker::{PredictionWorker, PredictionWorkerHandle, WorkerEvent};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    PatientForm,
    Result,
    Batch,
    Metrics,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,

    /// Runtime for network I/O; the draw loop stays on the calling thread
    runtime: Runtime,
    service: PredictionService<ReqwestTransport>,
    health: HealthMonitorHandle,

    dashboard_state: DashboardState,
    patient_form_state: PatientFormState,
    result_state: ResultState,
    batch_state: BatchState,

    single_job: Option<PredictionWorkerHandle>,
    batch_job: Option<PredictionWorkerHandle>,
}

impl App {
    /// Build the runtime, HTTP client and services from `config`.
    ///
    /// # Errors
    /// Returns error if the runtime or HTTP client cannot be created.
    pub fn new(config: AppConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("trialguard-io")
            .build()?;

        let transport = ReqwestTransport::new(config.timeout)?;
        let client = Arc::new(ApiClient::from_config(transport, &config));
        let service = PredictionService::new(client);

        tracing::info!(base = ?config.api_base, "Prediction backend configured");

        let health = HealthMonitor::spawn(runtime.handle(), service.clone(), config.health_interval);

        Ok(Self {
            screen: Screen::Dashboard,
            should_quit: false,
            runtime,
            service,
            health,
            dashboard_state: DashboardState::default(),
            patient_form_state: PatientFormState::default(),
            result_state: ResultState::default(),
            batch_state: BatchState::default(),
            single_job: None,
            batch_job: None,
        })
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
            self.poll_health();
            self.poll_workers();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                let content_area = chunks[0];
                let model = self.service.model_info();

                match self.screen {
                    Screen::Dashboard => {
                        render_dashboard(f, content_area, &self.dashboard_state, model, &PLATFORM_STATS)
                    }
                    Screen::PatientForm => {
                        render_patient_form(f, content_area, &self.patient_form_state)
                    }
                    Screen::Result => render_result(f, content_area, &self.result_state),
                    Screen::Batch => render_batch(f, content_area, &self.batch_state),
                    Screen::Metrics => render_metrics(f, content_area, model),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            // Short poll to stay responsive
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

    fn poll_health(&mut self) {
        if let Some(report) = self.health.latest() {
            self.dashboard_state.health = Some(report);
            self.dashboard_state.refreshing = false;
        }
    }

    fn poll_workers(&mut self) {
        while let Some(event) = self.single_job.as_ref().and_then(|job| job.try_recv()) {
            match event {
                WorkerEvent::Started { .. } => self.result_state = ResultState::Pending,
                WorkerEvent::Single(Ok(prediction)) => {
                    self.result_state = ResultState::Complete { prediction };
                    self.single_job = None;
                }
                WorkerEvent::Single(Err(e)) => {
                    self.result_state = ResultState::Error {
                        message: e.to_string(),
                    };
                    self.single_job = None;
                }
                WorkerEvent::Batch(_) => {}
            }
        }

        while let Some(event) = self.batch_job.as_ref().and_then(|job| job.try_recv()) {
            match event {
                WorkerEvent::Started { records } => {
                    self.batch_state.phase = BatchPhase::Analyzing { records };
                }
                WorkerEvent::Batch(Ok(outcome)) => {
                    self.batch_state.phase = BatchPhase::Complete { outcome };
                    self.batch_job = None;
                }
                WorkerEvent::Batch(Err(e)) => {
                    self.batch_state.phase = BatchPhase::Ready;
                    self.batch_state.error_message = Some(e.to_string());
                    self.batch_job = None;
                }
                WorkerEvent::Single(_) => {}
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::PatientForm => self.handle_patient_form_key(key),
            Screen::Result => self.handle_result_key(key),
            Screen::Batch => self.handle_batch_key(key),
            Screen::Metrics => {
                if key == KeyCode::Esc {
                    self.screen = Screen::Dashboard;
                }
            }
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.patient_form_state = PatientFormState::default();
                self.screen = Screen::PatientForm;
            }
            KeyCode::Char('b') | KeyCode::Char('B') => self.screen = Screen::Batch,
            KeyCode::Char('m') | KeyCode::Char('M') => self.screen = Screen::Metrics,
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.health.refresh();
                self.dashboard_state.refreshing = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        let form = &mut self.patient_form_state;
        match key {
            KeyCode::Esc => self.screen = Screen::Dashboard,
            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Left => form.cycle_choice(false),
            KeyCode::Right => form.cycle_choice(true),
            KeyCode::F(2) => form.load_sample_data(),
            KeyCode::Char(c) => form.input_char(c),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Delete => form.clear_field(),
            KeyCode::Enter => self.submit_patient_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match &self.result_state {
            ResultState::Complete { .. } => match key {
                KeyCode::Enter | KeyCode::Esc => self.screen = Screen::Dashboard,
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.patient_form_state = PatientFormState::default();
                    self.screen = Screen::PatientForm;
                }
                _ => {}
            },
            ResultState::Error { .. } => match key {
                KeyCode::Enter => self.screen = Screen::PatientForm,
                KeyCode::Esc => self.screen = Screen::Dashboard,
                _ => {}
            },
            ResultState::Idle => {
                if key == KeyCode::Esc {
                    self.screen = Screen::Dashboard;
                }
            }
            ResultState::Pending => {}
        }
    }

    fn handle_batch_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.screen = Screen::Dashboard,
            KeyCode::Char(c) => self.batch_state.input_char(c),
            KeyCode::Backspace => self.batch_state.delete_char(),
            KeyCode::Delete if !self.batch_state.is_analyzing() => self.batch_state.discard(),
            KeyCode::Enter if !self.batch_state.is_analyzing() => {
                if self.batch_state.file.is_some() {
                    self.start_batch();
                } else {
                    self.load_batch();
                }
            }
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        match self.patient_form_state.to_record() {
            Ok(record) => {
                self.screen = Screen::Result;
                self.result_state = ResultState::Pending;

                let job = PredictionWorker::spawn_single(
                    self.runtime.handle(),
                    self.service.clone(),
                    record,
                );
                self.single_job = Some(job);

                // Typed values have been moved into the job.
                self.patient_form_state.clear_sensitive();
            }
            Err(e) => {
                self.patient_form_state.error_message = Some(e);
            }
        }
    }

    fn load_batch(&mut self) {
        let path = self.batch_state.path.trim().to_string();
        if path.is_empty() {
            return;
        }

        match load_batch_file(Path::new(&path)) {
            Ok(records) => {
                let name = Path::new(&path)
                    .file_name()
                    .map_or_else(|| path.clone(), |n| n.to_string_lossy().into_owned());
                self.batch_state.file = Some(LoadedFile { name, records });
                self.batch_state.phase = BatchPhase::Ready;
                self.batch_state.error_message = None;
            }
            Err(e) => {
                tracing::warn!("Failed to load batch file: {}", e);
                self.batch_state.error_message = Some(e.to_string());
            }
        }
    }

    fn start_batch(&mut self) {
        let Some(file) = &self.batch_state.file else {
            return;
        };

        self.batch_state.error_message = None;
        self.batch_state.phase = BatchPhase::Analyzing {
            records: file.records.len(),
        };

        let job = PredictionWorker::spawn_batch(
            self.runtime.handle(),
            self.service.clone(),
            file.records.clone(),
        );
        self.batch_job = Some(job);
    }
}
