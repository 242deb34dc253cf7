//! Batch view: cohort file loading and per-record results.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::domain::{BatchOutcome, PatientRecord, PredictionResult};
use crate::tui::styles::Theme;

/// A parsed cohort file.
pub struct LoadedFile {
    pub name: String,
    pub records: Vec<PatientRecord>,
}

#[derive(Default)]
pub enum BatchPhase {
    /// Waiting for a path, or for [Enter] on a loaded file
    #[default]
    Ready,
    Analyzing { records: usize },
    Complete { outcome: BatchOutcome },
}

#[derive(Default)]
pub struct BatchState {
    pub path: String,
    pub file: Option<LoadedFile>,
    pub phase: BatchPhase,
    pub error_message: Option<String>,
}

impl BatchState {
    pub fn input_char(&mut self, c: char) {
        if self.file.is_none() && !c.is_control() {
            self.path.push(c);
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        if self.file.is_none() {
            self.path.pop();
        }
    }

    /// Drop the loaded file and any results.
    pub fn discard(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_analyzing(&self) -> bool {
        matches!(self.phase, BatchPhase::Analyzing { .. })
    }
}

pub fn render_batch(f: &mut Frame, area: Rect, state: &BatchState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // File
            Constraint::Length(3), // Summary
            Constraint::Min(0),    // Results
            Constraint::Length(3), // Footer
        ])
        .split(area);

    super::render_header(f, chunks[0], "Batch Analysis", "CSV / JSON cohorts, up to 100 patients");
    render_file_line(f, chunks[1], state);
    render_summary(f, chunks[2], state);
    render_results(f, chunks[3], state);

    let footer = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", Theme::danger()),
            Span::styled(err.clone(), Theme::danger()),
        ])
    } else if state.file.is_some() {
        super::key_hints(&[("Enter", "Analyze"), ("Del", "Discard File"), ("Esc", "Dashboard")])
    } else {
        super::key_hints(&[("Enter", "Load File"), ("Esc", "Dashboard")])
    };
    super::render_footer(f, chunks[4], footer);
}

fn render_file_line(f: &mut Frame, area: Rect, state: &BatchState) {
    let line = match &state.file {
        Some(file) => Line::from(vec![
            Span::styled(" File: ", Theme::text_secondary()),
            Span::styled(file.name.as_str(), Theme::text()),
            Span::styled(format!("  ({} records)", file.records.len()), Theme::text_muted()),
        ]),
        None if state.path.is_empty() => Line::from(vec![
            Span::styled(" Path: ", Theme::text_secondary()),
            Span::styled("type a .csv or .json path", Theme::text_muted()),
            Span::styled("▌", Theme::cursor()),
        ]),
        None => Line::from(vec![
            Span::styled(" Path: ", Theme::text_secondary()),
            Span::styled(state.path.as_str(), Theme::text()),
            Span::styled("▌", Theme::cursor()),
        ]),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_summary(f: &mut Frame, area: Rect, state: &BatchState) {
    let line = match &state.phase {
        BatchPhase::Ready => Line::from(Span::styled(" No results yet", Theme::text_muted())),
        BatchPhase::Analyzing { records } => Line::from(Span::styled(
            format!(" Analyzing {records} patients..."),
            Theme::info(),
        )),
        BatchPhase::Complete { outcome } => {
            let s = outcome.summary();
            Line::from(vec![
                Span::styled(" Low: ", Theme::text_secondary()),
                Span::styled(s.low.to_string(), Theme::success()),
                Span::styled("  Medium: ", Theme::text_secondary()),
                Span::styled(s.medium.to_string(), Theme::warning()),
                Span::styled("  Critical: ", Theme::text_secondary()),
                Span::styled(s.critical.to_string(), Theme::danger()),
                Span::styled("  Failed: ", Theme::text_secondary()),
                Span::styled(s.failed.to_string(), Theme::text_muted()),
                Span::styled("  Defaulted: ", Theme::text_secondary()),
                Span::styled(s.defaulted.to_string(), Theme::text_muted()),
                Span::styled("  Intervention cost: ", Theme::text_secondary()),
                Span::styled(format!("${:.2}", s.total_intervention_cost), Theme::text()),
            ])
        }
    };

    let block = Block::default()
        .title(Span::styled(" Summary ", Theme::subtitle()))
        .borders(Borders::ALL)
        .border_style(Theme::border());
    f.render_widget(Paragraph::new(line).block(block), area);
}

/// Patient ID, starred when any field fell back to a default.
fn patient_cell(prediction: &PredictionResult) -> String {
    if prediction.fallbacks.is_empty() {
        prediction.patient_id.clone()
    } else {
        format!("{}*", prediction.patient_id)
    }
}

fn render_results(f: &mut Frame, area: Rect, state: &BatchState) {
    let block = Block::default()
        .title(Span::styled(" Results ", Theme::subtitle()))
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let BatchPhase::Complete { outcome } = &state.phase else {
        f.render_widget(block, area);
        return;
    };

    let header = Row::new(["#", "Patient", "Risk", "Probability", "Action"]).style(Theme::subtitle());

    let rows = outcome.results.iter().enumerate().map(|(i, result)| match result {
        Ok(p) => Row::new(vec![
            Cell::from((i + 1).to_string()),
            Cell::from(patient_cell(p)),
            Cell::from(p.risk_level.to_string()).style(Theme::risk_level(p.risk_level)),
            Cell::from(format!("{:.1}%", p.dropout_probability * 100.0)),
            Cell::from(p.recommended_action.clone()),
        ]),
        Err(e) => Row::new(vec![
            Cell::from((i + 1).to_string()),
            Cell::from("-"),
            Cell::from("FAILED").style(Theme::danger()),
            Cell::from("-"),
            Cell::from(e.to_string()).style(Theme::text_muted()),
        ]),
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}
