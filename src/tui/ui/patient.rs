//! Patient data input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::PatientRecord;
use crate::tui::styles::Theme;

const GENDER_OPTIONS: &[&str] = &["male", "female", "other"];
const PHASE_OPTIONS: &[&str] = &["phase_1", "phase_2", "phase_3", "phase_4"];
const GROUP_OPTIONS: &[&str] = &["control", "treatment_a", "treatment_b", "placebo"];

/// How a field takes input.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Free text
    Text,
    /// Decimal number; `optional` fields may be left blank
    Number { optional: bool },
    /// Fixed vocabulary cycled with left/right
    Choice {
        options: &'static [&'static str],
        index: usize,
    },
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub value: String,
    pub kind: FieldKind,
}

impl FormField {
    fn text(label: &'static str, hint: &'static str) -> Self {
        Self {
            label,
            hint,
            value: String::new(),
            kind: FieldKind::Text,
        }
    }

    fn number(label: &'static str, hint: &'static str, optional: bool) -> Self {
        Self {
            label,
            hint,
            value: String::new(),
            kind: FieldKind::Number { optional },
        }
    }

    fn choice(label: &'static str, options: &'static [&'static str]) -> Self {
        Self {
            label,
            hint: "[←→] to change",
            value: options[0].to_string(),
            kind: FieldKind::Choice { options, index: 0 },
        }
    }

    fn cycle(&mut self, forward: bool) {
        if let FieldKind::Choice { options, index } = &mut self.kind {
            let len = options.len();
            *index = if forward { (*index + 1) % len } else { (*index + len - 1) % len };
            self.value = options[*index].to_string();
        }
    }

    fn select(&mut self, option: &str) {
        if let FieldKind::Choice { options, index } = &mut self.kind {
            if let Some(pos) = options.iter().position(|o| *o == option) {
                *index = pos;
                self.value = option.to_string();
            }
        }
    }

    fn parse_number(&self) -> Result<Option<f64>, String> {
        let optional = matches!(self.kind, FieldKind::Number { optional: true });
        let raw = self.value.trim();
        if raw.is_empty() && optional {
            return Ok(None);
        }
        raw.parse::<f64>()
            .map(Some)
            .map_err(|_| format!("{}: Invalid number", self.label))
    }
}

// Field order; indexes used by `to_record`.
const PATIENT_ID: usize = 0;
const AGE: usize = 1;
const GENDER: usize = 2;
const TRIAL_PHASE: usize = 3;
const TREATMENT_GROUP: usize = 4;
const DAYS_IN_TRIAL: usize = 5;
const VISITS_COMPLETED: usize = 6;
const LAST_VISIT_DAY: usize = 7;
const ADVERSE_EVENTS: usize = 8;

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        Self {
            fields: vec![
                FormField::text("Patient ID", "e.g. PT-0042"),
                FormField::number("Age", "years (18-100)", false),
                FormField::choice("Gender", GENDER_OPTIONS),
                FormField::choice("Trial Phase", PHASE_OPTIONS),
                FormField::choice("Treatment Group", GROUP_OPTIONS),
                FormField::number("Days in Trial", "days (1-10000)", false),
                FormField::number("Visits Completed", "count (0-1000)", false),
                FormField::number("Last Visit Day", "optional, day of last visit", true),
                FormField::number("Adverse Events", "count (0-100)", false),
            ],
            selected_field: 0,
            error_message: None,
        }
    }
}

impl PatientFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Cycle a choice field; no-op on other fields.
    pub fn cycle_choice(&mut self, forward: bool) {
        self.fields[self.selected_field].cycle(forward);
        self.error_message = None;
    }

    /// Add a character to the current field
    pub fn input_char(&mut self, c: char) {
        let field = &mut self.fields[self.selected_field];
        let accepted = match field.kind {
            FieldKind::Text => !c.is_control(),
            FieldKind::Number { .. } => c.is_ascii_digit() || c == '.' || c == '-',
            FieldKind::Choice { .. } => false,
        };
        if accepted {
            field.value.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        let field = &mut self.fields[self.selected_field];
        if !matches!(field.kind, FieldKind::Choice { .. }) {
            field.value.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        let field = &mut self.fields[self.selected_field];
        if !matches!(field.kind, FieldKind::Choice { .. }) {
            field.value.clear();
        }
    }

    /// Wipe all field buffers and reset the form.
    ///
    /// Called as soon as a prediction is dispatched so typed patient data
    /// does not linger in UI state.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
        }
        *self = Self::default();
    }

    /// Build a raw patient record from the form.
    ///
    /// Only syntax is checked here; range clamping and vocabulary mapping
    /// happen in the request pipeline.
    pub fn to_record(&self) -> Result<PatientRecord, String> {
        let patient_id = self.fields[PATIENT_ID].value.trim();
        if patient_id.is_empty() {
            return Err("Patient ID: Required".to_string());
        }

        let required = |idx: usize| -> Result<f64, String> {
            let field = &self.fields[idx];
            field
                .parse_number()?
                .ok_or_else(|| format!("{}: Invalid number", field.label))
        };

        Ok(PatientRecord {
            patient_id: patient_id.to_string(),
            age: required(AGE)?,
            gender: self.fields[GENDER].value.clone(),
            trial_phase: self.fields[TRIAL_PHASE].value.clone(),
            treatment_group: self.fields[TREATMENT_GROUP].value.clone(),
            days_in_trial: required(DAYS_IN_TRIAL)?,
            visits_completed: required(VISITS_COMPLETED)?,
            last_visit_day: self.fields[LAST_VISIT_DAY].parse_number()?,
            adverse_events: required(ADVERSE_EVENTS)?,
        })
    }

    /// Load sample data (mid-trial patient with a recent visit gap)
    pub fn load_sample_data(&mut self) {
        let sample = [
            (PATIENT_ID, "PT-DEMO-001"),
            (AGE, "58"),
            (DAYS_IN_TRIAL, "90"),
            (VISITS_COMPLETED, "6"),
            (LAST_VISIT_DAY, "72"),
            (ADVERSE_EVENTS, "2"),
        ];
        for (idx, val) in sample {
            self.fields[idx].value = val.to_string();
        }
        self.fields[GENDER].select("female");
        self.fields[TRIAL_PHASE].select("phase_2");
        self.fields[TREATMENT_GROUP].select("treatment_a");
        self.error_message = None;
    }
}

/// Render the patient data input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    super::render_header(f, chunks[0], "Patient Assessment", "Dropout Risk Inputs");
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (Theme::border_focused(), Theme::focused())
        } else {
            (Theme::border(), Theme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        match field.kind {
            FieldKind::Choice { .. } => {
                spans.push(Span::styled("‹ ", Theme::text_muted()));
                spans.push(Span::styled(field.value.as_str(), Theme::text()));
                spans.push(Span::styled(" ›", Theme::text_muted()));
            }
            _ if field.value.is_empty() => {
                spans.push(Span::styled(field.hint, Theme::text_muted()));
            }
            _ => spans.push(Span::styled(field.value.as_str(), Theme::text())),
        }
        if is_selected && !matches!(field.kind, FieldKind::Choice { .. }) {
            spans.push(Span::styled("▌", Theme::cursor()));
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", Theme::danger()),
            Span::styled(err.clone(), Theme::danger()),
        ])
    } else {
        super::key_hints(&[
            ("↑↓", "Navigate"),
            ("←→", "Change option"),
            ("Enter", "Predict"),
            ("F2", "Sample Data"),
            ("Esc", "Cancel"),
        ])
    };

    super::render_footer(f, area, content);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_builds_record() {
        let mut form = PatientFormState::default();
        form.load_sample_data();

        let record = form.to_record().unwrap();
        assert_eq!(record.patient_id, "PT-DEMO-001");
        assert_eq!(record.gender, "female");
        assert_eq!(record.trial_phase, "phase_2");
        assert_eq!(record.treatment_group, "treatment_a");
        assert_eq!(record.age, 58.0);
        assert_eq!(record.last_visit_day, Some(72.0));
    }

    #[test]
    fn test_last_visit_day_is_optional() {
        let mut form = PatientFormState::default();
        form.load_sample_data();
        form.fields[LAST_VISIT_DAY].value.clear();

        assert_eq!(form.to_record().unwrap().last_visit_day, None);
    }

    #[test]
    fn test_missing_required_number_is_rejected() {
        let mut form = PatientFormState::default();
        form.load_sample_data();
        form.fields[AGE].value.clear();

        assert_eq!(form.to_record().unwrap_err(), "Age: Invalid number");
    }

    #[test]
    fn test_choice_fields_cycle_and_ignore_typing() {
        let mut form = PatientFormState::default();
        form.selected_field = TRIAL_PHASE;

        form.cycle_choice(false);
        assert_eq!(form.fields[TRIAL_PHASE].value, "phase_4");
        form.cycle_choice(true);
        form.cycle_choice(true);
        assert_eq!(form.fields[TRIAL_PHASE].value, "phase_2");

        form.input_char('x');
        form.delete_char();
        assert_eq!(form.fields[TRIAL_PHASE].value, "phase_2");
    }

    #[test]
    fn test_number_fields_filter_input() {
        let mut form = PatientFormState::default();
        form.selected_field = AGE;
        for c in "4a5.b".chars() {
            form.input_char(c);
        }
        assert_eq!(form.fields[AGE].value, "45.");
    }

    #[test]
    fn test_clear_sensitive_resets_form() {
        let mut form = PatientFormState::default();
        form.load_sample_data();
        form.selected_field = 4;
        form.clear_sensitive();

        assert!(form.fields[PATIENT_ID].value.is_empty());
        assert!(form.fields[AGE].value.is_empty());
        assert_eq!(form.fields[GENDER].value, "male");
        assert_eq!(form.selected_field, 0);
    }
}
