//! Single-patient prediction view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::{FieldFallback, PredictionResult};
use crate::tui::styles::Theme;

/// Prediction view state
#[derive(Debug, Default)]
pub enum ResultState {
    /// Nothing submitted
    #[default]
    Idle,
    /// Waiting for the backend
    Pending,
    Complete { prediction: PredictionResult },
    Error { message: String },
}

/// Render the prediction view
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    super::render_header(f, chunks[0], "Risk Assessment", "Remote Prediction");

    match state {
        ResultState::Idle => render_message(f, chunks[1], "Enter patient data to begin", false),
        ResultState::Pending => {
            render_message(f, chunks[1], "Requesting prediction from backend...", false)
        }
        ResultState::Complete { prediction } => render_prediction(f, chunks[1], prediction),
        ResultState::Error { message } => render_message(f, chunks[1], message, true),
    }

    let footer = match state {
        ResultState::Complete { .. } => super::key_hints(&[("Enter", "Dashboard"), ("N", "New Assessment")]),
        ResultState::Error { .. } => super::key_hints(&[("Enter", "Back to Form"), ("Esc", "Dashboard")]),
        _ => Line::from(Span::styled("Processing...", Theme::text_muted())),
    };
    super::render_footer(f, chunks[2], footer);
}

fn render_message(f: &mut Frame, area: Rect, message: &str, is_error: bool) {
    let (title, border) = if is_error {
        (Span::styled("! Error", Theme::danger()), Theme::danger())
    } else {
        (Span::raw(""), Theme::border())
    };

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(title),
        Line::from(""),
        Line::from(Span::styled(message, Theme::text())),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(border));

    f.render_widget(content, area);
}

fn render_prediction(f: &mut Frame, area: Rect, prediction: &PredictionResult) {
    let block = Block::default()
        .title(Span::styled(
            format!(" Patient {} ", prediction.patient_id),
            Theme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Risk level
            Constraint::Length(3), // Probability
            Constraint::Length(4), // Recommendation
            Constraint::Min(0),    // Model
        ])
        .margin(1)
        .split(inner);

    let risk_style = Theme::risk_level(prediction.risk_level);
    let risk = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} RISK", prediction.risk_level),
            risk_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            prediction.risk_level.description(),
            Theme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(risk, chunks[0]);

    let probability = if prediction.dropout_probability.is_finite() {
        prediction.dropout_probability.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Dropout Probability ", Theme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        )
        .gauge_style(risk_style)
        .ratio(probability)
        .label(format!("{:.1}%", probability * 100.0));
    f.render_widget(gauge, chunks[1]);

    let action = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Recommended action: ", Theme::text_secondary()),
            Span::styled(prediction.recommended_action.as_str(), Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Intervention cost: ", Theme::text_secondary()),
            Span::styled(format!("${:.2}", prediction.intervention_cost), Theme::text()),
        ]),
    ]);
    f.render_widget(action, chunks[2]);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Model: ", Theme::text_secondary()),
            Span::styled(
                prediction.model_used.as_deref().unwrap_or("unknown"),
                Theme::text_muted(),
            ),
        ]),
        Line::from(vec![
            Span::styled("Confidence (ROC-AUC): ", Theme::text_secondary()),
            Span::styled(
                prediction
                    .confidence
                    .map_or_else(|| "-".to_string(), |c| format!("{c:.2}")),
                Theme::text_muted(),
            ),
        ]),
    ];
    if let Some(defaults) = fallback_summary(&prediction.fallbacks) {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Defaults applied: ", Theme::warning()),
            Span::styled(defaults, Theme::text()),
        ]));
    }
    f.render_widget(Paragraph::new(lines), chunks[3]);
}

/// One-line list of substituted enum values, if any.
pub(crate) fn fallback_summary(fallbacks: &[FieldFallback]) -> Option<String> {
    if fallbacks.is_empty() {
        return None;
    }
    Some(
        fallbacks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_summary_lists_each_field() {
        assert_eq!(fallback_summary(&[]), None);

        let fallbacks = vec![
            FieldFallback {
                field: "gender",
                value: "unknown".to_string(),
                substituted: "Male",
            },
            FieldFallback {
                field: "trial_phase",
                value: "phase_9".to_string(),
                substituted: "Phase II",
            },
        ];
        assert_eq!(
            fallback_summary(&fallbacks).as_deref(),
            Some(r#"gender "unknown" -> Male, trial_phase "phase_9" -> Phase II"#)
        );
    }
}
