//! Model metrics view.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, LineGauge, Paragraph},
    Frame,
};

use crate::domain::ModelInfo;
use crate::tui::styles::Theme;

pub fn render_metrics(f: &mut Frame, area: Rect, model: &ModelInfo) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    super::render_header(
        f,
        chunks[0],
        "Model Metrics",
        &format!("{} v{}", model.name, model.version),
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .margin(1)
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(columns[0]);

    render_performance(f, left[0], model);
    render_thresholds(f, left[1], model);
    render_feature_importance(f, columns[1], model);

    super::render_footer(f, chunks[2], super::key_hints(&[("Esc", "Dashboard")]));
}

fn metric_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<12}"), Theme::text_secondary()),
        Span::styled(value, Theme::text()),
    ])
}

fn render_performance(f: &mut Frame, area: Rect, model: &ModelInfo) {
    let m = &model.metrics;
    let mut lines = vec![
        metric_line("Algorithm", model.algorithm.to_string()),
        metric_line("Trained", model.training_date.to_string()),
        metric_line("Recall", format!("{:.2}", m.recall)),
        metric_line("Precision", format!("{:.2}", m.precision)),
        metric_line("F1", format!("{:.2}", m.f1_score)),
        metric_line("ROC-AUC", format!("{:.2}", m.roc_auc)),
    ];
    if let Some(accuracy) = m.accuracy {
        lines.push(metric_line("Accuracy", format!("{accuracy:.2}")));
    }

    let block = Block::default()
        .title(Span::styled(" Performance ", Theme::subtitle()))
        .borders(Borders::ALL)
        .border_style(Theme::border());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_thresholds(f: &mut Frame, area: Rect, model: &ModelInfo) {
    let t = model.thresholds;
    let lines = vec![
        Line::from(vec![
            Span::styled("  LOW      ", Theme::success()),
            Span::styled(format!("p < {:.2}", t.low), Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("  MEDIUM   ", Theme::warning()),
            Span::styled(format!("{:.2} ≤ p < {:.2}", t.low, t.medium), Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("  CRITICAL ", Theme::danger()),
            Span::styled(format!("{:.2} ≤ p ≤ {:.2}", t.medium, t.critical), Theme::text()),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(" Risk Thresholds ", Theme::subtitle()))
        .borders(Borders::ALL)
        .border_style(Theme::border());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_feature_importance(f: &mut Frame, area: Rect, model: &ModelInfo) {
    let block = Block::default()
        .title(Span::styled(" Feature Importance ", Theme::subtitle()))
        .borders(Borders::ALL)
        .border_style(Theme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            model
                .feature_importance
                .iter()
                .map(|_| Constraint::Length(1))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .margin(1)
        .split(inner);

    // Bars are scaled to the most important feature.
    let top = model
        .feature_importance
        .first()
        .map_or(1.0, |fi| fi.importance)
        .max(f64::EPSILON);

    for (row, fi) in rows.iter().zip(model.feature_importance) {
        let gauge = LineGauge::default()
            .filled_style(Theme::focused())
            .unfilled_style(Theme::text_muted())
            .label(format!("{:<22} {:>3.0}%", fi.feature, fi.importance * 100.0))
            .ratio((fi.importance / top).clamp(0.0, 1.0));
        f.render_widget(gauge, *row);
    }
}
