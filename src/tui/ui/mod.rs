//! UI module: View components for the TUI.

pub mod batch;
pub mod dashboard;
pub mod metrics;
pub mod patient;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::Theme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "DISCLAIMER: Dropout risk scores are statistical estimates and do not replace the judgment of the trial team.",
            Theme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            "The model favors recall over precision: expect false positives.",
            Theme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Theme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// One-line screen header: title plus a muted subtitle.
pub(crate) fn render_header(f: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", Theme::text()),
        Span::styled(title.to_string(), Theme::title()),
        Span::styled(" │ ", Theme::text_muted()),
        Span::styled(subtitle.to_string(), Theme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Theme::border()),
    );

    f.render_widget(header, area);
}

/// Footer line of `[key] description` pairs.
pub(crate) fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let spans: Vec<Span<'static>> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!("[{key}] "), Theme::key_hint()),
                Span::styled(format!("{desc} "), Theme::key_desc()),
            ]
        })
        .collect();
    Line::from(spans)
}

pub(crate) fn render_footer(f: &mut Frame, area: Rect, line: Line<'static>) {
    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Theme::border()),
    );
    f.render_widget(footer, area);
}
