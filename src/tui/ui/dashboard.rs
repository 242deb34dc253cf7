//! Dashboard view: Main overview screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::application::HealthReport;
use crate::domain::{ModelInfo, PlatformStats};
use crate::tui::styles::Theme;

/// Dashboard state for rendering.
#[derive(Default)]
pub struct DashboardState {
    /// Most recent health check, if one has completed
    pub health: Option<HealthReport>,
    /// A manual refresh was requested and has not reported yet
    pub refreshing: bool,
}

/// Render the main dashboard view.
pub fn render_dashboard(
    f: &mut Frame,
    area: Rect,
    state: &DashboardState,
    model: &ModelInfo,
    stats: &PlatformStats,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    super::render_header(f, chunks[0], "Trialguard", "Clinical Trial Dropout Risk");

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .margin(1)
        .split(columns[0]);

    render_api_status(f, left[0], state, model);
    render_quick_actions(f, left[1]);
    render_platform_stats(f, columns[1], stats);
}

fn render_api_status(f: &mut Frame, area: Rect, state: &DashboardState, model: &ModelInfo) {
    let mut lines = Vec::new();

    match &state.health {
        None => lines.push(Line::from(Span::styled(
            "  Checking backend...",
            Theme::text_muted(),
        ))),
        Some(report) => {
            let online = report.status.is_online();
            let label = if online { "ONLINE" } else { "OFFLINE" };
            lines.push(Line::from(vec![
                Span::styled("  API: ", Theme::text_secondary()),
                Span::styled(label, Theme::status(online)),
            ]));

            let latency = report
                .status
                .latency
                .map_or_else(|| "-".to_string(), |ms| format!("{ms} ms"));
            lines.push(field_line("Latency", latency));

            let version = report
                .status
                .version
                .clone()
                .unwrap_or_else(|| model.version.to_string());
            lines.push(field_line("Model version", version));

            let loaded = if report.status.model_loaded { "yes" } else { "no" };
            lines.push(field_line("Model loaded", loaded.to_string()));

            lines.push(field_line(
                "Last check",
                report.checked_at.format("%H:%M:%S UTC").to_string(),
            ));
        }
    }

    if state.refreshing {
        lines.push(Line::from(Span::styled("  Refreshing...", Theme::info())));
    }

    let block = Block::default()
        .title(Span::styled(" API Status ", Theme::subtitle()))
        .borders(Borders::ALL)
        .border_style(Theme::border());

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label}: "), Theme::text_secondary()),
        Span::styled(value, Theme::text()),
    ])
}

fn render_quick_actions(f: &mut Frame, area: Rect) {
    let actions: Vec<Line> = [
        ("N", "New Assessment"),
        ("B", "Batch Upload"),
        ("M", "Model Metrics"),
        ("R", "Refresh Status"),
        ("Q", "Quit"),
    ]
    .iter()
    .map(|(key, desc)| {
        Line::from(vec![
            Span::styled(format!("[{key}] "), Theme::key_hint()),
            Span::styled(*desc, Theme::key_desc()),
        ])
    })
    .collect();

    let block = Block::default()
        .title(Span::styled(" Quick Actions ", Theme::subtitle()))
        .borders(Borders::ALL)
        .border_style(Theme::border());

    f.render_widget(Paragraph::new(actions).block(block), area);
}

fn render_platform_stats(f: &mut Frame, area: Rect, stats: &PlatformStats) {
    let block = Block::default()
        .title(Span::styled(" Platform ", Theme::subtitle()))
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let lines = vec![
        field_line("Patients analyzed", stats.total_patients_analyzed.to_string()),
        field_line("Dropouts prevented", stats.dropouts_prevented.to_string()),
        field_line("Cost saved", format!("${:.0}", stats.cost_saved)),
        field_line("Avg response", format!("{} ms", stats.avg_response_time)),
        field_line("Active trials", stats.active_trials.to_string()),
        field_line("Partners", stats.healthcare_partners.to_string()),
        field_line("Accuracy", format!("{:.0}%", stats.accuracy_rate * 100.0)),
        field_line("Uptime", format!("{:.1}%", stats.uptime_percent)),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}
