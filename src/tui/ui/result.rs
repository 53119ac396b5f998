//! Screening result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::Screening;
use crate::tui::styles::ClinicalTheme;

/// Render the screening outcome.
pub fn render_result(f: &mut Frame, area: Rect, screening: &Screening) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Outcome
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    render_outcome(f, chunks[1], screening);
    render_result_footer(f, chunks[2]);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Screening Result", ClinicalTheme::title()),
        Span::styled(" │ CKD Prediction", ClinicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_outcome(f: &mut Frame, area: Rect, screening: &Screening) {
    let outcome_style = if screening.outcome.is_positive() {
        ClinicalTheme::danger()
    } else {
        ClinicalTheme::success()
    };

    let block = Block::default()
        .title(Span::styled(" Prediction Results ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            screening.outcome.label(),
            outcome_style.add_modifier(ratatui::style::Modifier::BOLD),
        )),
        Line::from(Span::styled(
            screening.outcome.description(),
            ClinicalTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Evaluated at {}",
                screening.evaluated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            ClinicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center);

    f.render_widget(content, inner);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[Q] ", ClinicalTheme::key_hint()),
        Span::styled("Quit ", ClinicalTheme::key_desc()),
        Span::styled("[Any Key] ", ClinicalTheme::key_hint()),
        Span::styled("New Screening", ClinicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}
