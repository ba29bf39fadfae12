//! UI module: View components for the TUI.

pub mod form;
pub mod processing;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::BRAND;
use crate::tui::styles::ClinicalTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![
            Span::styled(format!("{BRAND} "), ClinicalTheme::focused()),
            Span::styled(
                "AI predictions are estimates and do not replace professional diagnosis.",
                ClinicalTheme::text_muted(),
            ),
        ]),
        Line::from(vec![Span::styled(
            "Consult a physician before acting on any result.",
            ClinicalTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(ClinicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
