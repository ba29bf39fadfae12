//! Assessment result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::domain::{Polarity, ReportView};
use crate::tui::styles::ClinicalTheme;

/// Transient message shown under the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

/// Result screen state
#[derive(Debug, Clone, Default)]
pub struct ResultState {
    pub notice: Option<Notice>,
}

/// Render the result screen
pub fn render_result(f: &mut Frame, area: Rect, view: &ReportView, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0], view);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_verdict(f, columns[0], view);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(view.factors.len() as u16 * 2 + 2),
            Constraint::Min(0),
        ])
        .split(columns[1]);

    render_benchmarks(f, right[0], view);
    render_factors(f, right[1], view);
    render_recommendations(f, right[2], view);

    render_result_footer(f, chunks[2], state);
}

fn render_result_header(f: &mut Frame, area: Rect, view: &ReportView) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Assessment Result", ClinicalTheme::title()),
        Span::styled(
            format!(" │ Report {}", view.report_id),
            ClinicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_verdict(f: &mut Frame, area: Rect, view: &ReportView) {
    let verdict_style = ClinicalTheme::verdict(view.verdict);

    let block = Block::default()
        .title(Span::styled(" Verdict ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border_focused());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Headline
            Constraint::Length(3), // Probability
            Constraint::Length(2), // Confidence
            Constraint::Length(2), // Simulated notice
            Constraint::Min(0),    // Interpretation
        ])
        .margin(1)
        .split(inner);

    let headline = Paragraph::new(vec![
        Line::from(Span::styled(
            view.headline,
            verdict_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            view.verdict.to_string(),
            ClinicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(headline, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Risk Probability ", ClinicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        )
        .gauge_style(verdict_style)
        .ratio(view.probability.clamp(0.0, 1.0))
        .label(view.probability_pct.clone());
    f.render_widget(gauge, chunks[1]);

    let confidence = Paragraph::new(Line::from(vec![
        Span::styled("Confidence: ", ClinicalTheme::text_secondary()),
        Span::styled(view.confidence_badge, ClinicalTheme::confidence(view.confidence)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(confidence, chunks[2]);

    if let Some(notice) = view.simulated_notice {
        let simulated = Paragraph::new(Line::from(Span::styled(
            format!("! {notice}"),
            ClinicalTheme::warning(),
        )))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(simulated, chunks[3]);
    }

    let interpretation = Paragraph::new(Line::from(Span::styled(
        view.interpretation,
        ClinicalTheme::text(),
    )))
    .wrap(Wrap { trim: true });
    f.render_widget(interpretation, chunks[4]);
}

fn render_benchmarks(f: &mut Frame, area: Rect, view: &ReportView) {
    let header = Row::new(vec!["Metric", "You", "Reference", "Delta"])
        .style(ClinicalTheme::text_secondary().add_modifier(Modifier::BOLD));

    let rows = view.benchmarks.iter().map(|row| {
        Row::new(vec![
            Cell::from(row.metric),
            Cell::from(row.value.clone()),
            Cell::from(row.reference.clone()),
            Cell::from(row.delta.clone()).style(ClinicalTheme::delta(row.above_reference)),
        ])
        .style(ClinicalTheme::text())
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(34),
            Constraint::Percentage(24),
            Constraint::Percentage(24),
            Constraint::Percentage(18),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(Span::styled(" Benchmarks ", ClinicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(table, area);
}

fn render_factors(f: &mut Frame, area: Rect, view: &ReportView) {
    let mut lines = Vec::with_capacity(view.factors.len() * 2);
    for factor in &view.factors {
        let marker = match factor.polarity {
            Polarity::Negative => "▲",
            Polarity::Positive => "✓",
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {marker} {}. ", factor.rank),
                ClinicalTheme::polarity(factor.polarity),
            ),
            Span::styled(factor.title.clone(), ClinicalTheme::title()),
        ]));
        lines.push(Line::from(Span::styled(
            format!("      {}", factor.rationale),
            ClinicalTheme::text_muted(),
        )));
    }

    let factors = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" Key Factors ", ClinicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(ClinicalTheme::border()),
    );
    f.render_widget(factors, area);
}

fn render_recommendations(f: &mut Frame, area: Rect, view: &ReportView) {
    let lines: Vec<Line> = view
        .recommendations
        .iter()
        .map(|r| {
            Line::from(vec![
                Span::styled(" • ", ClinicalTheme::focused()),
                Span::styled(*r, ClinicalTheme::text()),
            ])
        })
        .collect();

    let recommendations = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(" Recommendations ", ClinicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        );
    f.render_widget(recommendations, area);
}

fn render_result_footer(f: &mut Frame, area: Rect, state: &ResultState) {
    let content = match &state.notice {
        Some(Notice { text, is_error: true }) => Line::from(vec![
            Span::styled("! ", ClinicalTheme::danger()),
            Span::styled(text.clone(), ClinicalTheme::danger()),
        ]),
        Some(Notice { text, .. }) => Line::from(vec![
            Span::styled("✓ ", ClinicalTheme::success()),
            Span::styled(text.clone(), ClinicalTheme::success()),
        ]),
        None => Line::from(vec![
            Span::styled("[E] ", ClinicalTheme::key_hint()),
            Span::styled("Export Report ", ClinicalTheme::key_desc()),
            Span::styled("[N] ", ClinicalTheme::key_hint()),
            Span::styled("New Assessment ", ClinicalTheme::key_desc()),
            Span::styled("[Q] ", ClinicalTheme::key_hint()),
            Span::styled("Quit", ClinicalTheme::key_desc()),
        ]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}
