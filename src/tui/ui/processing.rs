//! Processing view shown while an assessment is outstanding.

use std::time::{Duration, Instant};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::tui::styles::ClinicalTheme;

/// Progress never reaches 100% until the result is in.
const PROGRESS_CEILING: f64 = 0.95;

const STAGES: &[(f64, &str)] = &[
    (0.0, "Preparing clinical vitals..."),
    (0.25, "Contacting prediction service..."),
    (0.60, "Analyzing cardiovascular markers..."),
    (0.85, "Compiling report..."),
];

/// Animated progress for one submission.
#[derive(Debug, Clone)]
pub struct ProcessingState {
    pub progress: f64,
    started_at: Instant,
    /// Typical time to resolution, sets the animation pace
    expected: Duration,
}

impl ProcessingState {
    #[must_use]
    pub fn start(expected: Duration) -> Self {
        Self {
            progress: 0.0,
            started_at: Instant::now(),
            expected,
        }
    }

    /// Advance the animation. Monotonic and bounded by the ceiling.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        let tau = (self.expected.as_secs_f64() / 2.0).max(0.1);

        let desired = PROGRESS_CEILING * (1.0 - (-elapsed / tau).exp());
        self.progress = desired.max(self.progress).min(PROGRESS_CEILING);
    }

    #[must_use]
    pub fn stage(&self) -> &'static str {
        STAGES
            .iter()
            .rev()
            .find(|(from, _)| self.progress >= *from)
            .map_or(STAGES[0].1, |(_, label)| *label)
    }
}

/// Render the processing view
pub fn render_processing(f: &mut Frame, area: Rect, state: &ProcessingState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Analyzing", ClinicalTheme::title()),
        Span::styled(" │ Cardiovascular risk model", ClinicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .margin(2)
        .split(chunks[1]);

    let stage = Paragraph::new(Line::from(vec![Span::styled(
        state.stage(),
        ClinicalTheme::focused(),
    )]))
    .alignment(Alignment::Center);
    f.render_widget(stage, body[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        )
        .gauge_style(ClinicalTheme::info())
        .ratio(state.progress.clamp(0.0, 1.0))
        .label(format!("{:.0}%", state.progress * 100.0));
    f.render_widget(gauge, body[1]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[Esc] ", ClinicalTheme::key_hint()),
        Span::styled("Cancel and return to form", ClinicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );
    f.render_widget(footer, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_monotonic_and_bounded() {
        let mut state = ProcessingState::start(Duration::from_millis(1_500));
        let t0 = state.started_at;

        let mut last = 0.0;
        for ms in [0u64, 100, 500, 1_500, 5_000, 60_000] {
            state.tick_at(t0 + Duration::from_millis(ms));
            assert!(state.progress >= last);
            assert!(state.progress <= PROGRESS_CEILING);
            last = state.progress;
        }
        assert!(last > 0.9);
    }

    #[test]
    fn test_stage_follows_progress() {
        let mut state = ProcessingState::start(Duration::from_secs(1));
        assert_eq!(state.stage(), STAGES[0].1);
        state.progress = 0.7;
        assert_eq!(state.stage(), "Analyzing cardiovascular markers...");
        state.progress = 0.95;
        assert_eq!(state.stage(), "Compiling report...");
    }
}
