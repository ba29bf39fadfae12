//! Prediction cycle state machine.
//!
//! The front end threads a [`Cycle`] through [`Cycle::apply`] for every user
//! action and worker message. Each submission gets a fresh generation number;
//! a `Resolved` event carrying an older number is stale and ignored, so the
//! latest submission always wins.

use crate::domain::{Report, ValidationError};

/// Where the current assessment stands.
#[derive(Debug, Clone, Default)]
pub enum CycleState {
    #[default]
    Idle,
    Validating,
    Submitting,
    /// Resolved with a locally simulated prediction
    Simulated(Box<Report>),
    /// Resolved with a prediction from the remote service
    Succeeded(Box<Report>),
    /// Input was rejected; the form shows every error at once
    Failed(Vec<ValidationError>),
}

impl CycleState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Simulated(_) => "simulated",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }

    /// The finished report, if the cycle has resolved.
    #[must_use]
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Simulated(report) | Self::Succeeded(report) => Some(report),
            _ => None,
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Failed(errors) => errors,
            _ => &[],
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum CycleEvent {
    /// User asked to submit the form
    Validate,
    /// Normalization failed
    Rejected(Vec<ValidationError>),
    /// Normalization succeeded and a prediction task is about to start
    Submitted,
    /// A prediction task finished
    Resolved { submission: u64, report: Box<Report> },
    /// User reset the form or navigated away
    Reset,
}

/// Current state plus the generation of the live submission.
#[derive(Debug, Clone, Default)]
pub struct Cycle {
    generation: u64,
    state: CycleState,
}

impl Cycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &CycleState {
        &self.state
    }

    /// Generation of the most recent submission.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self.state, CycleState::Submitting)
    }

    /// Pure transition function.
    #[must_use]
    pub fn apply(self, event: CycleEvent) -> Self {
        let Self { generation, state } = self;

        match (state, event) {
            (_, CycleEvent::Reset) => Self {
                generation: generation + 1,
                state: CycleState::Idle,
            },

            (_, CycleEvent::Validate) => Self {
                generation,
                state: CycleState::Validating,
            },

            (CycleState::Validating, CycleEvent::Rejected(errors)) => Self {
                generation,
                state: CycleState::Failed(errors),
            },

            (CycleState::Validating, CycleEvent::Submitted) => Self {
                generation: generation + 1,
                state: CycleState::Submitting,
            },

            (CycleState::Submitting, CycleEvent::Resolved { submission, report })
                if submission == generation =>
            {
                let state = if report.is_simulated() {
                    CycleState::Simulated(report)
                } else {
                    CycleState::Succeeded(report)
                };
                Self { generation, state }
            }

            (state, CycleEvent::Resolved { submission, .. }) => {
                tracing::debug!(
                    "Discarding stale result (submission {}, current {}, state {})",
                    submission,
                    generation,
                    state.name()
                );
                Self { generation, state }
            }

            (state, event) => {
                tracing::debug!("Ignoring {} in state {}", event_name(&event), state.name());
                Self { generation, state }
            }
        }
    }
}

fn event_name(event: &CycleEvent) -> &'static str {
    match event {
        CycleEvent::Validate => "Validate",
        CycleEvent::Rejected(_) => "Rejected",
        CycleEvent::Submitted => "Submitted",
        CycleEvent::Resolved { .. } => "Resolved",
        CycleEvent::Reset => "Reset",
    }
}
