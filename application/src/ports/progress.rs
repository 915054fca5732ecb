//! Progress notification port
//!
//! Defines the interface for reporting progress while a turn runs.
//! Implementations live in the presentation layer.

use thinktank_domain::Model;

/// Phases of one turn, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    FanOut,
    Escalation,
    Debate,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::FanOut => "fan-out",
            TurnPhase::Escalation => "escalation",
            TurnPhase::Debate => "debate",
        }
    }
}

/// Callback for progress updates during turn execution
pub trait ProgressNotifier: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, phase: &TurnPhase, total_tasks: usize);

    /// Called when a generation completes within a phase
    fn on_task_complete(&self, phase: &TurnPhase, model: &Model, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: &TurnPhase);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: &TurnPhase, _total_tasks: usize) {}
    fn on_task_complete(&self, _phase: &TurnPhase, _model: &Model, _success: bool) {}
    fn on_phase_complete(&self, _phase: &TurnPhase) {}
}
