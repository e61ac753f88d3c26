//! Orchestrator lifecycle.

use serde::{Deserialize, Serialize};

/// Where a seed's orchestration stands.
///
/// `Initialized → Training(0) → Sampling(0) → Training(1) → ... →
/// Training(n-1) → Terminated`. Any non-terminal state may move to
/// `Cancelled` at a round boundary or to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OrchestratorState {
    Initialized,
    Training { round: usize },
    Sampling { round: usize },
    Terminated,
    Cancelled { at_round: usize },
    Failed { round: usize },
}

impl OrchestratorState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Terminated | Self::Cancelled { .. } | Self::Failed { .. }
        )
    }

    /// Check if a transition to `next` is valid.
    pub fn can_transition_to(&self, next: OrchestratorState) -> bool {
        use OrchestratorState::*;
        match (*self, next) {
            (from, _) if from.is_terminal() => false,
            (_, Cancelled { .. }) | (_, Failed { .. }) => true,
            // A resumed run restores the model of its last committed round
            // before sampling, so it may enter at any round.
            (Initialized, Training { .. }) | (Initialized, Terminated) => true,
            (Training { round: r }, Sampling { round: s }) => r == s,
            (Training { .. }, Terminated) => true,
            (Sampling { round: r }, Training { round: s }) => s == r + 1,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Training { .. } => "training",
            Self::Sampling { .. } => "sampling",
            Self::Terminated => "terminated",
            Self::Cancelled { .. } => "cancelled",
            Self::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Training { round } | Self::Sampling { round } | Self::Failed { round } => {
                write!(f, "{}({round})", self.name())
            }
            Self::Cancelled { at_round } => write!(f, "cancelled({at_round})"),
            _ => f.write_str(self.name()),
        }
    }
}
