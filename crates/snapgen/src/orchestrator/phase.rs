use serde::{Deserialize, Serialize};

/// Phase of the generate / validate / refine state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Generating,
    Generated,
    Validating,
    Validated,
    Refining,
    Error,
}

impl Phase {
    /// True while a collaborator call is outstanding.
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Generating | Phase::Validating | Phase::Refining)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Generating => write!(f, "Generating"),
            Phase::Generated => write!(f, "Generated"),
            Phase::Validating => write!(f, "Validating"),
            Phase::Validated => write!(f, "Validated"),
            Phase::Refining => write!(f, "Refining"),
            Phase::Error => write!(f, "Error"),
        }
    }
}
