use serde::{Deserialize, Serialize};

/// Coarse phase of a session, without the data each phase carries.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Intro,
    Crt,
    Break,
    Stroop,
    Done,
}

impl Phase {
    /// Phases in which a response button press is meaningful.
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Crt | Self::Stroop)
    }

    pub fn awaits_acknowledge(&self) -> bool {
        matches!(self, Self::Intro)
    }

    /// `start` is only accepted from these phases.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Done)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Intro => "intro",
            Self::Crt => "crt",
            Self::Break => "break",
            Self::Stroop => "stroop",
            Self::Done => "done",
        }
    }
}
