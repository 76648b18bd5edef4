use serde::{Deserialize, Serialize};

/// Timing window of the trial currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    /// Stimulus shown, presentation delay still running.
    Presenting,
    /// Reaction time is being measured.
    Open,
}

/// Recorded result per trial. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialRecord {
    /// 0-based, sequential within the section.
    pub index: usize,
    pub stimulus_descriptor: String,
    pub correct_label: String,
    pub given_answer: String,
    pub is_correct: bool,
    pub reaction_time_ms: f64,
    pub answered_at_epoch_ms: i64,
}
