use serde::{Deserialize, Serialize};

use crate::section::SectionId;
use crate::trial::TrialRecord;

pub const FORMAT_VERSION: &str = "1.0.0";

/// Reaction-time statistics are taken over correct trials only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary {
    pub count: usize,
    pub accuracy: f64,
    pub mean_reaction_time_ms: f64,
    pub median_reaction_time_ms: f64,
    pub error_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResult {
    pub section_id: SectionId,
    pub started_at_epoch_ms: i64,
    pub ended_at_epoch_ms: i64,
    pub trials: Vec<TrialRecord>,
    pub summary: SectionSummary,
}

impl SectionResult {
    pub fn duration_ms(&self) -> i64 {
        (self.ended_at_epoch_ms - self.started_at_epoch_ms).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSession {
    pub id: String,
    pub created_at_epoch_ms: i64,
    pub format_version: String,
    pub crt_sections: Vec<SectionResult>,
    pub stroop_section: Option<SectionResult>,
}

impl TestSession {
    /// CRT sections in order, then Stroop if present.
    pub fn sections(&self) -> impl Iterator<Item = &SectionResult> {
        self.crt_sections.iter().chain(self.stroop_section.iter())
    }

    pub fn total_trials(&self) -> usize {
        self.sections().map(|s| s.trials.len()).sum()
    }

    /// Sum of per-section durations; pauses and the break are not counted.
    pub fn total_time_ms(&self) -> i64 {
        self.sections().map(SectionResult::duration_ms).sum()
    }
}
