use cogbat_core::{TrialRecord, TrialState};

/// Timing stamps of the trial currently on screen, in timer nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialTimestamps {
    pub presented: u64,
    /// Set when the presentation delay elapses.
    pub ready: Option<u64>,
}

impl TrialTimestamps {
    pub fn presented_at(now: u64) -> Self {
        Self {
            presented: now,
            ready: None,
        }
    }

    pub fn state(&self) -> TrialState {
        if self.ready.is_some() {
            TrialState::Open
        } else {
            TrialState::Presenting
        }
    }

    /// Start of the reaction-time window. Before the delay timer fires this
    /// is the moment it is due to fire.
    pub fn window_start(&self, delay_ns: u64) -> u64 {
        self.ready
            .unwrap_or_else(|| self.presented.saturating_add(delay_ns))
    }
}

/// When a response arrived.
#[derive(Debug, Clone, Copy)]
pub struct ResponseTiming {
    pub window_start_ns: u64,
    pub answered_ns: u64,
    pub answered_epoch_ms: i64,
}

/// Turns responses into trial records for one section.
///
/// Only appends; deciding when the section is complete is up to the caller.
#[derive(Debug, Clone, Default)]
pub struct TrialRecorder {
    trials: Vec<TrialRecord>,
}

impl TrialRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        given_answer: &str,
        correct_answer: &str,
        stimulus_descriptor: String,
        timing: ResponseTiming,
    ) -> &TrialRecord {
        let rt_ns = timing.answered_ns.saturating_sub(timing.window_start_ns);
        let record = TrialRecord {
            index: self.trials.len(),
            stimulus_descriptor,
            correct_label: correct_answer.to_string(),
            given_answer: given_answer.to_string(),
            is_correct: given_answer == correct_answer,
            reaction_time_ms: rt_ns as f64 / 1_000_000.0,
            answered_at_epoch_ms: timing.answered_epoch_ms,
        };
        tracing::debug!(
            index = record.index,
            correct = record.is_correct,
            rt_ms = record.reaction_time_ms,
            "trial recorded"
        );
        self.trials.push(record);
        &self.trials[self.trials.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn trials(&self) -> &[TrialRecord] {
        &self.trials
    }

    pub fn into_trials(self) -> Vec<TrialRecord> {
        self.trials
    }
}
