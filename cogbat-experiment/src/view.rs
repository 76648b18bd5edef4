use cogbat_core::{CRT_ORDER, CrtStimulus, Phase, SectionId, StroopStimulus};
use cogbat_stimuli::PALETTE;
use serde::{Deserialize, Serialize};

use crate::state::{SessionMachine, SessionState};

/// The stimulus currently on screen, as `{"task": ..., "stimulus": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "task", content = "stimulus")]
pub enum ShownStimulus {
    Crt(CrtStimulus),
    Stroop(StroopStimulus),
}

/// Everything a renderer needs to draw one frame of the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: Phase,
    pub section: Option<SectionId>,
    pub title: Option<&'static str>,
    pub instructions: Option<String>,
    pub stimulus: Option<ShownStimulus>,
    /// Buttons in key order.
    pub response_labels: Vec<String>,
    /// 1-based trial number and section length.
    pub trial: Option<(usize, usize)>,
    pub progress_percent: f64,
    pub countdown_secs: Option<u32>,
    pub message: Option<&'static str>,
    pub feedback: Option<bool>,
}

impl SessionView {
    fn empty(phase: Phase, progress_percent: f64) -> Self {
        Self {
            phase,
            section: None,
            title: None,
            instructions: None,
            stimulus: None,
            response_labels: Vec::new(),
            trial: None,
            progress_percent,
            countdown_secs: None,
            message: None,
            feedback: None,
        }
    }
}

fn response_labels(section: SectionId) -> Vec<String> {
    match section.labels() {
        Some((left, right)) => vec![left.to_string(), right.to_string()],
        None => PALETTE.iter().map(|c| c.name.to_string()).collect(),
    }
}

impl SessionMachine {
    pub fn view(&self) -> SessionView {
        let sections = CRT_ORDER.len() as f64;
        let crt_done = self.crt_results().len() as f64 / sections * 100.0;
        let mut view = SessionView::empty(self.phase(), crt_done);
        view.feedback = self.feedback();

        match self.state() {
            SessionState::Idle { pending } => {
                view.message = Some(if pending.is_some() {
                    "Get ready for the next part."
                } else {
                    "Press start to begin."
                });
            }
            SessionState::Intro { section } => {
                view.section = Some(*section);
                view.title = Some(section.title());
                view.instructions = Some(if section.is_crt() {
                    section.instructions().to_string()
                } else {
                    let secs = self.config().stroop_window_ms.div_ceil(1_000);
                    format!("{} You have {secs} seconds.", section.instructions())
                });
                view.response_labels = response_labels(*section);
                if !section.is_crt() {
                    view.progress_percent = 100.0;
                }
            }
            SessionState::Crt(run) => {
                let n = run.stimuli.len().max(1);
                let index = run.section.crt_index().unwrap_or(0) as f64;
                let within = (run.cursor + 1) as f64 / n as f64;
                view.section = Some(run.section);
                view.title = Some(run.section.title());
                view.stimulus = run.current().cloned().map(ShownStimulus::Crt);
                view.response_labels = response_labels(run.section);
                view.trial = Some((run.cursor + 1, run.stimuli.len()));
                view.progress_percent = (index + within) / sections * 100.0;
            }
            SessionState::Break { remaining_secs } => {
                view.countdown_secs = Some(*remaining_secs);
                view.progress_percent = 100.0;
                view.message = Some("Take a short break. The last part starts soon.");
            }
            SessionState::Stroop {
                run,
                remaining_secs,
                ..
            } => {
                view.section = Some(run.section);
                view.title = Some(run.section.title());
                view.stimulus = run.current().cloned().map(ShownStimulus::Stroop);
                view.response_labels = response_labels(run.section);
                view.trial = Some((run.cursor + 1, run.stimuli.len()));
                view.countdown_secs = Some(*remaining_secs);
                view.progress_percent = 100.0;
            }
            SessionState::Done => {
                view.progress_percent = 100.0;
                view.message = Some("All done. Thank you!");
            }
        }
        view
    }
}
