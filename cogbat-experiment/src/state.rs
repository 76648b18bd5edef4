use std::time::Duration;

use cogbat_core::{
    CRT_ORDER, CrtStimulus, FORMAT_VERSION, Phase, SectionId, SectionResult, Stimulus,
    StroopStimulus, TestSession, TrialRecord,
};
use cogbat_stimuli::{RandomSource, StimulusGenerator, generate_stroop, uuid_v4};

use crate::config::BatteryConfig;
use crate::summary::summarize;
use crate::trial::{ResponseTiming, TrialRecorder, TrialTimestamps};

/// Inputs the machine reacts to: user actions and fired timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    Acknowledge,
    Answer(String),
    PresentationReady,
    PauseElapsed,
    BreakTick,
    StroopTick,
    FeedbackElapsed,
}

/// The timers a session owns. At most one of each is live at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerRole {
    Presentation,
    SectionPause,
    BreakCountdown,
    StroopCountdown,
    FeedbackFlash,
}

impl TimerRole {
    /// Event raised when a timer of this role fires.
    pub fn event(self) -> SessionEvent {
        match self {
            Self::Presentation => SessionEvent::PresentationReady,
            Self::SectionPause => SessionEvent::PauseElapsed,
            Self::BreakCountdown => SessionEvent::BreakTick,
            Self::StroopCountdown => SessionEvent::StroopTick,
            Self::FeedbackFlash => SessionEvent::FeedbackElapsed,
        }
    }
}

/// Work a transition asks its owner to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace any live timer of `role` with one firing after `after`.
    Schedule { role: TimerRole, after: Duration },
    Cancel(TimerRole),
    /// Drop every timer and the saved flag.
    Reset,
    TrialRecorded(TrialRecord),
    Feedback { correct: bool },
    SectionSealed(SectionResult),
    /// Haptic or audible cue when the Stroop window runs out.
    Alert,
    SessionComplete(TestSession),
}

/// Clock readings taken once per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Now {
    pub mono_ns: u64,
    pub epoch_ms: i64,
}

/// Where an inter-section pause leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseTarget {
    Intro(SectionId),
    Break,
}

/// A section whose stimuli are being answered.
#[derive(Debug, Clone)]
pub struct RunningSection<S> {
    pub section: SectionId,
    pub stimuli: Vec<S>,
    pub cursor: usize,
    pub started_at_epoch_ms: i64,
    pub timestamps: TrialTimestamps,
    recorder: TrialRecorder,
}

impl<S: Stimulus> RunningSection<S> {
    fn new(section: SectionId, stimuli: Vec<S>, now: Now) -> Self {
        Self {
            section,
            stimuli,
            cursor: 0,
            started_at_epoch_ms: now.epoch_ms,
            timestamps: TrialTimestamps::presented_at(now.mono_ns),
            recorder: TrialRecorder::new(),
        }
    }

    pub fn current(&self) -> Option<&S> {
        self.stimuli.get(self.cursor)
    }

    pub fn recorded(&self) -> &[TrialRecord] {
        self.recorder.trials()
    }

    fn record(&mut self, given: &str, now: Now, delay_ns: u64) -> Option<TrialRecord> {
        let stimulus = self.stimuli.get(self.cursor)?;
        let timing = ResponseTiming {
            window_start_ns: self.timestamps.window_start(delay_ns),
            answered_ns: now.mono_ns,
            answered_epoch_ms: now.epoch_ms,
        };
        let record = self.recorder.record(
            given,
            stimulus.correct_label(),
            stimulus.descriptor(),
            timing,
        );
        Some(record.clone())
    }

    /// Moves to the next stimulus; false once the list is used up.
    fn advance(&mut self, now: Now) -> bool {
        self.cursor += 1;
        self.timestamps = TrialTimestamps::presented_at(now.mono_ns);
        self.cursor < self.stimuli.len()
    }

    fn seal(self, now: Now) -> SectionResult {
        let trials = self.recorder.into_trials();
        let summary = summarize(&trials);
        tracing::info!(
            section = %self.section,
            trials = summary.count,
            accuracy = summary.accuracy,
            mean_rt_ms = summary.mean_reaction_time_ms,
            "section sealed"
        );
        SectionResult {
            section_id: self.section,
            started_at_epoch_ms: self.started_at_epoch_ms,
            ended_at_epoch_ms: now.epoch_ms,
            trials,
            summary,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionState {
    /// Before the first start, or pausing between sections.
    Idle { pending: Option<PauseTarget> },
    Intro { section: SectionId },
    Crt(RunningSection<CrtStimulus>),
    Break { remaining_secs: u32 },
    Stroop {
        run: RunningSection<StroopStimulus>,
        deadline_ns: u64,
        remaining_secs: u32,
    },
    Done,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle { pending: None }
    }
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle { .. } => Phase::Idle,
            Self::Intro { .. } => Phase::Intro,
            Self::Crt(_) => Phase::Crt,
            Self::Break { .. } => Phase::Break,
            Self::Stroop { .. } => Phase::Stroop,
            Self::Done => Phase::Done,
        }
    }
}

fn ceil_secs(ns: u64) -> u32 {
    ns.div_ceil(1_000_000_000) as u32
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Session protocol as a pure transition function.
///
/// `step` never touches a clock or a timer; it reads the time it is given
/// and returns the effects its owner must apply.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    config: BatteryConfig,
    generator: StimulusGenerator,
    state: SessionState,
    crt_results: Vec<SectionResult>,
    stroop_result: Option<SectionResult>,
    feedback: Option<bool>,
}

impl SessionMachine {
    pub fn new(config: BatteryConfig) -> Self {
        Self {
            generator: StimulusGenerator::new(config.symmetry_mode),
            config,
            state: SessionState::default(),
            crt_results: Vec::new(),
            stroop_result: None,
            feedback: None,
        }
    }

    pub fn config(&self) -> &BatteryConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn crt_results(&self) -> &[SectionResult] {
        &self.crt_results
    }

    pub fn stroop_result(&self) -> Option<&SectionResult> {
        self.stroop_result.as_ref()
    }

    /// Sections sealed since the last start.
    pub fn sealed_sections(&self) -> usize {
        self.crt_results.len() + usize::from(self.stroop_result.is_some())
    }

    /// Correctness of the last answer while its feedback flash is showing.
    pub fn feedback(&self) -> Option<bool> {
        self.feedback
    }

    pub fn step<R: RandomSource + ?Sized>(
        &mut self,
        event: SessionEvent,
        now: Now,
        rng: &mut R,
    ) -> Vec<Effect> {
        let mut fx = Vec::new();
        let state = std::mem::take(&mut self.state);
        self.state = match (state, event) {
            (state, SessionEvent::Start) if state.phase().can_start() => {
                self.crt_results.clear();
                self.stroop_result = None;
                self.feedback = None;
                fx.push(Effect::Reset);
                tracing::info!("session started");
                SessionState::Intro {
                    section: CRT_ORDER[0],
                }
            }
            (SessionState::Intro { section }, SessionEvent::Acknowledge) => {
                self.begin_section(section, now, rng, &mut fx)
            }
            (SessionState::Crt(mut run), SessionEvent::PresentationReady) => {
                run.timestamps.ready.get_or_insert(now.mono_ns);
                SessionState::Crt(run)
            }
            (
                SessionState::Stroop {
                    mut run,
                    deadline_ns,
                    remaining_secs,
                },
                SessionEvent::PresentationReady,
            ) => {
                run.timestamps.ready.get_or_insert(now.mono_ns);
                SessionState::Stroop {
                    run,
                    deadline_ns,
                    remaining_secs,
                }
            }
            (SessionState::Crt(run), SessionEvent::Answer(label)) => {
                self.answer_crt(run, &label, now, &mut fx)
            }
            (
                SessionState::Stroop {
                    run,
                    deadline_ns,
                    remaining_secs,
                },
                SessionEvent::Answer(label),
            ) => {
                if now.mono_ns >= deadline_ns {
                    tracing::debug!(answer = %label, "late stroop answer ignored");
                    SessionState::Stroop {
                        run,
                        deadline_ns,
                        remaining_secs,
                    }
                } else {
                    self.answer_stroop(run, deadline_ns, remaining_secs, &label, now, rng, &mut fx)
                }
            }
            (
                SessionState::Idle {
                    pending: Some(target),
                },
                SessionEvent::PauseElapsed,
            ) => match target {
                PauseTarget::Intro(section) => SessionState::Intro { section },
                PauseTarget::Break => self.begin_break(&mut fx),
            },
            (SessionState::Break { remaining_secs }, SessionEvent::BreakTick) => {
                let remaining_secs = remaining_secs.saturating_sub(1);
                if remaining_secs == 0 {
                    fx.push(Effect::Cancel(TimerRole::BreakCountdown));
                    SessionState::Intro {
                        section: SectionId::Stroop,
                    }
                } else {
                    fx.push(Effect::Schedule {
                        role: TimerRole::BreakCountdown,
                        after: Duration::from_secs(1),
                    });
                    SessionState::Break { remaining_secs }
                }
            }
            (
                SessionState::Stroop {
                    run,
                    deadline_ns,
                    ..
                },
                SessionEvent::StroopTick,
            ) => {
                let left_ns = deadline_ns.saturating_sub(now.mono_ns);
                if left_ns == 0 {
                    self.finish_stroop(run, true, now, rng, &mut fx)
                } else {
                    let tick = millis(self.config.stroop_tick_ms)
                        .min(Duration::from_nanos(left_ns));
                    fx.push(Effect::Schedule {
                        role: TimerRole::StroopCountdown,
                        after: tick,
                    });
                    SessionState::Stroop {
                        run,
                        deadline_ns,
                        remaining_secs: ceil_secs(left_ns),
                    }
                }
            }
            (state, SessionEvent::FeedbackElapsed) => {
                self.feedback = None;
                state
            }
            (state, event) => {
                tracing::trace!(phase = state.phase().name(), ?event, "event ignored");
                state
            }
        };
        fx
    }

    fn begin_section<R: RandomSource + ?Sized>(
        &mut self,
        section: SectionId,
        now: Now,
        rng: &mut R,
        fx: &mut Vec<Effect>,
    ) -> SessionState {
        let delay = self.config.presentation_delay();
        if section.is_crt() {
            let stimuli = match self.generator.generate(section, self.config.crt_trials, rng) {
                Ok(stimuli) => stimuli,
                Err(err) => {
                    tracing::error!(%section, %err, "stimulus generation failed");
                    return SessionState::Intro { section };
                }
            };
            tracing::info!(%section, trials = stimuli.len(), "section begins");
            fx.push(Effect::Schedule {
                role: TimerRole::Presentation,
                after: delay,
            });
            return SessionState::Crt(RunningSection::new(section, stimuli, now));
        }

        let pool = generate_stroop(self.config.stroop_pool_size(), rng);
        let window = self.config.stroop_window();
        let deadline_ns = now.mono_ns.saturating_add(window.as_nanos() as u64);
        tracing::info!(pool = pool.len(), window_ms = self.config.stroop_window_ms, "stroop begins");
        fx.push(Effect::Schedule {
            role: TimerRole::Presentation,
            after: delay,
        });
        fx.push(Effect::Schedule {
            role: TimerRole::StroopCountdown,
            after: millis(self.config.stroop_tick_ms).min(window),
        });
        SessionState::Stroop {
            run: RunningSection::new(section, pool, now),
            deadline_ns,
            remaining_secs: ceil_secs(window.as_nanos() as u64),
        }
    }

    fn begin_break(&mut self, fx: &mut Vec<Effect>) -> SessionState {
        if self.config.break_secs == 0 {
            return SessionState::Intro {
                section: SectionId::Stroop,
            };
        }
        fx.push(Effect::Schedule {
            role: TimerRole::BreakCountdown,
            after: Duration::from_secs(1),
        });
        SessionState::Break {
            remaining_secs: self.config.break_secs,
        }
    }

    fn push_answer(&mut self, record: TrialRecord, fx: &mut Vec<Effect>) {
        self.feedback = Some(record.is_correct);
        fx.push(Effect::Feedback {
            correct: record.is_correct,
        });
        fx.push(Effect::Schedule {
            role: TimerRole::FeedbackFlash,
            after: millis(self.config.feedback_flash_ms),
        });
        fx.push(Effect::TrialRecorded(record));
    }

    /// Timers that must not outlive a running section.
    fn close_section(&mut self, fx: &mut Vec<Effect>) {
        self.feedback = None;
        fx.push(Effect::Cancel(TimerRole::Presentation));
        fx.push(Effect::Cancel(TimerRole::FeedbackFlash));
    }

    fn answer_crt(
        &mut self,
        mut run: RunningSection<CrtStimulus>,
        label: &str,
        now: Now,
        fx: &mut Vec<Effect>,
    ) -> SessionState {
        let delay_ns = self.config.presentation_delay().as_nanos() as u64;
        let Some(record) = run.record(label, now, delay_ns) else {
            return SessionState::Crt(run);
        };
        self.push_answer(record, fx);
        if run.advance(now) {
            fx.push(Effect::Schedule {
                role: TimerRole::Presentation,
                after: self.config.presentation_delay(),
            });
            return SessionState::Crt(run);
        }

        let section = run.section;
        let result = run.seal(now);
        self.close_section(fx);
        fx.push(Effect::SectionSealed(result.clone()));
        self.crt_results.push(result);

        let next = section
            .crt_index()
            .and_then(|i| CRT_ORDER.get(i + 1))
            .copied();
        let (target, pause_ms) = match next {
            Some(next) => (PauseTarget::Intro(next), self.config.section_pause_ms),
            None => (PauseTarget::Break, self.config.final_pause_ms),
        };
        fx.push(Effect::Schedule {
            role: TimerRole::SectionPause,
            after: millis(pause_ms),
        });
        SessionState::Idle {
            pending: Some(target),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn answer_stroop<R: RandomSource + ?Sized>(
        &mut self,
        mut run: RunningSection<StroopStimulus>,
        deadline_ns: u64,
        remaining_secs: u32,
        label: &str,
        now: Now,
        rng: &mut R,
        fx: &mut Vec<Effect>,
    ) -> SessionState {
        let delay_ns = self.config.presentation_delay().as_nanos() as u64;
        let Some(record) = run.record(label, now, delay_ns) else {
            return self.finish_stroop(run, false, now, rng, fx);
        };
        self.push_answer(record, fx);
        if run.advance(now) {
            fx.push(Effect::Schedule {
                role: TimerRole::Presentation,
                after: self.config.presentation_delay(),
            });
            return SessionState::Stroop {
                run,
                deadline_ns,
                remaining_secs,
            };
        }
        tracing::warn!(pool = run.stimuli.len(), "stroop pool exhausted before the deadline");
        self.finish_stroop(run, false, now, rng, fx)
    }

    fn finish_stroop<R: RandomSource + ?Sized>(
        &mut self,
        run: RunningSection<StroopStimulus>,
        timed_out: bool,
        now: Now,
        rng: &mut R,
        fx: &mut Vec<Effect>,
    ) -> SessionState {
        let result = run.seal(now);
        self.close_section(fx);
        fx.push(Effect::Cancel(TimerRole::StroopCountdown));
        fx.push(Effect::SectionSealed(result.clone()));
        if timed_out {
            fx.push(Effect::Alert);
        }
        self.stroop_result = Some(result);

        let session = TestSession {
            id: uuid_v4(rng),
            created_at_epoch_ms: now.epoch_ms,
            format_version: FORMAT_VERSION.to_string(),
            crt_sections: self.crt_results.clone(),
            stroop_section: self.stroop_result.clone(),
        };
        tracing::info!(
            id = %session.id,
            trials = session.total_trials(),
            timed_out,
            "session complete"
        );
        fx.push(Effect::SessionComplete(session));
        SessionState::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogbat_stimuli::RngSource;

    fn at(ms: u64) -> Now {
        Now {
            mono_ns: ms * 1_000_000,
            epoch_ms: 1_000_000 + ms as i64,
        }
    }

    fn small() -> BatteryConfig {
        BatteryConfig {
            crt_trials: 2,
            stroop_nominal_trials: 2,
            stroop_pool_ratio: 2,
            break_secs: 2,
            ..BatteryConfig::default()
        }
    }

    fn correct_crt(m: &SessionMachine) -> String {
        match m.state() {
            SessionState::Crt(run) => run.current().unwrap().correct_label().to_string(),
            other => panic!("not in crt: {other:?}"),
        }
    }

    #[test]
    fn start_enters_first_intro_and_resets() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(1);
        let fx = m.step(SessionEvent::Start, at(0), &mut rng);
        assert_eq!(fx, vec![Effect::Reset]);
        assert!(matches!(
            m.state(),
            SessionState::Intro {
                section: SectionId::Crt1
            }
        ));
    }

    #[test]
    fn start_is_ignored_mid_section() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(1);
        m.step(SessionEvent::Start, at(0), &mut rng);
        m.step(SessionEvent::Acknowledge, at(10), &mut rng);
        assert!(m.step(SessionEvent::Start, at(20), &mut rng).is_empty());
        assert_eq!(m.phase(), Phase::Crt);
    }

    #[test]
    fn acknowledge_arms_the_presentation_delay() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(1);
        m.step(SessionEvent::Start, at(0), &mut rng);
        let fx = m.step(SessionEvent::Acknowledge, at(10), &mut rng);
        assert_eq!(
            fx,
            vec![Effect::Schedule {
                role: TimerRole::Presentation,
                after: Duration::from_millis(50),
            }]
        );
    }

    #[test]
    fn reaction_time_excludes_the_presentation_delay() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(1);
        m.step(SessionEvent::Start, at(0), &mut rng);
        m.step(SessionEvent::Acknowledge, at(100), &mut rng);
        m.step(SessionEvent::PresentationReady, at(150), &mut rng);
        let label = correct_crt(&m);
        let fx = m.step(SessionEvent::Answer(label), at(450), &mut rng);
        let record = fx
            .iter()
            .find_map(|e| match e {
                Effect::TrialRecorded(r) => Some(r.clone()),
                _ => None,
            })
            .unwrap();
        assert!(record.is_correct);
        assert_eq!(record.reaction_time_ms, 300.0);
    }

    #[test]
    fn early_answer_measures_from_due_time_and_clamps() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(1);
        m.step(SessionEvent::Start, at(0), &mut rng);
        m.step(SessionEvent::Acknowledge, at(100), &mut rng);
        let fx = m.step(SessionEvent::Answer("nope".into()), at(120), &mut rng);
        let Some(Effect::TrialRecorded(record)) =
            fx.iter().find(|e| matches!(e, Effect::TrialRecorded(_)))
        else {
            panic!("no record");
        };
        assert_eq!(record.reaction_time_ms, 0.0);
        assert!(!record.is_correct);
    }

    #[test]
    fn last_crt_answer_seals_and_pauses() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(3);
        m.step(SessionEvent::Start, at(0), &mut rng);
        m.step(SessionEvent::Acknowledge, at(0), &mut rng);
        m.step(SessionEvent::Answer("x".into()), at(500), &mut rng);
        let fx = m.step(SessionEvent::Answer("x".into()), at(900), &mut rng);
        assert!(fx.iter().any(|e| matches!(e, Effect::SectionSealed(r) if r.trials.len() == 2)));
        assert!(fx.contains(&Effect::Schedule {
            role: TimerRole::SectionPause,
            after: Duration::from_millis(1_000),
        }));
        assert!(fx.contains(&Effect::Cancel(TimerRole::Presentation)));
        assert_eq!(m.crt_results().len(), 1);

        m.step(SessionEvent::PauseElapsed, at(1_900), &mut rng);
        assert!(matches!(
            m.state(),
            SessionState::Intro {
                section: SectionId::Crt2
            }
        ));
    }

    #[test]
    fn break_counts_down_then_opens_stroop_intro() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(4);
        m.state = SessionState::Idle {
            pending: Some(PauseTarget::Break),
        };
        m.step(SessionEvent::PauseElapsed, at(0), &mut rng);
        assert!(matches!(m.state(), SessionState::Break { remaining_secs: 2 }));
        // answers do not skip the break
        m.step(SessionEvent::Answer("Red".into()), at(10), &mut rng);
        m.step(SessionEvent::Acknowledge, at(20), &mut rng);
        assert!(matches!(m.state(), SessionState::Break { remaining_secs: 2 }));

        m.step(SessionEvent::BreakTick, at(1_000), &mut rng);
        assert!(matches!(m.state(), SessionState::Break { remaining_secs: 1 }));
        m.step(SessionEvent::BreakTick, at(2_000), &mut rng);
        assert!(matches!(
            m.state(),
            SessionState::Intro {
                section: SectionId::Stroop
            }
        ));
    }

    #[test]
    fn stroop_tick_at_deadline_completes_with_alert() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(5);
        m.state = SessionState::Intro {
            section: SectionId::Stroop,
        };
        m.step(SessionEvent::Acknowledge, at(0), &mut rng);
        let SessionState::Stroop { remaining_secs, .. } = m.state() else {
            panic!("not in stroop");
        };
        assert_eq!(*remaining_secs, 60);

        let fx = m.step(SessionEvent::StroopTick, at(59_900), &mut rng);
        assert_eq!(
            fx,
            vec![Effect::Schedule {
                role: TimerRole::StroopCountdown,
                after: Duration::from_millis(100),
            }]
        );
        let fx = m.step(SessionEvent::StroopTick, at(60_000), &mut rng);
        assert!(fx.contains(&Effect::Alert));
        assert!(fx.iter().any(|e| matches!(e, Effect::SessionComplete(_))));
        assert_eq!(m.phase(), Phase::Done);
    }

    #[test]
    fn late_stroop_answer_is_ignored() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(6);
        m.state = SessionState::Intro {
            section: SectionId::Stroop,
        };
        m.step(SessionEvent::Acknowledge, at(0), &mut rng);
        let fx = m.step(SessionEvent::Answer("Red".into()), at(60_000), &mut rng);
        assert!(fx.is_empty());
        let SessionState::Stroop { run, .. } = m.state() else {
            panic!("not in stroop");
        };
        assert!(run.recorded().is_empty());
    }

    #[test]
    fn exhausted_pool_completes_without_alert() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(7);
        m.state = SessionState::Intro {
            section: SectionId::Stroop,
        };
        m.step(SessionEvent::Acknowledge, at(0), &mut rng);
        let mut last = Vec::new();
        for i in 0..4 {
            last = m.step(SessionEvent::Answer("Blue".into()), at(100 * (i + 1)), &mut rng);
        }
        assert_eq!(m.phase(), Phase::Done);
        assert!(!last.contains(&Effect::Alert));
        assert!(last.contains(&Effect::Cancel(TimerRole::StroopCountdown)));
        assert_eq!(m.stroop_result().map(|r| r.trials.len()), Some(4));
    }

    #[test]
    fn timer_roles_map_to_their_events() {
        assert_eq!(TimerRole::BreakCountdown.event(), SessionEvent::BreakTick);
        assert_eq!(TimerRole::FeedbackFlash.event(), SessionEvent::FeedbackElapsed);
    }

    #[test]
    fn correct_crt_answers_give_full_accuracy() {
        let mut m = SessionMachine::new(small());
        let mut rng = RngSource::seeded(8);
        m.step(SessionEvent::Start, at(0), &mut rng);
        m.step(SessionEvent::Acknowledge, at(0), &mut rng);
        for t in 1..=2 {
            let label = correct_crt(&m);
            m.step(SessionEvent::Answer(label), at(t * 400), &mut rng);
        }
        assert_eq!(m.crt_results()[0].summary.accuracy, 1.0);
        assert_eq!(m.feedback(), None);
    }
}
