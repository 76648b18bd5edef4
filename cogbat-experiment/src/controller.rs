use std::collections::HashMap;
use std::time::Duration;

use cogbat_core::{Phase, TestSession, TrialRecord};
use cogbat_stimuli::RandomSource;
use cogbat_timing::{Timer, TimerHandle, TimerQueue};

use crate::config::BatteryConfig;
use crate::error::Result;
use crate::state::{Effect, Now, SessionEvent, SessionMachine, TimerRole};
use crate::view::SessionView;

/// Receives a finished session. Called once per completed run.
pub trait SessionSink {
    fn session_completed(&mut self, session: &TestSession);

    /// The Stroop window ran out.
    fn deadline_alert(&mut self) {}
}

impl<F: FnMut(&TestSession)> SessionSink for F {
    fn session_completed(&mut self, session: &TestSession) {
        self(session)
    }
}

/// What happened to an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    Recorded(TrialRecord),
    /// No trial was open, or the Stroop deadline had passed.
    Ignored,
}

/// Owns the machine, the clock, the timers and the randomness of one
/// participant's session.
pub struct SessionController<T, R, K>
where
    T: Timer<Timestamp = u64>,
{
    machine: SessionMachine,
    timer: T,
    rng: R,
    sink: K,
    queue: TimerQueue<T, TimerRole>,
    handles: HashMap<TimerRole, TimerHandle>,
    saved: bool,
    last_session: Option<TestSession>,
}

impl<T, R, K> SessionController<T, R, K>
where
    T: Timer<Timestamp = u64>,
    R: RandomSource,
    K: SessionSink,
{
    pub fn new(config: BatteryConfig, timer: T, rng: R, sink: K) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            machine: SessionMachine::new(config),
            queue: TimerQueue::new(timer.clone()),
            timer,
            rng,
            sink,
            handles: HashMap::new(),
            saved: false,
            last_session: None,
        })
    }

    fn now(&self) -> Now {
        Now {
            mono_ns: self.timer.now(),
            epoch_ms: self.timer.epoch_ms(),
        }
    }

    fn dispatch(&mut self, event: SessionEvent) -> Option<TrialRecord> {
        let now = self.now();
        let effects = self.machine.step(event, now, &mut self.rng);
        let mut recorded = None;
        for effect in effects {
            if let Effect::TrialRecorded(record) = effect {
                recorded = Some(record);
            } else {
                self.apply(effect);
            }
        }
        recorded
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Schedule { role, after } => {
                self.cancel(role);
                let handle = self.queue.schedule(after, role);
                self.handles.insert(role, handle);
            }
            Effect::Cancel(role) => self.cancel(role),
            Effect::Reset => {
                self.queue.clear();
                self.handles.clear();
                self.saved = false;
                self.last_session = None;
            }
            Effect::Alert => self.sink.deadline_alert(),
            Effect::SessionComplete(session) => {
                if self.saved {
                    tracing::warn!(id = %session.id, "session already saved");
                    return;
                }
                self.saved = true;
                self.sink.session_completed(&session);
                self.last_session = Some(session);
            }
            Effect::TrialRecorded(_) | Effect::Feedback { .. } | Effect::SectionSealed(_) => {}
        }
    }

    fn cancel(&mut self, role: TimerRole) {
        if let Some(handle) = self.handles.remove(&role) {
            self.queue.cancel(handle);
        }
    }

    /// Begins a fresh session from idle or done; ignored otherwise.
    pub fn start(&mut self) {
        self.dispatch(SessionEvent::Start);
    }

    pub fn acknowledge(&mut self) {
        self.dispatch(SessionEvent::Acknowledge);
    }

    pub fn answer(&mut self, label: &str) -> AnswerOutcome {
        match self.dispatch(SessionEvent::Answer(label.to_string())) {
            Some(record) => AnswerOutcome::Recorded(record),
            None => AnswerOutcome::Ignored,
        }
    }

    /// Answers with the `index`-th response button of the current view.
    pub fn answer_index(&mut self, index: usize) -> AnswerOutcome {
        let label = self.machine.view().response_labels.get(index).cloned();
        match label {
            Some(label) => self.answer(&label),
            None => AnswerOutcome::Ignored,
        }
    }

    /// Fires every timer that is due. Returns how many fired.
    pub fn poll(&mut self) -> usize {
        let mut fired = 0;
        while let Some((handle, role)) = self.queue.pop_due() {
            if self.handles.get(&role) == Some(&handle) {
                self.handles.remove(&role);
            }
            self.dispatch(role.event());
            fired += 1;
        }
        fired
    }

    /// Timer nanoseconds of the next scheduled timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.next_deadline()
    }

    pub fn time_until_next_timer(&self) -> Option<Duration> {
        self.queue.time_until_next()
    }

    pub fn is_scheduled(&self, role: TimerRole) -> bool {
        self.handles.contains_key(&role)
    }

    pub fn pending_timers(&self) -> usize {
        self.queue.len()
    }

    pub fn view(&self) -> SessionView {
        self.machine.view()
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn last_session(&self) -> Option<&TestSession> {
        self.last_session.as_ref()
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogbat_stimuli::RngSource;
    use cogbat_timing::ManualTimer;

    fn controller(
        timer: &ManualTimer,
    ) -> SessionController<ManualTimer, impl RandomSource, impl SessionSink> {
        SessionController::new(
            BatteryConfig::default(),
            timer.clone(),
            RngSource::seeded(11),
            |_: &TestSession| {},
        )
        .unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = BatteryConfig {
            crt_trials: 3,
            ..BatteryConfig::default()
        };
        let result = SessionController::new(
            config,
            ManualTimer::default(),
            RngSource::seeded(1),
            |_: &TestSession| {},
        );
        assert!(result.is_err());
    }

    #[test]
    fn presentation_timer_fires_after_delay() {
        let timer = ManualTimer::default();
        let mut c = controller(&timer);
        c.start();
        c.acknowledge();
        assert!(c.is_scheduled(TimerRole::Presentation));
        timer.advance_ms(49);
        assert_eq!(c.poll(), 0);
        timer.advance_ms(1);
        assert_eq!(c.poll(), 1);
        assert!(!c.is_scheduled(TimerRole::Presentation));
    }

    #[test]
    fn rescheduling_a_role_keeps_one_live_timer() {
        let timer = ManualTimer::default();
        let mut c = controller(&timer);
        c.start();
        c.acknowledge();
        timer.advance_ms(100);
        c.poll();
        c.answer_index(0);
        timer.advance_ms(10);
        c.answer_index(1);
        // one presentation delay and one feedback flash
        assert_eq!(c.pending_timers(), 2);
        assert!(c.is_scheduled(TimerRole::FeedbackFlash));
        assert!(c.is_scheduled(TimerRole::Presentation));
    }

    #[test]
    fn out_of_range_button_is_ignored() {
        let timer = ManualTimer::default();
        let mut c = controller(&timer);
        c.start();
        c.acknowledge();
        assert_eq!(c.answer_index(2), AnswerOutcome::Ignored);
    }

    #[test]
    fn answers_outside_a_section_are_ignored() {
        let timer = ManualTimer::default();
        let mut c = controller(&timer);
        assert_eq!(c.answer("Plant"), AnswerOutcome::Ignored);
        c.start();
        assert_eq!(c.answer("Plant"), AnswerOutcome::Ignored);
    }

    #[test]
    fn start_mid_section_keeps_running() {
        let timer = ManualTimer::default();
        let mut c = controller(&timer);
        c.start();
        c.acknowledge();
        assert!(c.pending_timers() > 0);
        // mid-section start is refused
        c.start();
        assert_eq!(c.phase(), Phase::Crt);
        assert!(c.pending_timers() > 0);
    }
}
