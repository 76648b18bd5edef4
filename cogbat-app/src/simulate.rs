use std::time::Duration;

use anyhow::{Result, bail};
use cogbat_core::{Phase, Stimulus, TestSession};
use cogbat_experiment::{BatteryConfig, SessionController, SessionSink, SessionView, ShownStimulus};
use cogbat_stimuli::{RandomSource, RngSource};
use cogbat_timing::Timer;
use rand::rngs::StdRng;

/// Scripted participant: answers correctly with probability `accuracy`,
/// with reaction times spread ±30 % around `mean_rt_ms`.
pub struct Participant<R> {
    rng: R,
    pub accuracy: f64,
    pub mean_rt_ms: f64,
    pub read_ms: u64,
}

impl<R: RandomSource> Participant<R> {
    pub fn new(rng: R, accuracy: f64, mean_rt_ms: f64) -> Self {
        Self {
            rng,
            accuracy: accuracy.clamp(0.0, 1.0),
            mean_rt_ms: mean_rt_ms.max(1.0),
            read_ms: 1_500,
        }
    }

    fn correct_answer(view: &SessionView) -> Option<&str> {
        match view.stimulus.as_ref()? {
            ShownStimulus::Crt(s) => Some(s.correct_label()),
            ShownStimulus::Stroop(s) => Some(s.correct_label()),
        }
    }

    /// How long to wait, then which button label to press.
    pub fn respond(&mut self, view: &SessionView) -> (Duration, String) {
        let rt = (self.mean_rt_ms * self.rng.uniform(0.7, 1.3)).max(1.0);
        let delay = Duration::from_micros((rt * 1_000.0) as u64);
        let correct = Self::correct_answer(view).unwrap_or_default().to_string();
        if self.rng.chance(self.accuracy) || view.response_labels.len() < 2 {
            return (delay, correct);
        }
        let wrong: Vec<&String> = view
            .response_labels
            .iter()
            .filter(|l| **l != correct)
            .collect();
        let pick = wrong[self.rng.below(wrong.len())].clone();
        (delay, pick)
    }
}

/// Sleeps `total` on the session clock while firing every timer that falls due.
/// Stops early when the phase changes.
fn wait_firing<T, R, K>(c: &mut SessionController<T, R, K>, total: Duration)
where
    T: Timer<Timestamp = u64>,
    R: RandomSource,
    K: SessionSink,
{
    let phase = c.phase();
    let mut left = total;
    while !left.is_zero() {
        let step = c.time_until_next_timer().map_or(left, |d| d.min(left));
        c.timer().sleep(step);
        left = left.saturating_sub(step);
        c.poll();
        if c.phase() != phase {
            return;
        }
    }
    c.poll();
}

/// Runs one full session with `participant` and returns it.
pub fn run_session<T, R, K, P>(
    c: &mut SessionController<T, R, K>,
    participant: &mut Participant<P>,
) -> Result<TestSession>
where
    T: Timer<Timestamp = u64>,
    R: RandomSource,
    K: SessionSink,
    P: RandomSource,
{
    c.start();
    for _ in 0..100_000 {
        match c.phase() {
            Phase::Done => break,
            Phase::Idle | Phase::Break => match c.time_until_next_timer() {
                Some(wait) => {
                    c.timer().sleep(wait);
                    c.poll();
                }
                None => bail!("session stalled in {}", c.phase().name()),
            },
            Phase::Intro => {
                c.timer().sleep(Duration::from_millis(participant.read_ms));
                c.acknowledge();
            }
            Phase::Crt | Phase::Stroop => {
                let (delay, label) = participant.respond(&c.view());
                wait_firing(c, delay);
                if c.phase().allows_input() {
                    c.answer(&label);
                }
            }
        }
    }
    match c.last_session() {
        Some(session) => Ok(session.clone()),
        None => bail!("session did not finish"),
    }
}

/// The participant draws from its own stream, independent of the stimulus stream.
pub fn seeded_participant(
    seed: u64,
    accuracy: f64,
    mean_rt_ms: f64,
) -> Participant<RngSource<StdRng>> {
    let stream = seed.rotate_left(17) ^ 0x5eed;
    Participant::new(RngSource::seeded(stream), accuracy, mean_rt_ms)
}

pub fn check_args(accuracy: f64, mean_rt_ms: f64, config: &BatteryConfig) -> Result<()> {
    if !(0.0..=1.0).contains(&accuracy) {
        bail!("accuracy must be within 0..=1, got {accuracy}");
    }
    if !(mean_rt_ms.is_finite() && mean_rt_ms > 0.0) {
        bail!("mean RT must be positive, got {mean_rt_ms}");
    }
    config.validate()?;
    Ok(())
}
