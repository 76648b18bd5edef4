use cogbat_core::{CRT_ORDER, Phase, SectionId, TestSession};
use cogbat_experiment::{
    AnswerOutcome, BatteryConfig, SessionController, SessionSink, SessionState, SessionView,
    ShownStimulus, TimerRole,
};
use cogbat_stimuli::RngSource;
use cogbat_timing::{ManualTimer, Timer};
use proptest::prelude::*;
use rand::rngs::StdRng;

#[derive(Default)]
struct Recorder {
    sessions: Vec<TestSession>,
    alerts: usize,
}

impl SessionSink for Recorder {
    fn session_completed(&mut self, session: &TestSession) {
        self.sessions.push(session.clone());
    }

    fn deadline_alert(&mut self) {
        self.alerts += 1;
    }
}

type Controller = SessionController<ManualTimer, RngSource<StdRng>, Recorder>;

fn controller(config: BatteryConfig, seed: u64) -> (ManualTimer, Controller) {
    let timer = ManualTimer::default();
    let c = SessionController::new(
        config,
        timer.clone(),
        RngSource::seeded(seed),
        Recorder::default(),
    )
    .unwrap();
    (timer, c)
}

fn jump_to_next_timer(timer: &ManualTimer, c: &mut Controller) {
    let deadline = c.next_deadline().expect("a timer should be pending");
    timer.set(deadline);
    c.poll();
}

fn correct_label(view: &SessionView) -> String {
    match &view.stimulus {
        Some(ShownStimulus::Crt(s)) => cogbat_core::Stimulus::correct_label(s).to_string(),
        Some(ShownStimulus::Stroop(s)) => s.ink_name.clone(),
        None => String::new(),
    }
}

/// Drives a started session to `Done`, answering every trial with `choose`.
fn drive(
    timer: &ManualTimer,
    c: &mut Controller,
    step_ms: u64,
    mut choose: impl FnMut(&SessionView) -> String,
) {
    for _ in 0..10_000 {
        match c.phase() {
            Phase::Done => return,
            Phase::Idle | Phase::Break => jump_to_next_timer(timer, c),
            Phase::Intro => c.acknowledge(),
            Phase::Crt | Phase::Stroop => {
                timer.advance_ms(step_ms);
                c.poll();
                if c.phase().allows_input() {
                    let label = choose(&c.view());
                    c.answer(&label);
                }
            }
        }
    }
    panic!("session did not finish");
}

#[test]
fn full_session_seals_nine_sections_and_saves_once() {
    let (timer, mut c) = controller(BatteryConfig::default(), 1);
    c.start();
    drive(&timer, &mut c, 700, correct_label);

    assert_eq!(c.machine().sealed_sections(), 9);
    assert_eq!(c.sink().sessions.len(), 1);
    assert_eq!(c.sink().alerts, 1);

    let session = &c.sink().sessions[0];
    let ids: Vec<SectionId> = session.crt_sections.iter().map(|s| s.section_id).collect();
    assert_eq!(ids, CRT_ORDER.to_vec());
    for section in &session.crt_sections {
        assert_eq!(section.trials.len(), 40);
        assert_eq!(section.summary.accuracy, 1.0);
        assert!(section.summary.mean_reaction_time_ms > 0.0);
    }
    let stroop = session.stroop_section.as_ref().unwrap();
    assert_eq!(stroop.section_id, SectionId::Stroop);
    assert!(!stroop.trials.is_empty());
    assert!(stroop.trials.len() < c.machine().config().stroop_pool_size());
    assert_eq!(c.last_session(), Some(session));
    assert_eq!(c.pending_timers(), 0);
}

#[test]
fn late_stroop_answer_is_not_recorded() {
    let (timer, mut c) = controller(BatteryConfig::default(), 2);
    c.start();
    while c.phase() != Phase::Stroop {
        match c.phase() {
            Phase::Intro => c.acknowledge(),
            Phase::Crt => {
                timer.advance_ms(300);
                c.poll();
                c.answer_index(0);
            }
            _ => jump_to_next_timer(&timer, &mut c),
        }
    }
    timer.advance_ms(500);
    c.poll();
    assert!(matches!(c.answer("Red"), AnswerOutcome::Recorded(_)));

    let SessionState::Stroop { deadline_ns, run, .. } = c.machine().state() else {
        panic!("expected stroop");
    };
    let before = run.recorded().len();
    timer.set(*deadline_ns);
    assert_eq!(c.answer("Red"), AnswerOutcome::Ignored);

    c.poll();
    assert_eq!(c.phase(), Phase::Done);
    let stroop = c.sink().sessions[0].stroop_section.as_ref().unwrap();
    assert_eq!(stroop.trials.len(), before);
    assert_eq!(c.sink().alerts, 1);
}

#[test]
fn exhausted_stroop_pool_finishes_without_alert() {
    let config = BatteryConfig {
        crt_trials: 2,
        stroop_nominal_trials: 3,
        stroop_pool_ratio: 1,
        break_secs: 1,
        ..BatteryConfig::default()
    };
    let (timer, mut c) = controller(config, 3);
    c.start();
    drive(&timer, &mut c, 100, |_| "Green".to_string());

    let session = &c.sink().sessions[0];
    assert_eq!(session.crt_sections.len(), 8);
    assert_eq!(session.stroop_section.as_ref().unwrap().trials.len(), 3);
    assert_eq!(c.sink().alerts, 0);
}

#[test]
fn break_runs_exactly_its_ticks_with_one_live_timer() {
    let config = BatteryConfig {
        crt_trials: 2,
        ..BatteryConfig::default()
    };
    let (timer, mut c) = controller(config, 4);
    c.start();
    while c.phase() != Phase::Break {
        match c.phase() {
            Phase::Intro => c.acknowledge(),
            Phase::Crt => {
                timer.advance_ms(200);
                c.poll();
                c.answer_index(1);
            }
            _ => jump_to_next_timer(&timer, &mut c),
        }
    }
    let entered = timer.now();
    assert_eq!(c.view().countdown_secs, Some(10));
    for _ in 0..10 {
        assert_eq!(c.pending_timers(), 1);
        assert!(c.is_scheduled(TimerRole::BreakCountdown));
        c.acknowledge();
        jump_to_next_timer(&timer, &mut c);
    }
    assert_eq!(timer.now() - entered, 10_000_000_000);
    assert_eq!(c.phase(), Phase::Intro);
    assert_eq!(c.view().section, Some(SectionId::Stroop));
    assert_eq!(c.pending_timers(), 0);
}

#[test]
fn restart_after_done_resets_results_and_saves_again() {
    let config = BatteryConfig {
        crt_trials: 2,
        stroop_window_ms: 2_000,
        break_secs: 1,
        ..BatteryConfig::default()
    };
    let (timer, mut c) = controller(config, 5);
    c.start();
    drive(&timer, &mut c, 300, correct_label);
    assert_eq!(c.sink().sessions.len(), 1);

    c.start();
    assert_eq!(c.phase(), Phase::Intro);
    assert_eq!(c.machine().sealed_sections(), 0);
    assert!(c.last_session().is_none());
    assert_eq!(c.pending_timers(), 0);

    drive(&timer, &mut c, 300, correct_label);
    let sessions = &c.sink().sessions;
    assert_eq!(sessions.len(), 2);
    assert_ne!(sessions[0].id, sessions[1].id);
}

#[test]
fn created_at_uses_the_session_clock() {
    let config = BatteryConfig {
        crt_trials: 2,
        stroop_window_ms: 1_000,
        break_secs: 1,
        ..BatteryConfig::default()
    };
    let (timer, mut c) = controller(config, 6);
    c.start();
    drive(&timer, &mut c, 250, correct_label);
    let session = &c.sink().sessions[0];
    assert_eq!(session.created_at_epoch_ms, timer.epoch_ms());
    assert_eq!(session.format_version, cogbat_core::FORMAT_VERSION);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn any_answers_reach_done_after_nine_sections(
        seed in any::<u64>(),
        picks in proptest::collection::vec(0usize..5, 1..64),
        step_ms in 50u64..1_500,
    ) {
        let config = BatteryConfig {
            crt_trials: 4,
            stroop_window_ms: 5_000,
            break_secs: 2,
            ..BatteryConfig::default()
        };
        let (timer, mut c) = controller(config, seed);
        c.start();
        let mut i = 0;
        drive(&timer, &mut c, step_ms, |view| {
            i += 1;
            let pick = picks[i % picks.len()];
            view.response_labels.get(pick).cloned().unwrap_or_else(|| "none".to_string())
        });
        prop_assert_eq!(c.machine().sealed_sections(), 9);
        prop_assert_eq!(c.sink().sessions.len(), 1);
        let session = &c.sink().sessions[0];
        prop_assert_eq!(session.crt_sections.len(), 8);
        prop_assert!(session.crt_sections.iter().all(|s| s.trials.len() == 4));
        prop_assert!(session.stroop_section.is_some());
    }
}
