//! Protocol of a CRT + Stroop battery: configuration, trial recording,
//! section summaries and the session state machine with its timer-driven
//! controller.

pub mod config;
pub mod controller;
pub mod error;
pub mod state;
pub mod summary;
pub mod trial;
pub mod view;

pub use config::BatteryConfig;
pub use controller::{AnswerOutcome, SessionController, SessionSink};
pub use error::{ConfigError, Result};
pub use state::{
    Effect, Now, PauseTarget, RunningSection, SessionEvent, SessionMachine, SessionState,
    TimerRole,
};
pub use summary::{format_ms, mean, median, summarize};
pub use trial::{ResponseTiming, TrialRecorder, TrialTimestamps};
pub use view::{SessionView, ShownStimulus};
