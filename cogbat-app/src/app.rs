use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use cogbat_core::Phase;
use cogbat_experiment::{AnswerOutcome, BatteryConfig, SessionController};
use cogbat_stimuli::ThreadSource;
use cogbat_timing::HighPrecisionTimer;

use crate::render::{render_view, summary_table};
use crate::sink::FileCompletionSink;

/// Longest the loop sleeps when no timer is pending.
const IDLE_WAIT: Duration = Duration::from_millis(500);

/// What a line typed by the participant means in the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Start,
    Continue,
    Respond(usize),
    Unknown,
}

pub fn parse_command(phase: Phase, line: &str) -> Command {
    let input = line.trim().to_ascii_lowercase();
    if matches!(input.as_str(), "q" | "quit" | "exit") {
        return Command::Quit;
    }
    match phase {
        Phase::Idle | Phase::Done if input.is_empty() || input == "s" || input == "r" => {
            Command::Start
        }
        _ if phase.awaits_acknowledge() && input.is_empty() => Command::Continue,
        Phase::Crt => match input.as_str() {
            "1" | "f" | "left" | "l" => Command::Respond(0),
            "2" | "j" | "right" => Command::Respond(1),
            _ => Command::Unknown,
        },
        Phase::Stroop => match input.parse::<usize>() {
            Ok(n @ 1..=4) => Command::Respond(n - 1),
            _ => Command::Unknown,
        },
        _ => Command::Unknown,
    }
}

/// Interactive terminal session. Lines typed on stdin are the responses.
pub struct App {
    controller: SessionController<HighPrecisionTimer, ThreadSource, FileCompletionSink>,
    input: Receiver<String>,
    last_frame: String,
    reported: Option<String>,
    should_exit: bool,
}

impl App {
    pub fn new(config: BatteryConfig, sink: FileCompletionSink) -> Result<Self> {
        let controller = SessionController::new(
            config,
            HighPrecisionTimer::new(),
            ThreadSource::thread(),
            sink.with_bell(true),
        )?;
        Ok(Self {
            controller,
            input: spawn_stdin_reader(),
            last_frame: String::new(),
            reported: None,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        println!("=== CRT + STROOP BATTERY ===");
        println!("CRT answers: 1/f = left, 2/j = right. Stroop answers: 1-4. q quits.");
        println!("Press Enter to start.\n");

        while !self.should_exit {
            self.draw()?;
            let wait = self
                .controller
                .time_until_next_timer()
                .unwrap_or(IDLE_WAIT)
                .min(IDLE_WAIT);
            match self.input.recv_timeout(wait) {
                Ok(line) => self.handle_input(&line),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::info!("stdin closed");
                    self.should_exit = true;
                }
            }
            self.controller.poll();
            self.report_if_done();
        }
        self.controller.sink().drain_submissions();
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let frame = render_view(&self.controller.view());
        if frame != self.last_frame {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{frame}")?;
            stdout.flush()?;
            self.last_frame = frame;
        }
        Ok(())
    }

    fn handle_input(&mut self, line: &str) {
        let phase = self.controller.phase();
        match parse_command(phase, line) {
            Command::Quit => self.should_exit = true,
            // an inter-section pause is also idle; only a quiet controller restarts
            Command::Start if self.controller.next_deadline().is_none() => self.controller.start(),
            Command::Start => {}
            Command::Continue => self.controller.acknowledge(),
            Command::Respond(index) => {
                let outcome = self.controller.answer_index(index);
                if outcome == AnswerOutcome::Ignored {
                    tracing::debug!(index, "response ignored");
                }
            }
            Command::Unknown => tracing::debug!(%line, phase = phase.name(), "unrecognised input"),
        }
    }

    /// Prints the result table once per finished session.
    fn report_if_done(&mut self) {
        let Some(session) = self.controller.last_session() else {
            return;
        };
        if self.reported.as_deref() == Some(session.id.as_str()) {
            return;
        }
        println!("\n{}", summary_table(session));
        println!("Press Enter to run again or q to quit.");
        self.reported = Some(session.id.clone());
    }
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
