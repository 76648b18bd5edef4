use std::io::Write;

use cogbat_core::TestSession;
use cogbat_experiment::SessionSink;
use cogbat_store::{
    ClientMeta, FileStore, KeyValueStore, SessionLog, SubmissionPayload, Submitter,
};

/// Saves a finished session locally, then submits it fire-and-forget.
pub struct CompletionSink<S: KeyValueStore> {
    log: Option<SessionLog<S>>,
    submitter: Box<dyn Submitter>,
    participant_id: String,
    nominal_trials: usize,
    meta: ClientMeta,
    bell: bool,
}

impl<S: KeyValueStore> CompletionSink<S> {
    pub fn new(
        log: Option<SessionLog<S>>,
        submitter: Box<dyn Submitter>,
        participant_id: String,
        nominal_trials: usize,
    ) -> Self {
        Self {
            log,
            submitter,
            participant_id,
            nominal_trials,
            meta: ClientMeta::terminal(env_dimension("COLUMNS"), env_dimension("LINES")),
            bell: false,
        }
    }

    /// Ring the terminal bell when the Stroop window runs out.
    pub fn with_bell(mut self, bell: bool) -> Self {
        self.bell = bell;
        self
    }

    pub fn log(&self) -> Option<&SessionLog<S>> {
        self.log.as_ref()
    }

    /// Waits for background submissions before the process exits.
    pub fn drain_submissions(&self) {
        self.submitter.drain();
    }
}

pub type FileCompletionSink = CompletionSink<FileStore>;

fn env_dimension(name: &str) -> Option<u32> {
    std::env::var(name).ok()?.trim().parse().ok()
}

impl<S: KeyValueStore> SessionSink for CompletionSink<S> {
    fn session_completed(&mut self, session: &TestSession) {
        if let Some(log) = self.log.as_mut() {
            if let Err(err) = log.add(session) {
                tracing::warn!(%err, id = %session.id, "session not saved locally");
            }
        }
        let payload = SubmissionPayload::from_session(
            session,
            self.participant_id.clone(),
            self.nominal_trials,
            self.meta.clone(),
        );
        self.submitter.submit(&payload);
    }

    fn deadline_alert(&mut self) {
        if self.bell {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(b"\x07");
            let _ = stdout.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogbat_core::FORMAT_VERSION;
    use cogbat_store::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(id: &str) -> TestSession {
        TestSession {
            id: id.into(),
            created_at_epoch_ms: 0,
            format_version: FORMAT_VERSION.into(),
            crt_sections: Vec::new(),
            stroop_section: None,
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<SubmissionPayload>>>);

    impl Submitter for Captured {
        fn submit(&self, payload: &SubmissionPayload) {
            self.0.borrow_mut().push(payload.clone());
        }
    }

    #[test]
    fn completed_session_is_logged_and_submitted() {
        let captured = Captured::default();
        let mut sink = CompletionSink::new(
            Some(SessionLog::new(MemoryStore::new())),
            Box::new(captured.clone()),
            "participant".into(),
            380,
        );
        sink.session_completed(&session("abc"));

        let logged = sink.log().unwrap().load();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].id, "abc");

        let sent = captured.0.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].participant_id, "participant");
        assert_eq!(sent[0].total_trials, 380);
    }

    #[test]
    fn silent_endpoint_does_not_hold_up_completion() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let client =
            cogbat_store::AggregateClient::new(format!("http://{}", listener.local_addr().unwrap()))
                .unwrap();
        let mut sink = CompletionSink::new(
            Some(SessionLog::new(MemoryStore::new())),
            Box::new(client),
            "participant".into(),
            380,
        );

        let started = std::time::Instant::now();
        sink.session_completed(&session("late"));
        let elapsed = started.elapsed();
        assert!(elapsed < std::time::Duration::from_secs(1), "{elapsed:?}");
        assert_eq!(sink.log().unwrap().load()[0].id, "late");
    }
}
