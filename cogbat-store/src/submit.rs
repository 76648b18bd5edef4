use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cogbat_core::{SectionResult, TestSession};
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, StoreError};

/// Accuracy and mean reaction time of one task.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskScore {
    pub accuracy: f64,
    pub mean_rt_ms: f64,
}

impl TaskScore {
    /// Unweighted mean of per-section accuracy and mean RT.
    pub fn over(sections: &[SectionResult]) -> Self {
        if sections.is_empty() {
            return Self::default();
        }
        let n = sections.len() as f64;
        Self {
            accuracy: sections.iter().map(|s| s.summary.accuracy).sum::<f64>() / n,
            mean_rt_ms: sections
                .iter()
                .map(|s| s.summary.mean_reaction_time_ms)
                .sum::<f64>()
                / n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_w: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_h: Option<u32>,
}

impl ClientMeta {
    /// Describes this program and, when known, the terminal size.
    pub fn terminal(columns: Option<u32>, rows: Option<u32>) -> Self {
        Self {
            user_agent: Some(format!(
                "cogbat/{} ({})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            )),
            screen_w: columns,
            screen_h: rows,
        }
    }
}

/// One row of the remote aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub participant_id: String,
    pub total_trials: usize,
    pub crt: TaskScore,
    pub stroop: TaskScore,
    pub meta: ClientMeta,
}

impl SubmissionPayload {
    /// `total_trials` is the nominal session size, not the count answered.
    pub fn from_session(
        session: &TestSession,
        participant_id: impl Into<String>,
        total_trials: usize,
        meta: ClientMeta,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            total_trials,
            crt: TaskScore::over(&session.crt_sections),
            stroop: TaskScore::over(session.stroop_section.as_slice()),
            meta,
        }
    }

    /// The endpoint rejects a payload without a participant or trial count.
    pub fn validate(&self) -> Result<()> {
        if self.participant_id.trim().is_empty() {
            return Err(StoreError::invalid_payload("participantId is empty"));
        }
        if self.total_trials == 0 {
            return Err(StoreError::invalid_payload("totalTrials is zero"));
        }
        Ok(())
    }
}

/// Averages over every stored submission.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    #[serde(default, deserialize_with = "lenient_count")]
    pub n: u64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_crt_accuracy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_crt_mean_rt_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_stroop_accuracy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_stroop_mean_rt_ms: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// SQL numeric averages arrive as strings; nulls stay `None`.
fn lenient_number<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<f64>, D::Error> {
    Ok(match Option::<NumberOrText>::deserialize(de)? {
        Some(NumberOrText::Number(v)) => Some(v),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<u64, D::Error> {
    Ok(lenient_number(de)?.map_or(0, |v| v.max(0.0) as u64))
}

/// Hands a finished session to the remote aggregate. Never fails the caller.
pub trait Submitter {
    /// Returns without waiting for the remote side.
    fn submit(&self, payload: &SubmissionPayload);

    /// Blocks until submissions still in flight have finished.
    fn drain(&self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSubmitter;

impl Submitter for NoopSubmitter {
    fn submit(&self, payload: &SubmissionPayload) {
        tracing::debug!(participant = %payload.participant_id, "submission disabled");
    }
}

/// Client for the aggregation endpoint: `POST <base>/submit`, `GET <base>/stats`.
#[derive(Debug, Clone)]
pub struct AggregateClient {
    client: Client,
    base: String,
    in_flight: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl AggregateClient {
    pub fn new(base: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
            in_flight: Arc::default(),
        })
    }

    pub fn submit_url(&self) -> String {
        format!("{}/submit", self.base)
    }

    pub fn stats_url(&self) -> String {
        format!("{}/stats", self.base)
    }

    pub fn try_submit(&self, payload: &SubmissionPayload) -> Result<()> {
        payload.validate()?;
        self.client
            .post(self.submit_url())
            .json(payload)
            .send()?
            .error_for_status()?;
        Ok(())
    }

    pub fn fetch_stats(&self) -> Result<AggregateStats> {
        let stats = self
            .client
            .get(self.stats_url())
            .send()?
            .error_for_status()?
            .json()?;
        Ok(stats)
    }
}

impl Submitter for AggregateClient {
    fn submit(&self, payload: &SubmissionPayload) {
        let client = self.clone();
        let payload = payload.clone();
        let spawned = thread::Builder::new()
            .name("cogbat-submit".into())
            .spawn(move || match client.try_submit(&payload) {
                Ok(()) => tracing::info!(url = %client.submit_url(), "session submitted"),
                Err(err) => tracing::warn!(%err, "session submission failed"),
            });
        match spawned {
            Ok(handle) => {
                let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                in_flight.retain(|h| !h.is_finished());
                in_flight.push(handle);
            }
            Err(err) => tracing::warn!(%err, "could not start submission thread"),
        }
    }

    fn drain(&self) {
        let handles: Vec<_> = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogbat_core::{FORMAT_VERSION, SectionId, SectionSummary};

    fn section(id: SectionId, accuracy: f64, mean: f64) -> SectionResult {
        SectionResult {
            section_id: id,
            started_at_epoch_ms: 0,
            ended_at_epoch_ms: 0,
            trials: Vec::new(),
            summary: SectionSummary {
                count: 40,
                accuracy,
                mean_reaction_time_ms: mean,
                median_reaction_time_ms: mean,
                error_count: 0,
            },
        }
    }

    fn session() -> TestSession {
        TestSession {
            id: "s".into(),
            created_at_epoch_ms: 0,
            format_version: FORMAT_VERSION.into(),
            crt_sections: vec![
                section(SectionId::Crt1, 1.0, 400.0),
                section(SectionId::Crt2, 0.5, 600.0),
            ],
            stroop_section: Some(section(SectionId::Stroop, 0.9, 700.0)),
        }
    }

    #[test]
    fn crt_score_is_the_mean_of_section_scores() {
        let payload = SubmissionPayload::from_session(&session(), "p", 380, ClientMeta::default());
        assert_eq!(payload.crt.accuracy, 0.75);
        assert_eq!(payload.crt.mean_rt_ms, 500.0);
        assert_eq!(payload.stroop.accuracy, 0.9);
        assert_eq!(payload.stroop.mean_rt_ms, 700.0);
    }

    #[test]
    fn payload_json_matches_the_endpoint() {
        let payload = SubmissionPayload::from_session(
            &session(),
            "p",
            380,
            ClientMeta {
                user_agent: Some("ua".into()),
                screen_w: Some(80),
                screen_h: None,
            },
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["participantId"], "p");
        assert_eq!(json["totalTrials"], 380);
        assert_eq!(json["crt"]["meanRtMs"], 500.0);
        assert_eq!(json["meta"]["screenW"], 80);
        assert!(json["meta"].get("screenH").is_none());
    }

    #[test]
    fn missing_stroop_scores_zero() {
        let mut s = session();
        s.stroop_section = None;
        let payload = SubmissionPayload::from_session(&s, "p", 380, ClientMeta::default());
        assert_eq!(payload.stroop, TaskScore::default());
    }

    #[test]
    fn validate_rejects_missing_identity() {
        let mut payload = SubmissionPayload::from_session(&session(), "", 380, ClientMeta::default());
        assert!(matches!(payload.validate(), Err(StoreError::InvalidPayload { .. })));
        payload.participant_id = "p".into();
        payload.total_trials = 0;
        assert!(payload.validate().is_err());
        payload.total_trials = 380;
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn stats_accept_numeric_strings_and_nulls() {
        let raw = r#"{"ok":true,"n":3,"avg_crt_accuracy":"0.8123","avg_crt_mean_rt_ms":512.5,
                      "avg_stroop_accuracy":null}"#;
        let stats: AggregateStats = serde_json::from_str(raw).unwrap();
        assert_eq!(stats.n, 3);
        assert_eq!(stats.avg_crt_accuracy, Some(0.8123));
        assert_eq!(stats.avg_crt_mean_rt_ms, Some(512.5));
        assert_eq!(stats.avg_stroop_accuracy, None);
        assert_eq!(stats.avg_stroop_mean_rt_ms, None);
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let client = AggregateClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(client.submit_url(), "http://localhost:3000/api/submit");
        assert_eq!(client.stats_url(), "http://localhost:3000/api/stats");
    }

    #[test]
    fn invalid_payload_is_not_sent() {
        let client = AggregateClient::new("http://127.0.0.1:9").unwrap();
        let payload = SubmissionPayload::from_session(&session(), "", 380, ClientMeta::default());
        assert!(matches!(
            client.try_submit(&payload),
            Err(StoreError::InvalidPayload { .. })
        ));
        // fire-and-forget path swallows the same failure
        client.submit(&payload);
        client.drain();
    }

    #[test]
    fn submit_returns_while_the_endpoint_is_silent() {
        // accepts connections through the backlog but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let client = AggregateClient::new(format!("http://{}", listener.local_addr().unwrap())).unwrap();
        let payload = SubmissionPayload::from_session(&session(), "p", 380, ClientMeta::default());

        let started = std::time::Instant::now();
        client.submit(&payload);
        assert!(started.elapsed() < Duration::from_secs(1), "{:?}", started.elapsed());
    }

    #[test]
    fn drain_waits_for_refused_submissions() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let client = AggregateClient::new(format!("http://{addr}")).unwrap();
        let payload = SubmissionPayload::from_session(&session(), "p", 380, ClientMeta::default());
        client.submit(&payload);
        client.drain();
        assert!(client.in_flight.lock().unwrap().is_empty());
    }
}
