use chrono::{DateTime, Local, TimeZone, Utc};
use cogbat_core::TestSession;

use crate::error::Result;
use crate::kv::KeyValueStore;

pub const HISTORY_KEY: &str = "crt_stroop_history_v1";

/// Completed sessions, newest first, stored as one JSON array.
#[derive(Debug)]
pub struct SessionLog<S> {
    store: S,
}

impl<S: KeyValueStore> SessionLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// An absent, unreadable or malformed log reads as empty.
    pub fn load(&self) -> Vec<TestSession> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(%err, "session log unreadable");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(sessions) => sessions,
            Err(err) => {
                tracing::warn!(%err, "session log malformed");
                Vec::new()
            }
        }
    }

    /// Prepends `session` and rewrites the whole list.
    pub fn add(&mut self, session: &TestSession) -> Result<()> {
        let mut sessions = self.load();
        sessions.insert(0, session.clone());
        self.save(&sessions)?;
        tracing::info!(id = %session.id, total = sessions.len(), "session logged");
        Ok(())
    }

    pub fn save(&mut self, sessions: &[TestSession]) -> Result<()> {
        let raw = serde_json::to_string(sessions)?;
        self.store.set(HISTORY_KEY, &raw)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(HISTORY_KEY)
    }

    pub fn find(&self, id: &str) -> Option<TestSession> {
        self.load().into_iter().find(|s| s.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

/// One line of the history list.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOverview {
    pub id: String,
    pub created: String,
    pub total_trials: usize,
    pub total_time_ms: i64,
    pub sections: usize,
}

impl SessionOverview {
    pub fn of(session: &TestSession) -> Self {
        Self::in_zone(session, &Local)
    }

    pub fn in_zone<Tz: TimeZone>(session: &TestSession, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            id: session.id.clone(),
            created: format_timestamp(session.created_at_epoch_ms, tz),
            total_trials: session.total_trials(),
            total_time_ms: session.total_time_ms(),
            sections: session.sections().count(),
        }
    }
}

/// `YYYY-MM-DD HH:MM` in `tz`; empty for an out-of-range timestamp.
pub fn format_timestamp<Tz: TimeZone>(epoch_ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|utc| utc.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
