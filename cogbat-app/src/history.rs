use std::fmt::Write as _;

use cogbat_experiment::format_ms;
use cogbat_store::{AggregateStats, KeyValueStore, SessionLog, SessionOverview};

use crate::render::summary_table;

pub fn list<S: KeyValueStore>(log: &SessionLog<S>) -> String {
    let sessions = log.load();
    if sessions.is_empty() {
        return "No sessions recorded yet.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36}  {:<16}  {:>6}  {:>10}",
        "id", "created", "trials", "time"
    );
    for session in &sessions {
        let o = SessionOverview::of(session);
        let _ = writeln!(
            out,
            "{:<36}  {:<16}  {:>6}  {:>10}",
            o.id,
            o.created,
            o.total_trials,
            format_ms(o.total_time_ms as f64)
        );
    }
    out
}

/// `None` when no session has that id.
pub fn show<S: KeyValueStore>(log: &SessionLog<S>, id: &str) -> Option<String> {
    let session = log.find(id)?;
    let overview = SessionOverview::of(&session);
    Some(format!(
        "session {}\ncreated {}  format {}\n\n{}",
        session.id,
        overview.created,
        session.format_version,
        summary_table(&session)
    ))
}

fn percent(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn millis(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), format_ms)
}

pub fn stats(stats: &AggregateStats) -> String {
    format!(
        "submissions: {}\nCRT     accuracy {:>7}  mean RT {:>8}\nStroop  accuracy {:>7}  mean RT {:>8}\n",
        stats.n,
        percent(stats.avg_crt_accuracy),
        millis(stats.avg_crt_mean_rt_ms),
        percent(stats.avg_stroop_accuracy),
        millis(stats.avg_stroop_mean_rt_ms),
    )
}
