use cogbat_core::{SectionSummary, TrialRecord};

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value after an ascending sort, averaging the two middle values for
/// even lengths; 0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Accuracy over all trials; mean and median reaction time over correct trials only.
pub fn summarize(trials: &[TrialRecord]) -> SectionSummary {
    let count = trials.len();
    let correct_rts: Vec<f64> = trials
        .iter()
        .filter(|t| t.is_correct)
        .map(|t| t.reaction_time_ms)
        .collect();
    let correct = correct_rts.len();
    SectionSummary {
        count,
        accuracy: if count == 0 {
            0.0
        } else {
            correct as f64 / count as f64
        },
        mean_reaction_time_ms: mean(&correct_rts),
        median_reaction_time_ms: median(&correct_rts),
        error_count: count - correct,
    }
}

/// `"<rounded> ms"`.
pub fn format_ms(ms: f64) -> String {
    format!("{} ms", ms.round() as i64)
}
