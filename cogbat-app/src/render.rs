use std::fmt::Write as _;

use cogbat_core::{Cells, CrtStimulus, TestSession, VerticalHalf};
use cogbat_experiment::{SessionView, ShownStimulus, format_ms};

const ARROWS: [&str; 8] = ["↑", "↗", "→", "↘", "↓", "↙", "←", "↖"];

/// Nearest of eight arrow glyphs; 0° is straight up, clockwise.
pub fn arrow_glyph(angle_deg: f64) -> &'static str {
    let step = (angle_deg.rem_euclid(360.0) / 45.0).round() as usize;
    ARROWS[step % ARROWS.len()]
}

pub fn grid_lines(cells: &Cells) -> [String; 3] {
    let row = |r: usize| {
        cells[r * 3..r * 3 + 3]
            .iter()
            .map(|&c| if c { "■" } else { "□" })
            .collect::<Vec<_>>()
            .join(" ")
    };
    [row(0), row(1), row(2)]
}

fn parse_hex(css: &str) -> Option<(u8, u8, u8)> {
    let hex = css.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// `text` in 24-bit ANSI color, or plain when `css` is not `#rrggbb`.
pub fn colored(text: &str, css: &str) -> String {
    match parse_hex(css) {
        Some((r, g, b)) => format!("\x1b[1;38;2;{r};{g};{b}m{text}\x1b[0m"),
        None => text.to_string(),
    }
}

fn stimulus_lines(stimulus: &ShownStimulus) -> Vec<String> {
    match stimulus {
        ShownStimulus::Crt(CrtStimulus::Word { text, .. })
        | ShownStimulus::Crt(CrtStimulus::Number { text, .. }) => vec![text.clone()],
        ShownStimulus::Crt(CrtStimulus::ArrowAngle { angle_deg, .. }) => {
            vec![arrow_glyph(*angle_deg).to_string()]
        }
        ShownStimulus::Crt(CrtStimulus::ArrowPosition {
            angle_deg,
            vertical_half,
            ..
        }) => {
            // five rows with the midline in the middle
            let mut rows = vec![String::new(); 5];
            rows[2] = "-----".to_string();
            let row = match vertical_half {
                VerticalHalf::Top => 0,
                VerticalHalf::Bottom => 4,
            };
            rows[row] = arrow_glyph(*angle_deg).to_string();
            rows
        }
        ShownStimulus::Crt(CrtStimulus::Grid { cells, .. }) => grid_lines(cells).to_vec(),
        ShownStimulus::Stroop(s) => vec![colored(&s.word, &s.ink)],
    }
}

fn button_row(labels: &[String]) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("[{}] {label}", i + 1))
        .collect::<Vec<_>>()
        .join("    ")
}

/// One frame of the terminal session.
pub fn render_view(view: &SessionView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {:>3.0}% ──", view.progress_percent);
    if let Some(title) = view.title {
        let _ = writeln!(out, "{title}");
    }
    if let Some((i, n)) = view.trial {
        let _ = writeln!(out, "trial {i}/{n}");
    }
    if let Some(secs) = view.countdown_secs {
        let _ = writeln!(out, "{secs} s");
    }
    if let Some(instructions) = &view.instructions {
        let _ = writeln!(out, "\n{instructions}\n\nPress Enter to begin.");
    }
    if let Some(stimulus) = &view.stimulus {
        out.push('\n');
        for line in stimulus_lines(stimulus) {
            let _ = writeln!(out, "        {line}");
        }
        out.push('\n');
    }
    if view.stimulus.is_some() && !view.response_labels.is_empty() {
        let _ = writeln!(out, "{}", button_row(&view.response_labels));
    }
    match view.feedback {
        Some(true) => out.push_str("✓\n"),
        Some(false) => out.push_str("✗\n"),
        None => {}
    }
    if let Some(message) = view.message {
        let _ = writeln!(out, "{message}");
    }
    out
}

/// Per-section table of a finished session.
pub fn summary_table(session: &TestSession) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:>6} {:>9} {:>10} {:>10} {:>6}",
        "section", "trials", "accuracy", "mean RT", "median RT", "errors"
    );
    for section in session.sections() {
        let s = &section.summary;
        let _ = writeln!(
            out,
            "{:<10} {:>6} {:>8.1}% {:>10} {:>10} {:>6}",
            section.section_id.as_str(),
            s.count,
            s.accuracy * 100.0,
            format_ms(s.mean_reaction_time_ms),
            format_ms(s.median_reaction_time_ms),
            s.error_count
        );
    }
    let _ = writeln!(
        out,
        "total: {} trials in {}",
        session.total_trials(),
        format_ms(session.total_time_ms() as f64)
    );
    out
}
