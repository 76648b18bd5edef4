use cogbat_core::{StroopCondition, StroopStimulus};

use crate::random::{RandomSource, shuffle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StroopColor {
    pub name: &'static str,
    pub css: &'static str,
}

impl StroopColor {
    /// The word shown on screen for this color.
    pub fn word(&self) -> String {
        self.name.to_uppercase()
    }
}

/// Response keys 1-4 map onto this order.
pub const PALETTE: [StroopColor; 4] = [
    StroopColor {
        name: "Red",
        css: "#ff4d4d",
    },
    StroopColor {
        name: "Blue",
        css: "#4d7cff",
    },
    StroopColor {
        name: "Green",
        css: "#4dff88",
    },
    StroopColor {
        name: "Yellow",
        css: "#ffd24d",
    },
];

/// Size of the generated pool for a nominal trial count.
pub fn stroop_pool_size(nominal: usize, ratio: usize) -> usize {
    nominal.saturating_mul(ratio.max(1))
}

/// `total / 2` congruent trials, the rest incongruent, shuffled together.
pub fn generate_stroop<R: RandomSource + ?Sized>(total: usize, rng: &mut R) -> Vec<StroopStimulus> {
    let congruent = total / 2;
    let mut out = Vec::with_capacity(total);

    for _ in 0..congruent {
        let color = PALETTE[rng.below(PALETTE.len())];
        out.push(StroopStimulus {
            word: color.word(),
            ink: color.css.to_string(),
            ink_name: color.name.to_string(),
            condition: StroopCondition::Congruent,
        });
    }

    for _ in congruent..total {
        let word = PALETTE[rng.below(PALETTE.len())];
        let mut ink = PALETTE[rng.below(PALETTE.len())];
        while ink == word {
            ink = PALETTE[rng.below(PALETTE.len())];
        }
        out.push(StroopStimulus {
            word: word.word(),
            ink: ink.css.to_string(),
            ink_name: ink.name.to_string(),
            condition: StroopCondition::Incongruent,
        });
    }

    shuffle(rng, &mut out);
    tracing::debug!(total, congruent, "generated stroop pool");
    out
}
