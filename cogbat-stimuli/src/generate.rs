use std::collections::HashSet;
use std::hash::Hash;

use cogbat_core::{Cells, CrtStimulus, GridPredicate, SectionId, VerticalHalf, encode_cells};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{
    filled_count, full_column, full_row, is_connected, mirror_horizontal, mirror_vertical,
};
use crate::random::{RandomSource, sample, shuffle};
use crate::words;

/// CRT4 splits three-digit numbers around this value; the value itself is never drawn.
pub const MAGNITUDE_THRESHOLD: u32 = 500;

/// Angles are measured clockwise from straight up, in degrees.
const UP_RANGES: &[(f64, f64)] = &[(300.0, 360.0), (0.0, 60.0)];
const DOWN_RANGES: &[(f64, f64)] = &[(120.0, 240.0)];
const FULL_CIRCLE: &[(f64, f64)] = &[(0.0, 360.0)];

/// Per requested item; past `max_attempts * n` draws the uniqueness rule is dropped.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("section {0} is not a choice-reaction-time section")]
    NotCrt(SectionId),
}

/// How CRT8 builds its axis-symmetry patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryMode {
    /// Random half mirrored onto the other half; patterns are unique.
    #[default]
    Mirror,
    /// One full column (vertical) or row (horizontal). Only six such
    /// patterns exist, so repeats within a section are expected.
    RowColumn,
}

#[derive(Debug, Clone)]
pub struct StimulusGenerator {
    pub symmetry_mode: SymmetryMode,
    pub max_attempts: usize,
}

impl Default for StimulusGenerator {
    fn default() -> Self {
        Self {
            symmetry_mode: SymmetryMode::Mirror,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// [`StimulusGenerator::generate`] with default settings.
pub fn generate<R: RandomSource + ?Sized>(
    section: SectionId,
    count: usize,
    rng: &mut R,
) -> Result<Vec<CrtStimulus>, GenerateError> {
    StimulusGenerator::default().generate(section, count, rng)
}

impl StimulusGenerator {
    pub fn new(symmetry_mode: SymmetryMode) -> Self {
        Self {
            symmetry_mode,
            ..Self::default()
        }
    }

    /// Builds `count` stimuli for one CRT section in shuffled order.
    ///
    /// The left label gets `count / 2` stimuli and the right label the rest,
    /// so an even count splits exactly in half.
    pub fn generate<R: RandomSource + ?Sized>(
        &self,
        section: SectionId,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<CrtStimulus>, GenerateError> {
        let Some((left, right)) = section.labels() else {
            return Err(GenerateError::NotCrt(section));
        };
        let n_left = count / 2;
        let n_right = count - n_left;

        let mut out = match section {
            SectionId::Crt1 => {
                let mut v = word_stimuli(rng, words::PLANTS, n_left, left);
                v.extend(word_stimuli(rng, words::ANIMALS, n_right, right));
                v
            }
            SectionId::Crt2 => {
                let mut v = word_stimuli(rng, words::ONE_SYLLABLE, n_left, left);
                v.extend(word_stimuli(rng, words::TWO_SYLLABLES, n_right, right));
                v
            }
            SectionId::Crt3 => {
                let mut used = HashSet::new();
                let mut v = self.numbers(rng, &mut used, n_left, left, |n| n % 2 == 0);
                v.extend(self.numbers(rng, &mut used, n_right, right, |n| n % 2 == 1));
                v
            }
            SectionId::Crt4 => {
                let mut used = HashSet::new();
                let mut v =
                    self.numbers(rng, &mut used, n_left, left, |n| n < MAGNITUDE_THRESHOLD);
                v.extend(self.numbers(rng, &mut used, n_right, right, |n| {
                    n > MAGNITUDE_THRESHOLD
                }));
                v
            }
            SectionId::Crt5 => {
                let mut used = HashSet::new();
                let mut v = self.arrow_angles(rng, &mut used, n_left, left, UP_RANGES);
                v.extend(self.arrow_angles(rng, &mut used, n_right, right, DOWN_RANGES));
                v
            }
            SectionId::Crt6 => {
                let mut used = HashSet::new();
                let mut v = self.arrow_positions(rng, &mut used, n_left, left, VerticalHalf::Top);
                v.extend(self.arrow_positions(
                    rng,
                    &mut used,
                    n_right,
                    right,
                    VerticalHalf::Bottom,
                ));
                v
            }
            SectionId::Crt7 => {
                let mut used = HashSet::new();
                let mut v = self.connectivity(rng, &mut used, n_left, left, true);
                v.extend(self.connectivity(rng, &mut used, n_right, right, false));
                v
            }
            SectionId::Crt8 => match self.symmetry_mode {
                SymmetryMode::Mirror => {
                    let mut used = HashSet::new();
                    let mut v = self.mirrored(rng, &mut used, n_left, left, Axis::Vertical);
                    v.extend(self.mirrored(rng, &mut used, n_right, right, Axis::Horizontal));
                    v
                }
                SymmetryMode::RowColumn => {
                    let mut v = line_stimuli(rng, n_left, left, full_column);
                    v.extend(line_stimuli(rng, n_right, right, full_row));
                    v
                }
            },
            SectionId::Stroop => return Err(GenerateError::NotCrt(section)),
        };

        shuffle(rng, &mut out);
        tracing::debug!(%section, count = out.len(), "generated stimuli");
        Ok(out)
    }

    fn numbers<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        used: &mut HashSet<u32>,
        n: usize,
        label: &str,
        predicate: impl Fn(u32) -> bool,
    ) -> Vec<CrtStimulus> {
        collect_unique(
            rng,
            n,
            used,
            self.max_attempts,
            |rng| {
                let v = 100 + rng.below(900) as u32;
                predicate(v).then_some(v)
            },
            |v| *v,
        )
        .into_iter()
        .map(|v| CrtStimulus::Number {
            text: v.to_string(),
            correct: label.to_string(),
        })
        .collect()
    }

    fn arrow_angles<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        used: &mut HashSet<i64>,
        n: usize,
        label: &str,
        ranges: &[(f64, f64)],
    ) -> Vec<CrtStimulus> {
        collect_unique(
            rng,
            n,
            used,
            self.max_attempts,
            |rng| Some(angle_from_ranges(rng, ranges)),
            |a| angle_key(*a),
        )
        .into_iter()
        .map(|angle_deg| CrtStimulus::ArrowAngle {
            angle_deg,
            correct: label.to_string(),
        })
        .collect()
    }

    fn arrow_positions<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        used: &mut HashSet<(i64, VerticalHalf)>,
        n: usize,
        label: &str,
        half: VerticalHalf,
    ) -> Vec<CrtStimulus> {
        collect_unique(
            rng,
            n,
            used,
            self.max_attempts,
            |rng| Some(angle_from_ranges(rng, FULL_CIRCLE)),
            |a| (angle_key(*a), half),
        )
        .into_iter()
        .map(|angle_deg| CrtStimulus::ArrowPosition {
            angle_deg,
            vertical_half: half,
            correct: label.to_string(),
        })
        .collect()
    }

    fn connectivity<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        used: &mut HashSet<String>,
        n: usize,
        label: &str,
        connected: bool,
    ) -> Vec<CrtStimulus> {
        collect_unique(
            rng,
            n,
            used,
            self.max_attempts,
            |rng| {
                let cells = random_subset(rng);
                (is_connected(&cells) == connected).then_some(cells)
            },
            encode_cells,
        )
        .into_iter()
        .map(|cells| grid_stimulus(cells, label, GridPredicate::Connectivity))
        .collect()
    }

    fn mirrored<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        used: &mut HashSet<String>,
        n: usize,
        label: &str,
        axis: Axis,
    ) -> Vec<CrtStimulus> {
        collect_unique(
            rng,
            n,
            used,
            self.max_attempts,
            |rng| {
                let cells = symmetric_pattern(rng, axis);
                // a pattern symmetric on both axes would fit either label
                let other = match axis {
                    Axis::Vertical => mirror_horizontal(&cells),
                    Axis::Horizontal => mirror_vertical(&cells),
                };
                (filled_count(&cells) >= 2 && other != cells).then_some(cells)
            },
            encode_cells,
        )
        .into_iter()
        .map(|cells| grid_stimulus(cells, label, GridPredicate::AxisSymmetry))
        .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Vertical,
    Horizontal,
}

/// Draws until `n` values with distinct keys are collected.
///
/// `draw` returns `None` for a candidate that fails the label predicate.
/// Once the attempt budget is spent, duplicates are accepted so the call
/// always terminates with `n` items.
fn collect_unique<R, T, K>(
    rng: &mut R,
    n: usize,
    used: &mut HashSet<K>,
    max_attempts: usize,
    mut draw: impl FnMut(&mut R) -> Option<T>,
    key: impl Fn(&T) -> K,
) -> Vec<T>
where
    R: RandomSource + ?Sized,
    K: Eq + Hash,
{
    let mut out = Vec::with_capacity(n);
    let budget = max_attempts.saturating_mul(n.max(1));
    let mut attempts = 0usize;
    let mut relaxed = false;
    while out.len() < n {
        attempts += 1;
        if !relaxed && attempts > budget {
            relaxed = true;
            tracing::warn!(
                wanted = n,
                unique = out.len(),
                attempts,
                "uniqueness budget exhausted, accepting repeats"
            );
        }
        let Some(candidate) = draw(rng) else {
            continue;
        };
        if used.insert(key(&candidate)) || relaxed {
            out.push(candidate);
        }
    }
    out
}

fn word_stimuli<R: RandomSource + ?Sized>(
    rng: &mut R,
    list: &[&str],
    n: usize,
    label: &str,
) -> Vec<CrtStimulus> {
    let mut picked = sample(rng, list, n);
    if picked.len() < n && !list.is_empty() {
        tracing::warn!(wanted = n, available = list.len(), "word list too short, repeating");
        while picked.len() < n {
            let more = sample(rng, list, n - picked.len());
            picked.extend(more);
        }
    }
    picked
        .into_iter()
        .map(|w| CrtStimulus::Word {
            text: w.to_string(),
            correct: label.to_string(),
        })
        .collect()
}

fn line_stimuli<R: RandomSource + ?Sized>(
    rng: &mut R,
    n: usize,
    label: &str,
    line: fn(usize) -> Cells,
) -> Vec<CrtStimulus> {
    let mut choices: Vec<usize> = (0..n).map(|i| i % 3).collect();
    shuffle(rng, &mut choices);
    choices
        .into_iter()
        .map(|i| grid_stimulus(line(i), label, GridPredicate::AxisSymmetry))
        .collect()
}

fn grid_stimulus(cells: Cells, label: &str, kind: GridPredicate) -> CrtStimulus {
    CrtStimulus::Grid {
        cells,
        correct: label.to_string(),
        kind,
    }
}

/// Picks a sub-range with probability proportional to its span, then a
/// uniform angle inside it.
fn angle_from_ranges<R: RandomSource + ?Sized>(rng: &mut R, ranges: &[(f64, f64)]) -> f64 {
    let total: f64 = ranges.iter().map(|(a, b)| b - a).sum();
    let mut pick = rng.uniform(0.0, total);
    for &(a, b) in ranges {
        let span = b - a;
        if pick < span {
            return rng.uniform(a, b);
        }
        pick -= span;
    }
    ranges.first().map_or(0.0, |r| r.0)
}

/// Angles that round to the same tenth of a degree look identical.
fn angle_key(angle: f64) -> i64 {
    ((angle * 10.0).round() as i64).rem_euclid(3600)
}

/// 3 to 6 filled cells taken from the prefix of a random permutation.
fn random_subset<R: RandomSource + ?Sized>(rng: &mut R) -> Cells {
    let filled = 3 + rng.below(4);
    let mut order: [usize; 9] = std::array::from_fn(|i| i);
    shuffle(rng, &mut order);
    let mut cells = [false; 9];
    for &i in &order[..filled] {
        cells[i] = true;
    }
    cells
}

fn symmetric_pattern<R: RandomSource + ?Sized>(rng: &mut R, axis: Axis) -> Cells {
    let mut cells = [false; 9];
    for k in 0..3 {
        let outer = rng.chance(0.5);
        let middle = rng.chance(0.5);
        match axis {
            // row k: left and right columns match
            Axis::Vertical => {
                cells[k * 3] = outer;
                cells[k * 3 + 1] = middle;
                cells[k * 3 + 2] = outer;
            }
            // column k: top and bottom rows match
            Axis::Horizontal => {
                cells[k] = outer;
                cells[3 + k] = middle;
                cells[6 + k] = outer;
            }
        }
    }
    cells
}
