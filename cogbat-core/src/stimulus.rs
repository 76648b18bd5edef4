use serde::{Deserialize, Serialize};

/// A 3x3 grid in row-major order.
pub type Cells = [bool; 9];

/// Anything that can be presented as one trial.
pub trait Stimulus: Clone + Send + Sync + std::fmt::Debug {
    /// The label a correct response must equal.
    fn correct_label(&self) -> &str;

    /// Opaque audit string stored in the trial record.
    fn descriptor(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalHalf {
    Top,
    Bottom,
}

impl VerticalHalf {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Which classification a grid stimulus belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GridPredicate {
    Connectivity,
    AxisSymmetry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CrtStimulus {
    Word {
        text: String,
        #[serde(rename = "correctLabel")]
        correct: String,
    },
    Number {
        text: String,
        #[serde(rename = "correctLabel")]
        correct: String,
    },
    ArrowAngle {
        angle_deg: f64,
        #[serde(rename = "correctLabel")]
        correct: String,
    },
    ArrowPosition {
        angle_deg: f64,
        vertical_half: VerticalHalf,
        #[serde(rename = "correctLabel")]
        correct: String,
    },
    Grid {
        cells: Cells,
        #[serde(rename = "correctLabel")]
        correct: String,
        #[serde(rename = "predicateKind")]
        kind: GridPredicate,
    },
}

impl Stimulus for CrtStimulus {
    fn correct_label(&self) -> &str {
        match self {
            Self::Word { correct, .. }
            | Self::Number { correct, .. }
            | Self::ArrowAngle { correct, .. }
            | Self::ArrowPosition { correct, .. }
            | Self::Grid { correct, .. } => correct,
        }
    }

    fn descriptor(&self) -> String {
        match self {
            Self::Word { text, .. } | Self::Number { text, .. } => text.clone(),
            Self::ArrowAngle { angle_deg, .. } => format!("angle:{angle_deg:.1}"),
            Self::ArrowPosition {
                angle_deg,
                vertical_half,
                ..
            } => format!("angle:{angle_deg:.1} y:{}", vertical_half.as_str()),
            Self::Grid { cells, .. } => format!("grid:{}", encode_cells(cells)),
        }
    }
}

/// `"1"`/`"0"` per cell, row-major. Used as the dedup key and in descriptors.
pub fn encode_cells(cells: &Cells) -> String {
    cells.iter().map(|&c| if c { '1' } else { '0' }).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StroopCondition {
    Congruent,
    Incongruent,
}

impl StroopCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Congruent => "congruent",
            Self::Incongruent => "incongruent",
        }
    }
}

/// A color word printed in an ink color. The answer is the ink name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StroopStimulus {
    pub word: String,
    /// Display color, `#rrggbb`.
    pub ink: String,
    pub ink_name: String,
    pub condition: StroopCondition,
}

impl Stimulus for StroopStimulus {
    fn correct_label(&self) -> &str {
        &self.ink_name
    }

    fn descriptor(&self) -> String {
        format!("{}|{}|{}", self.word, self.ink_name, self.condition.as_str())
    }
}
