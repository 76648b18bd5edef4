use serde::{Deserialize, Serialize};

/// Identifies one section of the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionId {
    #[serde(rename = "CRT1")]
    Crt1,
    #[serde(rename = "CRT2")]
    Crt2,
    #[serde(rename = "CRT3")]
    Crt3,
    #[serde(rename = "CRT4")]
    Crt4,
    #[serde(rename = "CRT5")]
    Crt5,
    #[serde(rename = "CRT6")]
    Crt6,
    #[serde(rename = "CRT7")]
    Crt7,
    #[serde(rename = "CRT8")]
    Crt8,
    #[serde(rename = "STROOP")]
    Stroop,
}

/// Fixed administration order of the choice-reaction-time sections.
pub const CRT_ORDER: [SectionId; 8] = [
    SectionId::Crt1,
    SectionId::Crt2,
    SectionId::Crt3,
    SectionId::Crt4,
    SectionId::Crt5,
    SectionId::Crt6,
    SectionId::Crt7,
    SectionId::Crt8,
];

impl SectionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crt1 => "CRT1",
            Self::Crt2 => "CRT2",
            Self::Crt3 => "CRT3",
            Self::Crt4 => "CRT4",
            Self::Crt5 => "CRT5",
            Self::Crt6 => "CRT6",
            Self::Crt7 => "CRT7",
            Self::Crt8 => "CRT8",
            Self::Stroop => "STROOP",
        }
    }

    pub fn is_crt(&self) -> bool {
        !matches!(self, Self::Stroop)
    }

    /// Position in [`CRT_ORDER`], `None` for Stroop.
    pub fn crt_index(&self) -> Option<usize> {
        CRT_ORDER.iter().position(|s| s == self)
    }

    /// The (left, right) response labels of a CRT section.
    ///
    /// Every stimulus of the section carries exactly one of these as its
    /// correct label. Stroop answers are color names instead.
    pub fn labels(&self) -> Option<(&'static str, &'static str)> {
        Some(match self {
            Self::Crt1 => ("Plant", "Animal"),
            Self::Crt2 => ("One syllable", "Two syllables"),
            Self::Crt3 => ("Even", "Odd"),
            Self::Crt4 => ("Below 500", "Above 500"),
            Self::Crt5 => ("Pointing up", "Pointing down"),
            Self::Crt6 => ("Top half", "Bottom half"),
            Self::Crt7 => ("Connected", "Disconnected"),
            Self::Crt8 => ("Vertical axis", "Horizontal axis"),
            Self::Stroop => return None,
        })
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Crt1 => "CRT.1 Plant or animal",
            Self::Crt2 => "CRT.2 Syllable count",
            Self::Crt3 => "CRT.3 Parity",
            Self::Crt4 => "CRT.4 Magnitude",
            Self::Crt5 => "CRT.5 Arrow direction",
            Self::Crt6 => "CRT.6 Screen half",
            Self::Crt7 => "CRT.7 Grid connectivity",
            Self::Crt8 => "CRT.8 Grid symmetry axis",
            Self::Stroop => "Stroop",
        }
    }

    /// Static instruction text shown on the intro step.
    pub fn instructions(&self) -> &'static str {
        match self {
            Self::Crt1 => {
                "A word appears. Decide whether it names a plant or an animal. \
                 Left = Plant, Right = Animal. Answer as fast and as accurately as you can."
            }
            Self::Crt2 => {
                "A word appears. Decide whether it has one syllable or two. \
                 Left = One syllable, Right = Two syllables."
            }
            Self::Crt3 => {
                "A three-digit number appears. Decide whether it is even or odd. \
                 Left = Even, Right = Odd."
            }
            Self::Crt4 => {
                "A three-digit number appears. Decide whether it is below or above 500. \
                 Left = Below 500, Right = Above 500."
            }
            Self::Crt5 => {
                "An arrow appears at some angle. Decide whether it points upward or downward. \
                 Left = Pointing up, Right = Pointing down."
            }
            Self::Crt6 => {
                "An arrow appears in the top or bottom half of the screen. Ignore its direction \
                 and report where it is. Left = Top half, Right = Bottom half."
            }
            Self::Crt7 => {
                "A 3x3 grid appears. Decide whether all filled cells touch each other \
                 through their edges. Left = Connected, Right = Disconnected."
            }
            Self::Crt8 => {
                "A 3x3 grid appears. Decide whether the pattern is mirrored across the vertical \
                 or the horizontal axis. Left = Vertical axis, Right = Horizontal axis."
            }
            Self::Stroop => {
                "A color word appears printed in some ink. Name the INK color, not the word. \
                 Keys 1-4 pick Red, Blue, Green, Yellow."
            }
        }
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
