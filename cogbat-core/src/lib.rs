pub mod phase;
pub mod section;
pub mod session;
pub mod stimulus;
pub mod trial;

pub use phase::Phase;
pub use section::{CRT_ORDER, SectionId};
pub use session::{FORMAT_VERSION, SectionResult, SectionSummary, TestSession};
pub use stimulus::{
    Cells, CrtStimulus, GridPredicate, Stimulus, StroopCondition, StroopStimulus, VerticalHalf,
    encode_cells,
};
pub use trial::{TrialRecord, TrialState};
