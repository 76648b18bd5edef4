//! Stimulus sets for the CRT sections and the Stroop task.
//!
//! Every generator draws from a [`RandomSource`], so a fixed seed (or a
//! scripted [`SequenceSource`]) reproduces the exact same set.

pub mod generate;
pub mod grid;
pub mod random;
pub mod stroop;
pub mod words;

pub use generate::{GenerateError, StimulusGenerator, SymmetryMode, generate};
pub use grid::{is_connected, mirror_horizontal, mirror_vertical};
pub use random::{RandomSource, RngSource, SequenceSource, ThreadSource, shuffle, uuid_v4};
pub use stroop::{PALETTE, StroopColor, generate_stroop, stroop_pool_size};
