//! Core domain types for the replay judgement core.
//!
//! This crate owns the vocabulary every other crate speaks: the hit object
//! model, verdicts and hit windows, mods, and the spatial/slider-path math
//! they're built from. It has no notion of beatmap files or replay frames;
//! those live in `chart` and `replay` respectively.

pub mod config;
pub mod geometry;
pub mod hit_object;
pub mod hit_window;
pub mod mods;
pub mod slider_path;
pub mod verdict;

pub use config::{JudgementConfig, NoteLockStyle};
pub use geometry::Position;
pub use hit_object::{
    Beatmap, Checkpoint, CheckpointId, CheckpointKind, HitCircle, HitObject, HitObjectId, Slider,
    Spinner,
};
pub use hit_window::{HitWindowStyle, HitWindowTable};
pub use mods::{GameMod, ModSet};
pub use slider_path::{PathType, SliderPath, SliderPathError};
pub use verdict::{HitCircleResult, MissReason, Verdict};
