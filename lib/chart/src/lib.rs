//! Beatmap Builder — turns an authored `Blueprint` plus an active `ModSet`
//! into an immutable, judgeable `engine::Beatmap`.
//!
//! Parsing beatmap files into a [`Blueprint`] is out of scope here; this
//! crate only knows what a parser would already have extracted.

pub mod blueprint;
pub mod builder;
pub mod error;

pub use blueprint::{
    Blueprint, BlueprintCircle, BlueprintObject, BlueprintSlider, BlueprintSpinner,
    DifficultyParameters,
};
pub use builder::{build, circle_radius, effective_difficulty, preempt_ms};
pub use error::BeatmapError;
