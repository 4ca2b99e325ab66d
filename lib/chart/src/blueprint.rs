//! The unparsed, not-yet-judgeable authored map (spec §3's "Beatmap Builder" input).
//!
//! A `Blueprint` is deliberately not tied to any particular beatmap file
//! format or parsing crate: reading `.osu` files, `.qua` files, or anything
//! else is an external collaborator's job (spec §1's Non-goals). This crate
//! only needs the authored facts a format's parser would hand it.

use engine::Position;

/// Difficulty settings from the beatmap's "Difficulty" section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParameters {
    pub circle_size: f32,
    pub overall_difficulty: f32,
    pub approach_rate: f32,
    pub slider_multiplier: f32,
    pub slider_tick_rate: f32,
}

/// How a slider's control points should be walked.
pub use engine::PathType;

#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintCircle {
    pub position: Position,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintSlider {
    pub control_points: Vec<Position>,
    pub path_type: PathType,
    /// Authored "pixel length", independent of the raw control-point geometry.
    pub pixel_length: f32,
    pub start_time: f64,
    /// How long one traversal of the path takes, already resolved from
    /// timing/velocity information the format's parser owns (this crate
    /// never models timing points or BPM — see DESIGN.md).
    pub span_duration_ms: f64,
    /// Number of times the ball traverses the path; 1 means no repeats.
    pub span_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlueprintSpinner {
    pub start_time: f64,
    pub end_time: f64,
}

/// One authored object, in whatever kind the format's parser produced.
#[derive(Debug, Clone, PartialEq)]
pub enum BlueprintObject {
    Circle(BlueprintCircle),
    Slider(BlueprintSlider),
    Spinner(BlueprintSpinner),
}

impl BlueprintObject {
    #[must_use]
    pub const fn time(&self) -> f64 {
        match self {
            Self::Circle(c) => c.time,
            Self::Slider(s) => s.start_time,
            Self::Spinner(s) => s.start_time,
        }
    }
}

/// The authored map, before stacking, mod application, or hit-window
/// assignment have happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub difficulty: DifficultyParameters,
    /// Objects in authored order; need not be pre-sorted by time.
    pub objects: Vec<BlueprintObject>,
}
